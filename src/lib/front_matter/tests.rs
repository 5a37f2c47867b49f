use proptest::{
    prelude::*,
    test_runner::{Config, TestRunner},
};

use super::{
    Blocks, FrontmatterError, FrontmatterParser, LineFrontmatter, WithFallback, YamlFrontmatter,
    split_blocks,
};
use crate::types::FieldValue;

#[test]
fn split_blocks_separates_meta_and_body() {
    let src = "---\ntitle: A\n---\n# Body\n";
    assert_eq!(
        split_blocks(src),
        Blocks::Split {
            meta: "title: A\n",
            body: "# Body\n"
        }
    );
    assert_eq!(split_blocks("# Just body"), Blocks::Bare("# Just body"));
    assert_eq!(split_blocks("---\ntitle: A\n"), Blocks::Unterminated("title: A\n"));
}

#[test]
fn split_blocks_ignores_later_rules() {
    // a horizontal rule in the body is not a delimiter
    let src = "intro\n---\nmore\n";
    assert_eq!(split_blocks(src), Blocks::Bare(src));
}

#[test]
fn yaml_lowers_values() {
    let src = "---\ntitle: \"Demo\"\nfeatured: true\nteam_size: 3\ncategories: [Python, SQL]\nempty:\n---\nBody";
    let doc = YamlFrontmatter.parse(src).unwrap();
    assert_eq!(doc.body, "Body");
    assert_eq!(doc.fields["title"], FieldValue::Text("Demo".into()));
    assert_eq!(doc.fields["featured"], FieldValue::Bool(true));
    assert_eq!(doc.fields["team_size"], FieldValue::Number(3.0));
    assert_eq!(
        doc.fields["categories"],
        FieldValue::List(vec!["Python".into(), "SQL".into()])
    );
    assert!(!doc.fields.contains_key("empty"));
}

#[test]
fn yaml_keeps_dates_as_text() {
    let doc = YamlFrontmatter
        .parse("---\ndate: 2024-01-01\n---\n")
        .unwrap();
    assert_eq!(doc.fields["date"], FieldValue::Text("2024-01-01".into()));
}

#[test]
fn yaml_rejects_broken_blocks() {
    assert!(matches!(
        YamlFrontmatter.parse("---\ntitle: [unclosed\n---\n"),
        Err(FrontmatterError::Syntax(_))
    ));
    assert!(matches!(
        YamlFrontmatter.parse("---\n- a\n- b\n---\n"),
        Err(FrontmatterError::Syntax(_))
    ));
    assert!(matches!(
        YamlFrontmatter.parse("---\ntitle: A\n"),
        Err(FrontmatterError::Syntax(_))
    ));
}

#[test]
fn line_scanner_reads_simple_pairs() {
    let src = "---\ntitle: Broken: \"yes\"\ncategories: [Python, 'No-Code']\nfeatured: true\nnot a pair\n---\nBody";
    let doc = LineFrontmatter.parse(src).unwrap();
    assert_eq!(doc.body, "Body");
    assert_eq!(doc.fields["title"], FieldValue::Text("Broken: \"yes\"".into()));
    assert_eq!(
        doc.fields["categories"],
        FieldValue::List(vec!["Python".into(), "No-Code".into()])
    );
    assert_eq!(doc.fields["featured"], FieldValue::Bool(true));
    assert_eq!(doc.fields.len(), 3);
}

#[test]
fn fallback_used_only_on_syntax_errors() {
    let parser = WithFallback::new(YamlFrontmatter, LineFrontmatter);

    let broken = "---\ntitle: [unclosed\ndescription: d\n---\nBody";
    let doc = parser.parse(broken).unwrap();
    assert_eq!(doc.fields["description"], FieldValue::Text("d".into()));

    let clean = "---\ntitle: \"A: B\"\n---\n";
    let doc = parser.parse(clean).unwrap();
    assert_eq!(doc.fields["title"], FieldValue::Text("A: B".into()));
}

#[test]
fn well_formed_blocks_agree_between_parsers() {
    let mut runner = TestRunner::new(Config {
        cases: 64,
        failure_persistence: None,
        ..Config::default()
    });
    runner
        .run(
            &proptest::collection::btree_map("k_[a-z_]{0,9}", "[A-Za-z][A-Za-z0-9 ]{0,20}", 0..6),
            |pairs| {
                let meta: String = pairs
                    .iter()
                    .map(|(k, v)| format!("{k}: \"{}\"\n", v.trim()))
                    .collect();
                let src = format!("---\n{meta}---\nbody\n");
                let yaml = YamlFrontmatter.parse(&src).unwrap();
                let lines = LineFrontmatter.parse(&src).unwrap();
                prop_assert_eq!(yaml, lines);
                Ok(())
            },
        )
        .unwrap();
}
