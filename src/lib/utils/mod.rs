use std::{fs, io, path::Path};

use color_eyre::Section;
use deunicode::deunicode;
use serde::Serialize;
use walkdir::WalkDir;

/// HTML-escape text content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// HTML-escape attribute values (same rules as text for this codebase).
pub fn escape_attr(s: &str) -> String {
    escape_text(s)
}

/// Escape a string for XML character data and attributes.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Lowercase ASCII slug body; empty when the input has no usable characters.
fn slug_body(input: &str) -> String {
    let mut out = String::new();
    let mut prev_dash = false;

    for ch in deunicode(input).chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            prev_dash = false;
        } else if !out.is_empty() && !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }

    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Compute a project slug: lowercase ASCII letters, digits and single hyphens.
pub fn slugify(input: &str) -> String {
    let out = slug_body(input);
    if out.is_empty() {
        "project".to_string()
    } else {
        out
    }
}

/// Compute a slug suitable for heading ids/anchors.
pub fn anchor_slug(input: &str) -> String {
    let out = slug_body(input);
    if out.is_empty() {
        "section".to_string()
    } else {
        out
    }
}

/// Cut to at most `limit` characters, ending in "..." when shortened.
pub fn truncate_chars(s: &str, limit: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let kept: String = s.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Like [`truncate_chars`], but never splits a word when a space is available.
pub fn truncate_words(s: &str, limit: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let kept: String = s.chars().take(limit.saturating_sub(3)).collect();
    let cut = match kept.rfind(char::is_whitespace) {
        Some(at) if at > 0 => &kept[..at],
        _ => kept.as_str(),
    };
    format!("{}...", cut.trim_end())
}

/// True for links that carry their own scheme (`https://…`, `mailto:…`).
pub fn is_absolute_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

/// Join a site-relative path onto the base URL; absolute URLs pass through.
pub fn absolute_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        let base = base.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

/// Resolve an image reference from a project's frontmatter.
///
/// The result is either an absolute URL or a site-root path without a leading
/// slash. Project-relative references land under `images/projects/<slug>/`.
pub fn resolve_image(path: &str, slug: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if let Some(rooted) = path.strip_prefix('/') {
        return rooted.to_string();
    }
    if path.starts_with("../") {
        let mut rest = path;
        while let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        }
        return rest.to_string();
    }

    let rel = path.trim_start_matches("./");
    let rel = rel.strip_prefix("images/").unwrap_or(rel);
    format!("images/projects/{slug}/{rel}")
}

/// Site-root form of a resolved image (`/images/...`), URLs unchanged.
pub fn site_path(resolved: &str) -> String {
    if resolved.starts_with("http://") || resolved.starts_with("https://") {
        resolved.to_string()
    } else {
        format!("/{}", resolved.trim_start_matches('/'))
    }
}

/// Prefix needed to navigate from a relative output path back to the root.
pub fn prefix_to_root(rel_out: &std::path::Path) -> String {
    let depth = rel_out
        .parent()
        .map(|p| p.components().count())
        .unwrap_or(0);
    "../".repeat(depth)
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> color_eyre::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)
        .with_note(|| format!("While serializing {}", path.display()))?;
    fs::write(path, json + "\n").with_note(|| format!("While writing {}", path.display()))
}

/// Recursively copy the contents of `src` into `dst`. Returns the number of
/// files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
