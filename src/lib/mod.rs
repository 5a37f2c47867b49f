pub mod clean;
pub mod config;
pub mod content;
pub mod front_matter;
pub mod header;
pub mod index;
pub mod legacy;
pub mod migrate;
pub mod page;
pub mod pipeline;
pub mod project;
pub mod seo;
pub mod tags;
pub mod transformer;
pub mod types;
pub mod utils;
pub mod validate;
