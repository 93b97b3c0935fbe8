//! SVG rewrite pass built on usvg.
//!
//! Parsing and re-serializing through usvg normalizes the tree and strips
//! editor metadata, which is the whole of the "svg optimizer" this pipeline
//! needs.

use anyhow::{Context, Result};

/// Optimize SVG using usvg, returning rewritten bytes.
pub fn optimize_svg(content: &[u8]) -> Result<Vec<u8>> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(content, &options).context("Failed to parse SVG")?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };

    Ok(tree.to_string(&write_options).into_bytes())
}
