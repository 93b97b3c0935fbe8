//! Markup copier: `*.html` from the source root to the output root.

use crate::{
    config::ProjectConfig,
    log,
    utils::fsx::copy_file,
};
use anyhow::{Context, Result};
use std::fs;

pub fn run(config: &ProjectConfig) -> Result<()> {
    let source = &config.build.source;
    let output = &config.build.output;
    let mut copied = 0usize;

    let entries = fs::read_dir(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html"))
        {
            let name = path.file_name().context("html file without a name")?;
            copy_file(&path, &output.join(name))?;
            copied += 1;
        }
    }

    log!("markup"; "copied {copied} pages");
    Ok(())
}
