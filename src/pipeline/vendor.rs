//! Verbatim copy of vendored third-party assets.
//!
//! Vendor directories (bootstrap css/js by default) are mirrored into the
//! output tree untouched: no linting, no optimization.

use crate::{
    config::ProjectConfig,
    log,
    utils::fsx::{collect_all_files, copy_file, rebase},
};
use anyhow::Result;

pub fn run(config: &ProjectConfig) -> Result<()> {
    let source = &config.build.source;
    let output = &config.build.output;
    let mut copied = 0usize;

    for dir in &config.build.vendor {
        let src_dir = source.join(dir);
        if !src_dir.is_dir() {
            continue;
        }

        for file in collect_all_files(&src_dir) {
            copy_file(&file, &rebase(&file, source, output)?)?;
            copied += 1;
        }
    }

    log!("vendor"; "copied {copied} files");
    Ok(())
}
