//! Script copier: `js/*.js` to `output/js`, unmodified.
//!
//! Vendored scripts live under their own directory and are handled by the
//! vendor task instead.

use crate::{
    config::ProjectConfig,
    log,
    utils::fsx::copy_file,
};
use anyhow::{Context, Result};
use std::fs;

pub fn run(config: &ProjectConfig) -> Result<()> {
    let js_dir = config.build.source.join("js");
    let out_dir = config.build.output.join("js");
    let mut copied = 0usize;

    if !js_dir.is_dir() {
        log!("scripts"; "no js directory, skipping");
        return Ok(());
    }

    let entries =
        fs::read_dir(&js_dir).with_context(|| format!("Failed to read {}", js_dir.display()))?;

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("js"))
        {
            let name = path.file_name().context("js file without a name")?;
            copy_file(&path, &out_dir.join(name))?;
            copied += 1;
        }
    }

    log!("scripts"; "copied {copied} files");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scripts_copies_top_level_js() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let output = dir.path().join("build");
        fs::create_dir_all(source.join("js/bootstrap")).unwrap();
        fs::write(source.join("js/app.js"), "console.log(1);").unwrap();
        fs::write(source.join("js/bootstrap/bundle.js"), ";").unwrap();

        let mut config = ProjectConfig::default();
        config.build.source = source;
        config.build.output = output.clone();

        run(&config).unwrap();

        assert!(output.join("js/app.js").is_file());
        // Nested vendor js belongs to the vendor task
        assert!(!output.join("js/bootstrap").exists());
    }

    #[test]
    fn test_scripts_without_js_dir() {
        let dir = tempdir().unwrap();
        let mut config = ProjectConfig::default();
        config.build.source = dir.path().to_path_buf();
        config.build.output = dir.path().join("build");

        run(&config).unwrap();
    }
}
