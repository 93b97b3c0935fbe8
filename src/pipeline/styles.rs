//! Style compilation: Sass entry -> consolidated, prefixed, minified CSS.
//!
//! ```text
//! scss/main.scss ──grass──► css text
//!                              │
//!                              ▼
//!                 media-query consolidation
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!        css/main.css              css/main.min.css (+ .map)
//!        (inspection copy)         (minified + prefixed, served)
//! ```
//!
//! A syntax error anywhere in the include graph fails the task.

use crate::{
    config::ProjectConfig,
    log,
    utils::fsx::write_file,
};
use anyhow::{Result, anyhow};
use lightningcss::{
    rules::CssRule,
    stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet},
    targets::{Browsers, Targets},
    traits::ToCss,
};
use parcel_sourcemap::SourceMap;

/// Unminified output filename.
const CSS_NAME: &str = "main.css";
/// Minified output filename.
const CSS_MIN_NAME: &str = "main.min.css";
/// Source map filename, adjacent to the minified output.
const CSS_MAP_NAME: &str = "main.min.css.map";

pub fn run(config: &ProjectConfig) -> Result<()> {
    let entry = config.style_entry();
    let css_dir = config.build.output.join("css");

    let compiled = grass::from_path(&entry, &grass::Options::default())
        .map_err(|e| anyhow!("sass compilation failed: {e}"))?;

    let (plain, minified, map) = transform_css(&compiled)?;

    write_file(&css_dir.join(CSS_NAME), plain.as_bytes())?;
    write_file(&css_dir.join(CSS_MIN_NAME), minified.as_bytes())?;
    write_file(&css_dir.join(CSS_MAP_NAME), map.as_bytes())?;

    log!("styles"; "compiled {}", entry.display());
    Ok(())
}

/// Browser versions that drive vendor prefixing (encoded major << 16).
fn browser_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(90 << 16),
        edge: Some(90 << 16),
        firefox: Some(88 << 16),
        safari: Some(14 << 16),
        ..Browsers::default()
    })
}

/// Consolidate media queries, then produce the plain and minified variants
/// plus the source map JSON for the minified one.
fn transform_css(css: &str) -> Result<(String, String, String)> {
    let mut sheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: CSS_NAME.into(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("CSS parse error: {e}"))?;

    consolidate_media_queries(&mut sheet)?;

    let plain = sheet
        .to_css(PrinterOptions::default())
        .map_err(|e| anyhow!("CSS print error: {e}"))?
        .code;

    let targets = browser_targets();
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("CSS minify error: {e}"))?;

    let mut source_map = SourceMap::new("/");
    source_map.add_source(CSS_NAME);
    source_map
        .set_source_content(0, css)
        .map_err(|e| anyhow!("source map error: {e}"))?;

    let mut minified = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            source_map: Some(&mut source_map),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("CSS print error: {e}"))?
        .code;

    let map = source_map
        .to_json(None)
        .map_err(|e| anyhow!("source map error: {e}"))?;
    minified.push_str(&format!("\n/*# sourceMappingURL={CSS_MAP_NAME} */"));

    Ok((plain, minified, map))
}

/// Merge duplicate `@media` blocks and move them after all other rules.
///
/// Blocks with an identical prelude are merged into the first occurrence;
/// first-seen prelude order is preserved. Mirrors what the original
/// pipeline's media-query grouping pass did.
fn consolidate_media_queries(sheet: &mut StyleSheet<'_, '_>) -> Result<()> {
    let mut regular = Vec::with_capacity(sheet.rules.0.len());
    let mut media: Vec<(String, CssRule)> = Vec::new();

    for rule in sheet.rules.0.drain(..) {
        match rule {
            CssRule::Media(block) => {
                let prelude = block
                    .query
                    .to_css_string(PrinterOptions::default())
                    .map_err(|e| anyhow!("CSS print error: {e}"))?;

                match media.iter().position(|(seen, _)| *seen == prelude) {
                    Some(idx) => {
                        if let CssRule::Media(existing) = &mut media[idx].1 {
                            existing.rules.0.extend(block.rules.0);
                        }
                    }
                    None => media.push((prelude, CssRule::Media(block))),
                }
            }
            other => regular.push(other),
        }
    }

    regular.extend(media.into_iter().map(|(_, rule)| rule));
    sheet.rules.0 = regular;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use std::fs;
    use tempfile::tempdir;

    fn consolidated(css: &str) -> String {
        let mut sheet = StyleSheet::parse(css, ParserOptions::default()).unwrap();
        consolidate_media_queries(&mut sheet).unwrap();
        sheet.to_css(PrinterOptions::default()).unwrap().code
    }

    #[test]
    fn test_duplicate_media_blocks_merged() {
        let css = r"
            .a { color: red; }
            @media (min-width: 768px) { .b { color: blue; } }
            .c { color: green; }
            @media (min-width: 768px) { .d { color: black; } }
        ";
        let out = consolidated(css);

        assert_eq!(out.matches("@media").count(), 1);
        // Both rule sets survive inside the single block
        assert!(out.contains(".b"));
        assert!(out.contains(".d"));
        // Media blocks come after regular rules
        assert!(out.find(".c").unwrap() < out.find("@media").unwrap());
    }

    #[test]
    fn test_distinct_media_preludes_kept_apart() {
        let css = r"
            @media (min-width: 768px) { .a { color: red; } }
            @media (min-width: 1200px) { .b { color: blue; } }
        ";
        let out = consolidated(css);

        assert_eq!(out.matches("@media").count(), 2);
        // First-seen prelude order preserved
        assert!(out.find("768px").unwrap() < out.find("1200px").unwrap());
    }

    #[test]
    fn test_transform_css_outputs() {
        let css = ".intro { display: flex; margin: 0 0 0 0; }\n";
        let (plain, minified, map) = transform_css(css).unwrap();

        assert!(plain.contains(".intro"));
        assert!(minified.contains(".intro"));
        assert!(minified.len() < plain.len() + 60); // minified + map pointer stays small
        assert!(minified.contains("sourceMappingURL=main.min.css.map"));
        assert!(map.contains("\"version\":3"));
        assert!(map.contains("main.css"));
    }

    #[test]
    fn test_run_compiles_sass_tree() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let output = dir.path().join("build");
        fs::create_dir_all(source.join("scss")).unwrap();
        fs::write(
            source.join("scss/_colors.scss"),
            "$brand: #336699;\n",
        )
        .unwrap();
        fs::write(
            source.join("scss/main.scss"),
            r#"
                @use "colors";
                .page { color: colors.$brand; }
                @media (min-width: 768px) { .page { margin: 0; } }
                @media (min-width: 768px) { .side { margin: 0; } }
            "#,
        )
        .unwrap();

        let mut config = ProjectConfig::default();
        config.build.source = source;
        config.build.output = output.clone();

        run(&config).unwrap();

        let plain = fs::read_to_string(output.join("css/main.css")).unwrap();
        let minified = fs::read_to_string(output.join("css/main.min.css")).unwrap();
        assert!(output.join("css/main.min.css.map").is_file());

        // Variable resolved by the sass compiler
        assert!(plain.contains("#336699") || plain.contains("#369"));
        // Duplicate media query consolidated
        assert_eq!(plain.matches("@media").count(), 1);
        // Every selector in the plain output survives minification
        assert!(minified.contains(".page"));
        assert!(minified.contains(".side"));
    }

    #[test]
    fn test_run_fails_on_sass_syntax_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir_all(source.join("scss")).unwrap();
        fs::write(source.join("scss/main.scss"), ".broken { color: ;;; }").unwrap();

        let mut config = ProjectConfig::default();
        config.build.source = source;
        config.build.output = dir.path().join("build");

        assert!(run(&config).is_err());
    }
}
