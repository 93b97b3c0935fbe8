//! Sprite builder: merge icon SVGs into one inline `sprite.svg`.
//!
//! Each icon becomes a `<symbol>` whose id is the icon's file stem and
//! whose `viewBox` is carried over from the icon root. Markup inside the
//! icon is preserved verbatim. Icons are read from the output tree (the
//! image optimizer has already rewritten them) in sorted filename order,
//! so builds are deterministic.

use crate::{
    config::ProjectConfig,
    log,
    utils::fsx::{collect_files_with_ext, write_file},
};
use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;

/// Output filename, written next to the icon directory.
const SPRITE_NAME: &str = "sprite.svg";

pub fn run(config: &ProjectConfig) -> Result<()> {
    let icons_dir = config.icons_output_dir();
    if !icons_dir.is_dir() {
        log!("sprite"; "no icon directory, skipping");
        return Ok(());
    }

    let icons: Vec<_> = collect_files_with_ext(&icons_dir, &["svg"])
        .into_iter()
        .filter(|p| p.file_name().is_none_or(|n| n != SPRITE_NAME))
        .collect();

    if icons.is_empty() {
        log!("sprite"; "no icons found, skipping");
        return Ok(());
    }

    let mut sprite = String::from(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" style="display:none">"#,
    );

    for icon in &icons {
        let stem = icon
            .file_stem()
            .and_then(|s| s.to_str())
            .context("icon filename is not valid UTF-8")?;
        let data = fs::read_to_string(icon)
            .with_context(|| format!("Failed to read {}", icon.display()))?;
        let symbol = icon_to_symbol(stem, &data)
            .with_context(|| format!("Failed to parse {}", icon.display()))?;
        sprite.push_str(&symbol);
    }

    sprite.push_str("</svg>");

    let sprite_dir = icons_dir
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| config.build.output.join("img"));
    write_file(&sprite_dir.join(SPRITE_NAME), sprite.as_bytes())?;

    log!("sprite"; "merged {} icons", icons.len());
    Ok(())
}

/// Convert one icon document into a `<symbol>` fragment.
fn icon_to_symbol(name: &str, data: &str) -> Result<String> {
    let mut reader = Reader::from_str(data);

    loop {
        match reader.read_event()? {
            Event::Start(elem) if elem.name().as_ref() == b"svg" => {
                let mut symbol = open_symbol(name, &elem)?;
                capture_inner(&mut reader, &mut symbol)?;
                symbol.push_str("</symbol>");
                return Ok(symbol);
            }
            Event::Empty(elem) if elem.name().as_ref() == b"svg" => {
                let mut symbol = open_symbol(name, &elem)?;
                symbol.push_str("</symbol>");
                return Ok(symbol);
            }
            Event::Eof => bail!("no <svg> root element"),
            // Prolog, comments and whitespace before the root
            _ => {}
        }
    }
}

/// Write the opening `<symbol>` tag, carrying over the icon's viewBox.
fn open_symbol(name: &str, elem: &BytesStart<'_>) -> Result<String> {
    let mut symbol = format!(r#"<symbol id="{name}""#);

    for attr in elem.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"viewBox" {
            symbol.push_str(&format!(
                r#" viewBox="{}""#,
                String::from_utf8_lossy(&attr.value)
            ));
        }
    }

    symbol.push('>');
    Ok(symbol)
}

/// Capture everything between `<svg>` and the matching `</svg>` verbatim.
fn capture_inner(reader: &mut Reader<&[u8]>, out: &mut String) -> Result<()> {
    let mut depth = 1u32;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                write_open_tag(out, &e, false)?;
            }
            Event::Empty(e) => write_open_tag(out, &e, true)?,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
                out.push_str("</");
                out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
                out.push('>');
            }
            Event::Text(e) => out.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => {
                out.push_str("<![CDATA[");
                out.push_str(&String::from_utf8_lossy(e.as_ref()));
                out.push_str("]]>");
            }
            Event::Comment(_) => {}
            Event::Eof => bail!("Unexpected EOF inside <svg>"),
            _ => {}
        }
    }
}

fn write_open_tag(out: &mut String, elem: &BytesStart<'_>, empty: bool) -> Result<()> {
    out.push('<');
    out.push_str(&String::from_utf8_lossy(elem.name().as_ref()));
    for attr in elem.attributes() {
        let attr = attr?;
        out.push(' ');
        out.push_str(&String::from_utf8_lossy(attr.key.as_ref()));
        out.push_str("=\"");
        out.push_str(&String::from_utf8_lossy(&attr.value));
        out.push('"');
    }
    out.push_str(if empty { "/>" } else { ">" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use tempfile::tempdir;

    const ARROW: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><path d="M0 0h16v16z"/></svg>"#;
    const DOT: &str = r#"<?xml version="1.0"?><svg viewBox="0 0 8 8"><circle cx="4" cy="4" r="3"/></svg>"#;

    #[test]
    fn test_icon_to_symbol_preserves_viewbox_and_content() {
        let symbol = icon_to_symbol("arrow", ARROW).unwrap();

        assert!(symbol.starts_with(r#"<symbol id="arrow" viewBox="0 0 16 16">"#));
        assert!(symbol.contains(r#"<path d="M0 0h16v16z"/>"#));
        assert!(symbol.ends_with("</symbol>"));
    }

    #[test]
    fn test_icon_to_symbol_handles_prolog() {
        let symbol = icon_to_symbol("dot", DOT).unwrap();
        assert!(symbol.contains(r#"id="dot""#));
        assert!(symbol.contains("<circle"));
    }

    #[test]
    fn test_icon_to_symbol_rejects_non_svg() {
        assert!(icon_to_symbol("x", "<div>nope</div>").is_err());
    }

    #[test]
    fn test_run_builds_single_sprite_document() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("build");
        let icons = output.join("img/icons-sprite");
        std::fs::create_dir_all(&icons).unwrap();
        std::fs::write(icons.join("arrow.svg"), ARROW).unwrap();
        std::fs::write(icons.join("dot.svg"), DOT).unwrap();

        let mut config = ProjectConfig::default();
        config.build.output = output.clone();

        run(&config).unwrap();

        let sprite = std::fs::read_to_string(output.join("img/sprite.svg")).unwrap();
        // Single document, one symbol per icon, ids preserved
        assert!(sprite.starts_with("<svg"));
        assert!(sprite.ends_with("</svg>"));
        assert_eq!(sprite.matches("<symbol").count(), 2);
        assert!(sprite.contains(r#"id="arrow""#));
        assert!(sprite.contains(r#"id="dot""#));
        // Sorted order: arrow before dot
        assert!(sprite.find("arrow").unwrap() < sprite.find("dot").unwrap());
    }

    #[test]
    fn test_run_without_icon_dir() {
        let dir = tempdir().unwrap();
        let mut config = ProjectConfig::default();
        config.build.output = dir.path().join("build");

        run(&config).unwrap();
        assert!(!config.build.output.join("img/sprite.svg").exists());
    }
}
