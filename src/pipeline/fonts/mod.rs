//! Font conversion: every `.ttf` under the font directory becomes a
//! `.woff` and a `.woff2` in the output tree. The TrueType originals are
//! not copied; stylesheets reference the packaged formats only.

pub mod sfnt;
pub mod woff;
pub mod woff2;

use crate::{
    config::ProjectConfig,
    log,
    utils::fsx::{collect_files_with_ext, write_file},
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use sfnt::SfntFont;
use std::fs;
use std::path::Path;

pub fn run_woff(config: &ProjectConfig) -> Result<()> {
    convert(config, "woff", woff::encode)
}

pub fn run_woff2(config: &ProjectConfig) -> Result<()> {
    convert(config, "woff2", woff2::encode)
}

fn convert(
    config: &ProjectConfig,
    ext: &str,
    encode: fn(&SfntFont) -> Result<Vec<u8>>,
) -> Result<()> {
    let fonts_dir = config.fonts_dir();
    if !fonts_dir.is_dir() {
        log!("fonts"; "no font directory, skipping {ext}");
        return Ok(());
    }

    let fonts = collect_files_with_ext(&fonts_dir, &["ttf"]);
    if fonts.is_empty() {
        log!("fonts"; "no TrueType fonts found, skipping {ext}");
        return Ok(());
    }

    let out_dir = config.build.output.join("fonts");
    fonts
        .par_iter()
        .try_for_each(|path| convert_one(path, &fonts_dir, &out_dir, ext, encode))?;

    log!("fonts"; "packaged {} fonts as {ext}", fonts.len());
    Ok(())
}

fn convert_one(
    path: &Path,
    fonts_dir: &Path,
    out_dir: &Path,
    ext: &str,
    encode: fn(&SfntFont) -> Result<Vec<u8>>,
) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let font = SfntFont::parse(&data)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let encoded =
        encode(&font).with_context(|| format!("Failed to package {}", path.display()))?;

    let relative = path.strip_prefix(fonts_dir).unwrap_or(path);
    let target = out_dir.join(relative).with_extension(ext);
    write_file(&target, &encoded)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A structurally valid two-table TrueType file for container tests.
    pub(crate) fn minimal_ttf() -> Vec<u8> {
        let cmap: &[u8] = &[0, 0, 0, 1, 0, 12];
        let glyf: &[u8] = &[
            0, 1, 0, 0, 0, 0, 0, 0, 0, 50, 0, 50, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let tables: [(&[u8; 4], &[u8]); 2] = [(b"cmap", cmap), (b"glyf", glyf)];

        let mut out = Vec::new();
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        out.extend_from_slice(&2u16.to_be_bytes()); // numTables
        out.extend_from_slice(&32u16.to_be_bytes()); // searchRange
        out.extend_from_slice(&1u16.to_be_bytes()); // entrySelector
        out.extend_from_slice(&0u16.to_be_bytes()); // rangeShift

        let mut offset = 12 + 16 * tables.len();
        for (tag, data) in &tables {
            out.extend_from_slice(*tag);
            out.extend_from_slice(&0x1234_5678u32.to_be_bytes()); // checksum
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            offset += sfnt::padded_len(data.len());
        }
        for (_, data) in &tables {
            out.extend_from_slice(data);
            out.resize(sfnt::padded_len(out.len()), 0);
        }
        out
    }

    #[test]
    fn test_both_formats_emitted_per_font() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let fonts = source.join("fonts");
        std::fs::create_dir_all(&fonts).unwrap();
        std::fs::write(fonts.join("body.ttf"), minimal_ttf()).unwrap();

        let mut config = ProjectConfig::default();
        config.build.source = source;
        config.build.output = dir.path().join("build");

        run_woff(&config).unwrap();
        run_woff2(&config).unwrap();

        let woff = std::fs::read(config.build.output.join("fonts/body.woff")).unwrap();
        let woff2 = std::fs::read(config.build.output.join("fonts/body.woff2")).unwrap();
        assert_eq!(&woff[..4], b"wOFF");
        assert_eq!(&woff2[..4], b"wOF2");
        // the TrueType original stays out of the output tree
        assert!(!config.build.output.join("fonts/body.ttf").exists());
    }

    #[test]
    fn test_corrupt_font_fails_with_path() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let fonts = source.join("fonts");
        std::fs::create_dir_all(&fonts).unwrap();
        std::fs::write(fonts.join("broken.ttf"), b"not a font").unwrap();

        let mut config = ProjectConfig::default();
        config.build.source = source;
        config.build.output = dir.path().join("build");

        let err = run_woff(&config).unwrap_err();
        assert!(err.to_string().contains("broken.ttf"));
    }

    #[test]
    fn test_missing_font_dir_is_not_an_error() {
        let dir = tempdir().unwrap();
        let mut config = ProjectConfig::default();
        config.build.source = dir.path().join("source");
        config.build.output = dir.path().join("build");

        run_woff(&config).unwrap();
        run_woff2(&config).unwrap();
        assert!(!config.build.output.join("fonts").exists());
    }
}
