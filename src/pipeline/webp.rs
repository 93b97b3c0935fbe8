//! WebP transcoder: mirror rasters already in `output/img` as `.webp`.
//!
//! Runs after the image optimizer, reads the output tree and writes
//! siblings with the extension swapped. The encoder is the image crate's
//! lossless WebP backend.

use crate::{
    config::ProjectConfig,
    log,
    utils::fsx::{collect_files_with_ext, write_file},
};
use anyhow::{Context, Result};
use image::{ColorType, ImageEncoder, codecs::webp::WebPEncoder};
use rayon::prelude::*;
use std::{fs, path::Path};

/// Raster extensions mirrored to WebP.
pub const RASTER_EXTS: &[&str] = &["png", "jpg", "jpeg"];

pub fn run(config: &ProjectConfig) -> Result<()> {
    let img_dir = config.build.output.join("img");
    if !img_dir.is_dir() {
        log!("webp"; "no output images, skipping");
        return Ok(());
    }

    let files = collect_files_with_ext(&img_dir, RASTER_EXTS);

    files.par_iter().try_for_each(|path| {
        transcode(path).with_context(|| format!("Failed to transcode {}", path.display()))
    })?;

    log!("webp"; "mirrored {} images", files.len());
    Ok(())
}

fn transcode(path: &Path) -> Result<()> {
    let data = fs::read(path)?;
    let img = image::load_from_memory(&data).context("Failed to decode raster")?;
    let rgba = img.to_rgba8();

    let mut out = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut out);
    encoder
        .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
        .context("Failed to encode WebP")?;

    write_file(&path.with_extension("webp"), &out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_png(path: &Path) {
        let img = RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 30) as u8, (y * 30) as u8, 0, 255]));
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_every_raster_gets_webp_sibling() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("build");
        fs::create_dir_all(output.join("img/nested")).unwrap();
        write_png(&output.join("img/a.png"));
        write_png(&output.join("img/nested/b.png"));
        fs::write(output.join("img/icon.svg"), "<svg/>").unwrap();

        let mut config = ProjectConfig::default();
        config.build.output = output.clone();

        run(&config).unwrap();

        assert!(output.join("img/a.webp").is_file());
        assert!(output.join("img/nested/b.webp").is_file());
        // Vectors are not mirrored
        assert!(!output.join("img/icon.webp").exists());

        // Emitted file decodes as webp
        let webp = fs::read(output.join("img/a.webp")).unwrap();
        let decoded = image::load_from_memory(&webp).unwrap();
        assert_eq!(decoded.width(), 8);
    }

    #[test]
    fn test_skip_when_no_output_images() {
        let dir = tempdir().unwrap();
        let mut config = ProjectConfig::default();
        config.build.output = dir.path().join("build");

        run(&config).unwrap();
    }
}
