//! Image optimizer: raster re-encode plus SVG rewrite, into `output/img`.
//!
//! JPEGs are re-encoded at the configured quality, PNGs at maximum
//! compression, SVGs go through the usvg rewrite pass. Whichever of the
//! original and re-encoded bytes is smaller wins, so the task never makes
//! a file bigger.

use crate::{
    config::ProjectConfig,
    log,
    utils::{
        fsx::{collect_files_with_ext, rebase, write_file},
        svg::optimize_svg,
    },
};
use anyhow::{Context, Result};
use image::{
    ColorType, ImageEncoder,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
    },
};
use rayon::prelude::*;
use std::{fs, path::Path};

/// Extensions handled by this task.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "svg"];

pub fn run(config: &ProjectConfig) -> Result<()> {
    let img_dir = config.build.source.join("img");
    if !img_dir.is_dir() {
        log!("images"; "no img directory, skipping");
        return Ok(());
    }

    let files = collect_files_with_ext(&img_dir, IMAGE_EXTS);

    files.par_iter().try_for_each(|path| {
        optimize_into_output(path, config)
            .with_context(|| format!("Failed to optimize {}", path.display()))
    })?;

    log!("images"; "optimized {} files", files.len());
    Ok(())
}

fn optimize_into_output(path: &Path, config: &ProjectConfig) -> Result<()> {
    let dst = rebase(path, &config.build.source, &config.build.output)?;
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let encoded = match ext.as_str() {
        "svg" => optimize_svg(&data)?,
        "png" => encode_png(&data)?,
        "jpg" | "jpeg" => encode_jpeg(&data, config.build.jpeg_quality)?,
        other => anyhow::bail!("unsupported image extension: {other}"),
    };

    // Keep whichever is smaller
    if encoded.len() < data.len() {
        write_file(&dst, &encoded)
    } else {
        write_file(&dst, &data)
    }
}

fn encode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("Failed to decode JPEG")?;
    let rgb = img.to_rgb8();

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .context("Failed to encode JPEG")?;
    Ok(out)
}

fn encode_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("Failed to decode PNG")?;
    let rgba = img.to_rgba8();

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    encoder
        .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
        .context("Failed to encode PNG")?;
    Ok(out)
}
