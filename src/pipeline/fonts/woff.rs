//! WOFF 1.0 encoder (RFC-less; W3C REC-WOFF-20121213).
//!
//! Layout: a 44-byte header, one 20-byte directory entry per table, then
//! the table payloads. Each table is zlib-compressed individually; if
//! compression does not shrink a table it is stored raw, which the format
//! signals by compLength == origLength. Payloads start on 4-byte
//! boundaries.

use super::sfnt::{SfntFont, padded_len};
use anyhow::Result;
use flate2::{Compression, write::ZlibEncoder};
use std::io::Write;

const HEADER_LEN: usize = 44;
const DIR_ENTRY_LEN: usize = 20;

pub fn encode(font: &SfntFont) -> Result<Vec<u8>> {
    let num_tables = font.tables.len();

    // Compress every table up front; fall back to the raw bytes when zlib
    // does not win.
    let mut payloads = Vec::with_capacity(num_tables);
    for table in &font.tables {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&table.data)?;
        let compressed = encoder.finish()?;
        payloads.push(if compressed.len() < table.data.len() {
            compressed
        } else {
            table.data.clone()
        });
    }

    let dir_end = HEADER_LEN + num_tables * DIR_ENTRY_LEN;
    let total_len =
        dir_end + payloads.iter().map(|p| padded_len(p.len())).sum::<usize>();

    let mut out = Vec::with_capacity(total_len);

    out.extend_from_slice(b"wOFF");
    out.extend_from_slice(&font.flavor.to_be_bytes());
    out.extend_from_slice(&(total_len as u32).to_be_bytes());
    out.extend_from_slice(&(num_tables as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&font.total_sfnt_size().to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    out.extend_from_slice(&0u32.to_be_bytes()); // metaOffset
    out.extend_from_slice(&0u32.to_be_bytes()); // metaLength
    out.extend_from_slice(&0u32.to_be_bytes()); // metaOrigLength
    out.extend_from_slice(&0u32.to_be_bytes()); // privOffset
    out.extend_from_slice(&0u32.to_be_bytes()); // privLength

    let mut offset = dir_end;
    for (table, payload) in font.tables.iter().zip(&payloads) {
        out.extend_from_slice(&table.tag);
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&table.checksum.to_be_bytes());
        offset += padded_len(payload.len());
    }

    for payload in &payloads {
        out.extend_from_slice(payload);
        out.resize(padded_len(out.len()), 0);
    }

    debug_assert_eq!(out.len(), total_len);
    Ok(out)
}
