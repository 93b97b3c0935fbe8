//! WOFF 2.0 encoder (W3C REC-WOFF2-20180301), null transforms only.
//!
//! The format normally re-encodes `glyf`/`loca` into a compact transform
//! before compressing. We skip that: every table is stored with the null
//! transform (version 3 for `glyf`/`loca`, version 0 for the rest), and
//! the whole payload is a single Brotli stream of the concatenated,
//! unpadded table data. That is a conforming file; it simply leaves the
//! glyph-level savings on the table.

use super::sfnt::SfntFont;
use anyhow::Result;
use std::io::Write;

const HEADER_LEN: usize = 48;

/// flags bits 0-5: 0x3f means "arbitrary tag follows".
const TAG_FOLLOWS: u8 = 0x3f;
/// flags bits 6-7: transformation version 3, the null transform for
/// `glyf` and `loca` (other tables use version 0).
const NULL_TRANSFORM: u8 = 0xc0;

pub fn encode(font: &SfntFont) -> Result<Vec<u8>> {
    let mut directory = Vec::new();
    let mut payload = Vec::new();
    for table in &font.tables {
        let transformed = matches!(&table.tag, b"glyf" | b"loca");
        directory.push(if transformed {
            TAG_FOLLOWS | NULL_TRANSFORM
        } else {
            TAG_FOLLOWS
        });
        directory.extend_from_slice(&table.tag);
        write_uint_base128(&mut directory, table.data.len() as u32);
        payload.extend_from_slice(&table.data);
    }

    let mut compressed = Vec::new();
    {
        let mut encoder = brotli::CompressorWriter::new(&mut compressed, 4096, 11, 22);
        encoder.write_all(&payload)?;
    }

    let data_end = HEADER_LEN + directory.len() + compressed.len();
    let total_len = super::sfnt::padded_len(data_end);

    let mut out = Vec::with_capacity(total_len);

    out.extend_from_slice(b"wOF2");
    out.extend_from_slice(&font.flavor.to_be_bytes());
    out.extend_from_slice(&(total_len as u32).to_be_bytes());
    out.extend_from_slice(&(font.tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&font.total_sfnt_size().to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    out.extend_from_slice(&0u32.to_be_bytes()); // metaOffset
    out.extend_from_slice(&0u32.to_be_bytes()); // metaLength
    out.extend_from_slice(&0u32.to_be_bytes()); // metaOrigLength
    out.extend_from_slice(&0u32.to_be_bytes()); // privOffset
    out.extend_from_slice(&0u32.to_be_bytes()); // privLength

    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(total_len, 0);

    Ok(out)
}

/// Variable-length u32: big-endian 7-bit groups, high bit set on every
/// byte except the last.
fn write_uint_base128(out: &mut Vec<u8>, mut value: u32) {
    let mut groups = [0u8; 5];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7f) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fonts::sfnt::read_u32;
    use crate::pipeline::fonts::tests::minimal_ttf;
    use std::io::Read;

    fn base128(value: u32) -> Vec<u8> {
        let mut out = Vec::new();
        write_uint_base128(&mut out, value);
        out
    }

    #[test]
    fn test_uint_base128_encoding() {
        assert_eq!(base128(0), vec![0]);
        assert_eq!(base128(127), vec![0x7f]);
        assert_eq!(base128(128), vec![0x81, 0x00]);
        assert_eq!(base128(0x4000), vec![0x81, 0x80, 0x00]);
        assert_eq!(
            base128(u32::MAX),
            vec![0x8f, 0xff, 0xff, 0xff, 0x7f]
        );
    }

    #[test]
    fn test_encode_header() {
        let font = SfntFont::parse(&minimal_ttf()).unwrap();
        let woff2 = encode(&font).unwrap();

        assert_eq!(&woff2[..4], b"wOF2");
        assert_eq!(read_u32(&woff2, 4).unwrap(), font.flavor);
        assert_eq!(read_u32(&woff2, 8).unwrap() as usize, woff2.len());
        assert_eq!(woff2[12..14], (font.tables.len() as u16).to_be_bytes());
        assert_eq!(read_u32(&woff2, 16).unwrap(), font.total_sfnt_size());
        assert_eq!(woff2.len() % 4, 0);
    }

    #[test]
    fn test_payload_decompresses_to_table_data() {
        let font = SfntFont::parse(&minimal_ttf()).unwrap();
        let woff2 = encode(&font).unwrap();

        // Walk the directory: flags + tag + origLength per table (all our
        // lengths fit one base128 byte in the fixture).
        let mut pos = HEADER_LEN;
        for table in &font.tables {
            let flags = woff2[pos];
            assert_eq!(flags & 0x3f, TAG_FOLLOWS);
            assert_eq!(&woff2[pos + 1..pos + 5], &table.tag);
            assert_eq!(woff2[pos + 5] as usize, table.data.len());
            pos += 6;
        }

        let comp_len = read_u32(&woff2, 20).unwrap() as usize;
        let mut decoded = Vec::new();
        brotli::Decompressor::new(&woff2[pos..pos + comp_len], 4096)
            .read_to_end(&mut decoded)
            .unwrap();

        let expected: Vec<u8> = font
            .tables
            .iter()
            .flat_map(|t| t.data.clone())
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_glyf_uses_transform_version_three() {
        let font = SfntFont::parse(&minimal_ttf()).unwrap();
        let woff2 = encode(&font).unwrap();

        let mut pos = HEADER_LEN;
        for table in &font.tables {
            let flags = woff2[pos];
            if &table.tag == b"glyf" {
                assert_eq!(flags & 0xc0, NULL_TRANSFORM);
            } else {
                assert_eq!(flags & 0xc0, 0);
            }
            pos += 6;
        }
    }
}
