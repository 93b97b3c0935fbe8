//! Minimal SFNT (TrueType/OpenType) container reader.
//!
//! Both WOFF containers repackage the tables of an SFNT font, so all we
//! need here is the table directory and each table's raw bytes. Glyph
//! data is never interpreted.

use anyhow::{Result, bail, ensure};

/// One entry of the SFNT table directory plus its payload.
#[derive(Debug, Clone)]
pub struct SfntTable {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub data: Vec<u8>,
}

/// A parsed SFNT font: the header flavor and its tables in directory order.
#[derive(Debug, Clone)]
pub struct SfntFont {
    /// sfnt version field, e.g. 0x00010000 for TrueType outlines.
    pub flavor: u32,
    pub tables: Vec<SfntTable>,
}

impl SfntFont {
    pub fn parse(data: &[u8]) -> Result<Self> {
        ensure!(data.len() >= 12, "font file too short for an sfnt header");

        let flavor = read_u32(data, 0)?;
        match flavor {
            0x0001_0000 | 0x4F54_544F | 0x7472_7565 => {}
            0x774F_4646 | 0x774F_4632 => bail!("already a WOFF container"),
            other => bail!("unrecognized sfnt version 0x{other:08x}"),
        }

        let num_tables = read_u16(data, 4)? as usize;
        ensure!(num_tables > 0, "font has no tables");
        ensure!(
            data.len() >= 12 + num_tables * 16,
            "table directory truncated"
        );

        let mut tables = Vec::with_capacity(num_tables);
        for i in 0..num_tables {
            let entry = 12 + i * 16;
            let mut tag = [0u8; 4];
            tag.copy_from_slice(&data[entry..entry + 4]);
            let checksum = read_u32(data, entry + 4)?;
            let offset = read_u32(data, entry + 8)? as usize;
            let length = read_u32(data, entry + 12)? as usize;

            let end = offset
                .checked_add(length)
                .filter(|end| *end <= data.len());
            let Some(end) = end else {
                bail!(
                    "table {} extends past end of file",
                    String::from_utf8_lossy(&tag)
                );
            };

            tables.push(SfntTable {
                tag,
                checksum,
                data: data[offset..end].to_vec(),
            });
        }

        Ok(Self { flavor, tables })
    }

    /// Size the font would occupy as an uncompressed SFNT with each table
    /// padded to a 4-byte boundary. Both WOFF headers record this.
    pub fn total_sfnt_size(&self) -> u32 {
        let dir = 12 + 16 * self.tables.len();
        let payload: usize = self.tables.iter().map(|t| padded_len(t.data.len())).sum();
        (dir + payload) as u32
    }
}

/// Round up to the next 4-byte boundary.
pub fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    match data.get(offset..offset + 2) {
        Some(b) => Ok(u16::from_be_bytes([b[0], b[1]])),
        None => bail!("unexpected end of font data at offset {offset}"),
    }
}

pub fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    match data.get(offset..offset + 4) {
        Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        None => bail!("unexpected end of font data at offset {offset}"),
    }
}
