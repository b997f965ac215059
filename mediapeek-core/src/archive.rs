//! Recover the name of the first regular file inside a ZIP or TAR prefix.
//!
//! Everything here works on the bytes already fetched. Truncated or malformed
//! headers degrade to `None` so callers can keep the HTTP-declared filename.

use tracing::debug;

const MATROSKA_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const FTYP: &[u8; 4] = b"ftyp";

const ZIP_LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const ZIP_LOCAL_HEADER_LEN: usize = 30;

const TAR_BLOCK: usize = 512;
const TAR_NAME: std::ops::Range<usize> = 0..100;
const TAR_SIZE: std::ops::Range<usize> = 124..136;
const TAR_TYPEFLAG: usize = 156;
const TAR_MAGIC: std::ops::Range<usize> = 257..263;
const TAR_PREFIX: std::ops::Range<usize> = 345..500;

/// What the leading bytes of a buffer look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Matroska,
    IsoMedia,
    Zip,
    Tar,
    Unknown,
}

impl ContainerKind {
    pub fn is_archive(self) -> bool {
        matches!(self, ContainerKind::Zip | ContainerKind::Tar)
    }
}

/// Classify a buffer by signature. Media signatures win over archive ones.
pub fn detect_container(bytes: &[u8]) -> ContainerKind {
    if bytes.starts_with(&MATROSKA_MAGIC) {
        ContainerKind::Matroska
    } else if bytes.get(4..8) == Some(FTYP.as_slice()) {
        ContainerKind::IsoMedia
    } else if read_u32_le(bytes, 0) == Some(ZIP_LOCAL_HEADER_SIG) {
        ContainerKind::Zip
    } else if has_ustar_magic(bytes) {
        ContainerKind::Tar
    } else {
        ContainerKind::Unknown
    }
}

/// Name of the first non-directory entry of an archive prefix.
///
/// Returns `None` for media files, unknown data, archives whose first regular
/// entry lies beyond the prefix, and anything structurally invalid.
pub fn extract_first_filename(bytes: &[u8]) -> Option<String> {
    match detect_container(bytes) {
        ContainerKind::Zip => first_zip_entry(bytes),
        ContainerKind::Tar => first_tar_entry(bytes),
        kind => {
            debug!(?kind, "buffer is not a recognised archive");
            None
        }
    }
}

fn first_zip_entry(bytes: &[u8]) -> Option<String> {
    let mut offset = 0usize;

    while read_u32_le(bytes, offset)? == ZIP_LOCAL_HEADER_SIG {
        let compressed = read_u32_le(bytes, offset + 18)? as usize;
        let name_len = read_u16_le(bytes, offset + 26)? as usize;
        let extra_len = read_u16_le(bytes, offset + 28)? as usize;

        let name_start = offset.checked_add(ZIP_LOCAL_HEADER_LEN)?;
        let name_end = name_start.checked_add(name_len)?;
        let name = decode_name(bytes.get(name_start..name_end)?);
        if name.is_empty() {
            return None;
        }

        if !name.ends_with('/') {
            return Some(name);
        }

        debug!(entry = %name, "skipping zip directory entry");
        offset = name_end.checked_add(extra_len)?.checked_add(compressed)?;
    }

    None
}

fn first_tar_entry(bytes: &[u8]) -> Option<String> {
    let mut offset = 0usize;
    let mut zero_blocks = 0u8;

    loop {
        let header = bytes.get(offset..offset.checked_add(TAR_BLOCK)?)?;

        if header.iter().all(|b| *b == 0) {
            zero_blocks += 1;
            if zero_blocks >= 2 {
                return None;
            }
            offset += TAR_BLOCK;
            continue;
        }
        zero_blocks = 0;

        if !header[TAR_MAGIC].starts_with(b"ustar") {
            return None;
        }

        let size = usize::try_from(parse_octal(&header[TAR_SIZE])?).ok()?;
        let data_start = offset + TAR_BLOCK;

        match header[TAR_TYPEFLAG] {
            b'L' => {
                // The data block carries the real name of the next entry.
                let raw = bytes.get(data_start..data_start.checked_add(size)?)?;
                let name = decode_name(until_nul(raw));
                return (!name.is_empty()).then_some(name);
            }
            b'5' => {
                debug!(
                    entry = %decode_name(until_nul(&header[TAR_NAME])),
                    "skipping tar directory entry"
                );
                offset = data_start.checked_add(round_up_block(size)?)?;
            }
            _ => {
                let name = tar_entry_name(header);
                return (!name.is_empty()).then_some(name);
            }
        }
    }
}

fn tar_entry_name(header: &[u8]) -> String {
    let name = decode_name(until_nul(&header[TAR_NAME]));
    // Only POSIX headers use the prefix field; GNU stores timestamps there.
    if &header[TAR_MAGIC] != b"ustar\0" {
        return name;
    }
    let prefix = decode_name(until_nul(&header[TAR_PREFIX]));
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

fn has_ustar_magic(bytes: &[u8]) -> bool {
    bytes
        .get(TAR_MAGIC.start..TAR_MAGIC.start + 5)
        .is_some_and(|magic| magic == b"ustar")
}

/// Parse a TAR numeric field: octal ASCII terminated by NUL or space, or
/// the GNU base-256 form flagged by the high bit of the first byte.
fn parse_octal(field: &[u8]) -> Option<u64> {
    if let Some(first) = field.first()
        && first & 0x80 != 0
    {
        return field[1..].iter().try_fold(u64::from(first & 0x7F), |acc, b| {
            acc.checked_mul(256)?.checked_add(u64::from(*b))
        });
    }

    let digits = field
        .iter()
        .skip_while(|b| **b == b' ')
        .take_while(|b| **b != 0 && **b != b' ');

    let mut value = 0u64;
    for digit in digits {
        if !(b'0'..=b'7').contains(digit) {
            return None;
        }
        value = value.checked_mul(8)?.checked_add(u64::from(digit - b'0'))?;
    }
    Some(value)
}

fn round_up_block(size: usize) -> Option<usize> {
    size.checked_add(TAR_BLOCK - 1)
        .map(|padded| padded / TAR_BLOCK * TAR_BLOCK)
}

fn until_nul(raw: &[u8]) -> &[u8] {
    match raw.iter().position(|b| *b == 0) {
        Some(end) => &raw[..end],
        None => raw,
    }
}

/// UTF-8 when valid, otherwise every byte maps to the code point of equal value.
fn decode_name(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(name) => name.to_string(),
        Err(_) => raw.iter().map(|b| char::from(*b)).collect(),
    }
}

fn read_u16_le(bytes: &[u8], offset: usize) -> Option<u16> {
    let raw = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
