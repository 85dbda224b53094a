//! Format detection for ODT documents.

use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Magic bytes for ZIP archive (packaged ODT)
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// UTF-8 byte order mark
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Supported document format types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Zipped OpenDocument package (.odt, .ott)
    Odt,
    /// Single-file XML OpenDocument (.fodt)
    FlatOdt,
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Odt => write!(f, "ODT"),
            FormatType::FlatOdt => write!(f, "Flat ODT"),
        }
    }
}

/// Detect document format from a file path.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let mut file = std::fs::File::open(path)?;
    detect_format(&mut file)
}

/// Detect document format from a reader.
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> Result<FormatType> {
    let mut buffer = [0u8; 64];

    reader.seek(SeekFrom::Start(0))?;
    let bytes_read = reader.read(&mut buffer)?;
    reader.seek(SeekFrom::Start(0))?;

    detect_format_from_bytes(&buffer[..bytes_read])
}

/// Detect document format from the leading bytes of a document.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if data.len() < ZIP_MAGIC.len() {
        return Err(Error::InvalidData("File too small".into()));
    }

    if data.starts_with(&ZIP_MAGIC) {
        return Ok(FormatType::Odt);
    }

    let body = data.strip_prefix(&UTF8_BOM[..]).unwrap_or(data);
    let first = body.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'<') {
        return Ok(FormatType::FlatOdt);
    }

    Err(Error::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_zip() {
        let data = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x00, 0x00];
        assert_eq!(detect_format_from_bytes(&data).unwrap(), FormatType::Odt);
    }

    #[test]
    fn test_detect_flat_xml() {
        let data = b"<?xml version=\"1.0\"?><office:document/>";
        assert_eq!(detect_format_from_bytes(data).unwrap(), FormatType::FlatOdt);
    }

    #[test]
    fn test_detect_flat_xml_with_bom() {
        let data = b"\xEF\xBB\xBF\n  <office:document/>";
        assert_eq!(detect_format_from_bytes(data).unwrap(), FormatType::FlatOdt);
    }

    #[test]
    fn test_detect_too_short() {
        let result = detect_format_from_bytes(&[0x50, 0x4B]);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_detect_unknown() {
        let data = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_from_reader_rewinds() {
        let mut cursor = std::io::Cursor::new(b"PK\x03\x04rest of archive".to_vec());
        assert_eq!(detect_format(&mut cursor).unwrap(), FormatType::Odt);
        assert_eq!(cursor.position(), 0);
    }
}
