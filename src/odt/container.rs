//! ZIP container wrapper for ODT packages.

use crate::error::{Error, Result};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// ODT package paths.
pub(crate) mod paths {
    pub const MIMETYPE: &str = "mimetype";
    pub const CONTENT_XML: &str = "content.xml";
    pub const META_XML: &str = "meta.xml";
    pub const PICTURES_DIR: &str = "pictures";
}

/// Mimetypes of ODF text documents.
const TEXT_MIMETYPES: &[&str] = &[
    "application/vnd.oasis.opendocument.text",
    "application/vnd.oasis.opendocument.text-template",
    "application/vnd.oasis.opendocument.text-master",
];

/// Picture extensions copied out of the package.
const PICTURE_EXTENSIONS: &[&str] = &["png", "jpg"];

/// ZIP container wrapper for ODT files.
pub struct OdtContainer {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl OdtContainer {
    /// Opens an ODT container from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Opens an ODT container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Opens an ODT container from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = ZipArchive::new(cursor)?;
        Ok(Self { archive })
    }

    /// Verifies this package holds a text document.
    ///
    /// A package without a `mimetype` entry is accepted.
    pub fn verify_mimetype(&mut self) -> Result<()> {
        match self.read_file(paths::MIMETYPE) {
            Ok(content) => {
                let mimetype = content.trim();
                if TEXT_MIMETYPES.contains(&mimetype) {
                    Ok(())
                } else {
                    Err(Error::UnsupportedFormat(mimetype.to_string()))
                }
            }
            Err(Error::MissingComponent(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Reads a file from the archive as UTF-8 string.
    pub fn read_file(&mut self, path: &str) -> Result<String> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }

    /// Reads a binary file from the archive.
    pub fn read_binary(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Reads the content.xml document body.
    pub fn read_content_xml(&mut self) -> Result<String> {
        self.read_file(paths::CONTENT_XML)
    }

    /// Reads meta.xml, if present.
    pub fn read_meta_xml(&mut self) -> Option<String> {
        self.read_file(paths::META_XML).ok()
    }

    /// Lists the PNG and JPEG entries of the Pictures folder, sorted by path.
    pub fn list_pictures(&mut self) -> Vec<String> {
        let mut pictures: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| is_picture_path(name))
            .map(str::to_string)
            .collect();

        pictures.sort();
        pictures
    }
}

/// Returns true for `Pictures/<name>.png|jpg`, ignoring case.
fn is_picture_path(path: &str) -> bool {
    let Some((folder, name)) = path.rsplit_once('/') else {
        return false;
    };
    if !folder.eq_ignore_ascii_case(paths::PICTURES_DIR) {
        return false;
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => PICTURE_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        _ => false,
    }
}
