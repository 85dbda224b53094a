//! Error types for unodt library.

use std::io;
use thiserror::Error;

/// Result type alias for unodt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unodt library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The package is an OpenDocument file, but not a text document.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// ZIP archive parsing error.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// XML parsing error in content.xml or meta.xml.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Required package entry or element is missing.
    #[error("Missing required component: {0}")]
    MissingComponent(String),

    /// A table whose spans do not describe a rectangular grid.
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// Text encoding error.
    #[error("Text encoding error: {0}")]
    Encoding(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}
