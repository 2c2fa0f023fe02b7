//! `Error` management module
//!
//! Every fatal condition met while reading a document aborts the whole load
//! and surfaces as one of these variants.

use std::path::PathBuf;

/// An enum for SpreadsheetML reader errors
#[derive(Debug)]
pub enum Error {
    /// Io error
    Io(std::io::Error),
    /// The input file does not exist
    NotFound(PathBuf),
    /// The input is not an XML Spreadsheet document
    InvalidFormat(String),
    /// Xml error
    Xml(quick_xml::Error),
    /// Xml attribute error
    XmlAttr(quick_xml::events::attributes::AttrError),
    /// XML encoding error
    Encoding(quick_xml::encoding::EncodingError),
    /// Unexpected end of xml
    XmlEof(&'static str),
    /// Entity reference which is neither predefined nor a character reference
    UnknownEntity(String),
    /// The declared charset is not supported
    UnsupportedCharset(String),
    /// The content is not valid for the declared charset
    Decoding(&'static str),
    /// Float error
    ParseFloat(fast_float2::Error),
    /// Integer error
    ParseInt(String),
    /// Date or time value which cannot be parsed
    InvalidDateTime(String),
    /// Cell error value which is not recognized
    CellError(String),
    /// A formula reference points outside of the worksheet
    ReferenceOutOfRange {
        /// resolved row (1 based)
        row: i64,
        /// resolved column (1 based)
        column: i64,
    },
    /// A dense view would hold too many cells
    RangeTooLarge {
        /// number of rows
        rows: u64,
        /// number of columns
        columns: u64,
    },
}

from_err!(std::io::Error, Error, Io);
from_err!(quick_xml::Error, Error, Xml);
from_err!(quick_xml::events::attributes::AttrError, Error, XmlAttr);
from_err!(quick_xml::encoding::EncodingError, Error, Encoding);
from_err!(fast_float2::Error, Error, ParseFloat);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::NotFound(p) => {
                write!(f, "Could not open {} for reading, file does not exist", p.display())
            }
            Error::InvalidFormat(e) => write!(f, "Invalid XML Spreadsheet file: {e}"),
            Error::Xml(e) => write!(f, "Xml error: {e}"),
            Error::XmlAttr(e) => write!(f, "Xml attribute error: {e}"),
            Error::Encoding(e) => write!(f, "XML encoding error: {e}"),
            Error::XmlEof(e) => write!(f, "Unexpected end of xml, expecting '</{e}>'"),
            Error::UnknownEntity(e) => write!(f, "Unknown entity reference '&{e};'"),
            Error::UnsupportedCharset(e) => write!(f, "Unsupported charset '{e}'"),
            Error::Decoding(e) => write!(f, "Content is not valid {e}"),
            Error::ParseFloat(e) => write!(f, "Parse float error: {e}"),
            Error::ParseInt(e) => write!(f, "Parse integer error: '{e}'"),
            Error::InvalidDateTime(e) => write!(f, "Invalid date time '{e}'"),
            Error::CellError(e) => write!(f, "Unsupported cell error value '{e}'"),
            Error::ReferenceOutOfRange { row, column } => write!(
                f,
                "Formula reference out of range (row {row}, column {column})"
            ),
            Error::RangeTooLarge { rows, columns } => write!(
                f,
                "Range of {rows} rows by {columns} columns is too large"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Xml(e) => Some(e),
            Error::XmlAttr(e) => Some(e),
            Error::Encoding(e) => Some(e),
            Error::ParseFloat(e) => Some(e),
            _ => None,
        }
    }
}
