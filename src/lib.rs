//! Rust Office 2003 XML Spreadsheet reader
//!
//! # Status
//!
//! **spreadsheetml** is a pure Rust library to read legacy "XML Spreadsheet 2003"
//! (SpreadsheetML) files into an in-memory model: worksheets, typed cells, styles,
//! merged regions, formulas with A1 references and document properties.
//!
//! # Examples
//! ```
//! use spreadsheetml::{Data, DataType, SpreadsheetMl};
//! use std::io::Cursor;
//!
//! let xml = r#"<?xml version="1.0"?>
//! <?mso-application progid="Excel.Sheet"?>
//! <Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet"
//!  xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">
//!  <Worksheet ss:Name="Sheet1">
//!   <Table>
//!    <Row>
//!     <Cell><Data ss:Type="Number">2</Data></Cell>
//!     <Cell ss:Formula="=RC[-1]*2"><Data ss:Type="Number">4</Data></Cell>
//!    </Row>
//!   </Table>
//!  </Worksheet>
//! </Workbook>"#;
//!
//! let reader = SpreadsheetMl::new();
//! let book = reader.load(&mut Cursor::new(xml)).expect("Cannot read workbook");
//! let sheet = book.worksheet("Sheet1").expect("Cannot find 'Sheet1'");
//!
//! let b1 = sheet.cell_by_name("B1").expect("Cannot find B1");
//! assert_eq!(b1.formula.as_deref(), Some("=A1*2"));
//! assert_eq!(b1.value.get_int(), Some(4));
//!
//! // dense views of values and formulas
//! let range = sheet.range().expect("Cannot lay out values");
//! assert_eq!(range.get_size(), (1, 2));
//! assert_eq!(range.used_cells().count(), 2);
//! assert_eq!(range[(0, 0)], Data::Int(2));
//! ```
#![deny(missing_docs)]

#[macro_use]
mod utils;
mod datatype;
mod detect;
mod enumerate;
mod formula;
mod loader;
mod properties;
mod range;
mod style;
mod styles;
mod worksheet;
mod xml;

pub mod errors;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

pub use crate::datatype::{
    datetime_to_serial, parse_datetime, serial_to_datetime, CellErrorType, CellKind, Data,
    DataType,
};
pub use crate::detect::{can_read, sniff, Charset, Detection, SNIFF_LEN};
pub use crate::enumerate::WorksheetInfo;
pub use crate::errors::Error;
pub use crate::formula::translate as translate_formula;
pub use crate::properties::{CustomProperty, DocumentProperties, PropertyType};
pub use crate::range::{CellType, Range, Rows, UsedCells, MAX_RANGE_CELLS};
pub use crate::style::{
    Alignment, Border, BorderPosition, BorderStyle, Borders, Fill, Font, HorizontalAlignment,
    NumberFormat, StyleRecord, UnderlineStyle, VerticalAlignment,
};
pub use crate::worksheet::{
    Cell, Comment, MergeRegion, Orientation, PageMargins, PageSetup, RichText, RowDimension,
    Spreadsheet, Worksheet,
};
pub use crate::xml::{
    NS_COMPONENT, NS_DATA_TYPE, NS_EXCEL, NS_OFFICE, NS_RECORDSET, NS_ROWSET, NS_SCHEMA,
    NS_SPREADSHEET,
};

use crate::loader::LoadOptions;
use crate::xml::Element;

/// Decides which cells are loaded
pub trait ReadFilter {
    /// Should the cell at (`column` letters, 1 based `row`) of `worksheet` be loaded
    fn read_cell(&self, column: &str, row: u32, worksheet: &str) -> bool;
}

impl<F> ReadFilter for F
where
    F: Fn(&str, u32, &str) -> bool,
{
    fn read_cell(&self, column: &str, row: u32, worksheet: &str) -> bool {
        self(column, row, worksheet)
    }
}

/// A filter loading every cell
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReadFilter;

impl ReadFilter for DefaultReadFilter {
    fn read_cell(&self, _column: &str, _row: u32, _worksheet: &str) -> bool {
        true
    }
}

/// XML Spreadsheet reader
///
/// The reader only holds options: every load parses its source from scratch.
#[derive(Default)]
pub struct SpreadsheetMl {
    options: LoadOptions,
}

impl fmt::Debug for SpreadsheetMl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpreadsheetMl")
            .field("sheets_only", &self.options.sheets_only)
            .field("read_filter", &self.options.read_filter.is_some())
            .finish()
    }
}

impl SpreadsheetMl {
    /// Creates a reader loading every sheet and every cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Only loads the worksheets with these names
    ///
    /// Worksheets without a name are always loaded.
    pub fn with_sheets_only<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.sheets_only = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Only loads the cells accepted by `filter`
    pub fn with_read_filter<F: ReadFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.options.read_filter = Some(Box::new(filter));
        self
    }

    /// Does the source start like an XML Spreadsheet document
    ///
    /// Only the first [`SNIFF_LEN`] bytes are read.
    pub fn can_read<RS: Read + Seek>(&self, reader: &mut RS) -> Result<bool, Error> {
        Ok(read_prefix(reader)?.is_valid)
    }

    /// Names of every worksheet, in document order
    pub fn list_worksheet_names<RS: Read + Seek>(
        &self,
        reader: &mut RS,
    ) -> Result<Vec<String>, Error> {
        let workbook = read_workbook(reader)?;
        Ok(enumerate::list_names(&workbook))
    }

    /// Dimensions of every worksheet, in document order
    pub fn list_worksheet_info<RS: Read + Seek>(
        &self,
        reader: &mut RS,
    ) -> Result<Vec<WorksheetInfo>, Error> {
        let workbook = read_workbook(reader)?;
        enumerate::list_info(&workbook)
    }

    /// Loads a whole workbook
    pub fn load<RS: Read + Seek>(&self, reader: &mut RS) -> Result<Spreadsheet, Error> {
        let workbook = read_workbook(reader)?;
        loader::load(&workbook, &self.options)
    }

    /// Loads a whole workbook from a file
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Spreadsheet, Error> {
        let mut reader = open_path(path.as_ref())?;
        self.load(&mut reader)
    }
}

/// Opens and loads a workbook with default options
///
/// # Examples
/// ```
/// use spreadsheetml::open_spreadsheet;
///
/// # let path = format!("{}/tests/budget.xml", env!("CARGO_MANIFEST_DIR"));
/// let book = open_spreadsheet(path).expect("Cannot open file");
/// for sheet in book.worksheets() {
///     println!("{}: {} cells", sheet.name(), sheet.cells().count());
/// }
/// ```
pub fn open_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Spreadsheet, Error> {
    SpreadsheetMl::new().load_path(path)
}

fn open_path(path: &Path) -> Result<BufReader<File>, Error> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    Ok(BufReader::new(File::open(path)?))
}

/// Sniffs the first bytes of the source
fn read_prefix<RS: Read + Seek>(reader: &mut RS) -> Result<Detection, Error> {
    reader.seek(SeekFrom::Start(0))?;
    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    reader.by_ref().take(SNIFF_LEN as u64).read_to_end(&mut prefix)?;
    Ok(sniff(&prefix))
}

/// Validates, decodes and parses the whole source
fn read_workbook<RS: Read + Seek>(reader: &mut RS) -> Result<Element, Error> {
    let detection = read_prefix(reader)?;
    if !detection.is_valid {
        return Err(Error::InvalidFormat(
            "missing XML Spreadsheet signature".to_string(),
        ));
    }
    let charset = detection.charset()?;
    debug!("decoding document as {}", charset.name());

    reader.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = charset.decode(&bytes)?;
    let workbook = xml::parse(&text)?;
    xml::check_workbook(&workbook)?;
    Ok(workbook)
}
