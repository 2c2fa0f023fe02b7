//! In-memory spreadsheet model produced by the loader

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::datatype::{CellKind, Data};
use crate::errors::Error;
use crate::properties::DocumentProperties;
use crate::range::Range;
use crate::style::StyleRecord;
use crate::utils::{coordinate_to_name, name_to_coordinate};

/// Plain text content of a comment, markup stripped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichText {
    text: String,
}

impl RichText {
    /// Creates a new rich text from plain text
    pub fn new(text: String) -> Self {
        RichText { text }
    }

    /// Plain text
    pub fn plain_text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A cell comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    /// Author, `"unknown"` when not declared
    pub author: String,
    /// Body
    pub text: RichText,
}

/// A worksheet cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    row: u32,
    column: u32,
    /// Type tag
    pub kind: CellKind,
    /// Value, or cached value of a formula
    pub value: Data,
    /// Formula with A1 references
    pub formula: Option<String>,
    /// Range covered by an array formula, with A1 references
    pub array_range: Option<String>,
    /// `ss:StyleID` of the cell, when a style was applied
    pub style_id: Option<String>,
    /// Resolved style, shared with every cell using the same id
    pub style: Option<Arc<StyleRecord>>,
    /// Comment
    pub comment: Option<Comment>,
}

impl Cell {
    /// Creates a new valueless cell at a 1 based position
    pub fn new(row: u32, column: u32) -> Self {
        Cell {
            row,
            column,
            kind: CellKind::Null,
            value: Data::Empty,
            formula: None,
            array_range: None,
            style_id: None,
            style: None,
            comment: None,
        }
    }

    /// 1 based row
    pub fn row(&self) -> u32 {
        self.row
    }

    /// 1 based column
    pub fn column(&self) -> u32 {
        self.column
    }

    /// A1 address of the cell
    pub fn address(&self) -> String {
        coordinate_to_name(self.row, self.column)
    }

    /// Is this a formula cell
    pub fn is_formula(&self) -> bool {
        self.kind == CellKind::Formula
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}

/// A merged block of cells
///
/// Only the top left (anchor) cell holds a value and a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeRegion {
    /// Top left (row, column)
    pub start: (u32, u32),
    /// Bottom right (row, column)
    pub end: (u32, u32),
}

impl MergeRegion {
    /// Is the 1 based position inside the region
    pub fn contains(&self, row: u32, column: u32) -> bool {
        (self.start.0..=self.end.0).contains(&row) && (self.start.1..=self.end.1).contains(&column)
    }

    /// Do both regions share at least one position
    pub fn overlaps(&self, other: &MergeRegion) -> bool {
        self.start.0 <= other.end.0
            && other.start.0 <= self.end.0
            && self.start.1 <= other.end.1
            && other.start.1 <= self.end.1
    }
}

impl fmt::Display for MergeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            coordinate_to_name(self.start.0, self.start.1),
            coordinate_to_name(self.end.0, self.end.1)
        )
    }
}

/// Row level formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowDimension {
    /// Height in points
    pub height: Option<f64>,
    /// Row `ss:StyleID`
    pub style_id: Option<String>,
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Portrait
    Portrait,
    /// Landscape
    Landscape,
}

impl Orientation {
    /// Parses a `x:Orientation` value, case insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("portrait") {
            Some(Orientation::Portrait)
        } else if name.eq_ignore_ascii_case("landscape") {
            Some(Orientation::Landscape)
        } else {
            None
        }
    }
}

/// Page margins, in inches
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMargins {
    /// Top
    pub top: Option<f64>,
    /// Bottom
    pub bottom: Option<f64>,
    /// Left
    pub left: Option<f64>,
    /// Right
    pub right: Option<f64>,
    /// Header
    pub header: Option<f64>,
    /// Footer
    pub footer: Option<f64>,
}

/// Print settings of a worksheet
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageSetup {
    /// Orientation
    pub orientation: Option<Orientation>,
    /// Margins
    pub margins: PageMargins,
    /// Paper size code (`9` is A4)
    pub paper_size: Option<u32>,
}

/// A worksheet and its content
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
    merges: Vec<MergeRegion>,
    column_widths: BTreeMap<u32, f64>,
    rows: BTreeMap<u32, RowDimension>,
    page_setup: PageSetup,
}

impl Worksheet {
    /// Creates an empty worksheet
    pub fn new(name: String) -> Self {
        Worksheet {
            name,
            ..Default::default()
        }
    }

    /// Worksheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell at a 1 based position
    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }

    /// Cell at an A1 address
    pub fn cell_by_name(&self, name: &str) -> Option<&Cell> {
        name_to_coordinate(name).and_then(|(row, column)| self.cell(row, column))
    }

    /// All cells, row by row
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Merge regions, in document order
    pub fn merges(&self) -> &[MergeRegion] {
        &self.merges
    }

    /// Merge region containing a 1 based position
    pub fn merge_at(&self, row: u32, column: u32) -> Option<&MergeRegion> {
        self.merges.iter().find(|m| m.contains(row, column))
    }

    /// Width of a 1 based column, in characters
    pub fn column_width(&self, column: u32) -> Option<f64> {
        self.column_widths.get(&column).copied()
    }

    /// Column widths, by 1 based column
    pub fn column_widths(&self) -> &BTreeMap<u32, f64> {
        &self.column_widths
    }

    /// Row formatting of a 1 based row
    pub fn row_dimension(&self, row: u32) -> Option<&RowDimension> {
        self.rows.get(&row)
    }

    /// Print settings
    pub fn page_setup(&self) -> &PageSetup {
        &self.page_setup
    }

    /// Style applying to a position, merged cells taking the style of their anchor
    pub fn style_at(&self, row: u32, column: u32) -> Option<&StyleRecord> {
        if let Some(style) = self.cell(row, column).and_then(|c| c.style.as_deref()) {
            return Some(style);
        }
        let anchor = self.merge_at(row, column)?.start;
        self.cell(anchor.0, anchor.1)
            .and_then(|c| c.style.as_deref())
    }

    /// Dense view of the cell values
    ///
    /// Fails with [`Error::RangeTooLarge`] when the used area is too big to be
    /// laid out densely.
    pub fn range(&self) -> Result<Range<Data>, Error> {
        let cells = self
            .cells
            .iter()
            .filter(|(_, c)| c.value != Data::Empty)
            .map(|(&pos, c)| (pos, c.value.clone()))
            .collect();
        Range::from_sparse(cells)
    }

    /// Dense view of the formulas
    pub fn formulas(&self) -> Result<Range<String>, Error> {
        let cells = self
            .cells
            .iter()
            .filter_map(|(&pos, c)| c.formula.clone().map(|f| (pos, f)))
            .collect();
        Range::from_sparse(cells)
    }

    pub(crate) fn cell_mut(&mut self, row: u32, column: u32) -> &mut Cell {
        self.cells
            .entry((row, column))
            .or_insert_with(|| Cell::new(row, column))
    }

    pub(crate) fn add_merge(&mut self, merge: MergeRegion) {
        self.merges.push(merge);
    }

    pub(crate) fn set_column_width(&mut self, column: u32, width: f64) {
        self.column_widths.insert(column, width);
    }

    pub(crate) fn set_row_dimension(&mut self, row: u32, dimension: RowDimension) {
        self.rows.insert(row, dimension);
    }

    pub(crate) fn page_setup_mut(&mut self) -> &mut PageSetup {
        &mut self.page_setup
    }
}

/// A loaded workbook: its worksheets and metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Spreadsheet {
    sheets: Vec<Worksheet>,
    properties: DocumentProperties,
}

impl Spreadsheet {
    pub(crate) fn new(properties: DocumentProperties) -> Self {
        Spreadsheet {
            sheets: Vec::new(),
            properties,
        }
    }

    /// Worksheet names, in document order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Worksheet by name
    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Worksheet by 0 based position
    pub fn worksheet_at(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    /// All worksheets, in document order
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// Number of worksheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Has no worksheet
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Document properties
    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    pub(crate) fn push(&mut self, sheet: Worksheet) {
        self.sheets.push(sheet);
    }
}
