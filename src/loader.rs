// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Builds a [`Spreadsheet`] from a parsed workbook

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, trace};

use crate::datatype::{datetime_to_serial, parse_datetime, CellErrorType, CellKind, Data};
use crate::enumerate::{cells, index_attr, rows, sheet_name, span_attr, worksheets};
use crate::errors::Error;
use crate::formula::translate;
use crate::properties::read_properties;
use crate::styles::StyleTable;
use crate::utils::{column_name, MAX_COLUMNS, MAX_ROWS};
use crate::worksheet::{
    Comment, MergeRegion, Orientation, PageSetup, RichText, RowDimension, Spreadsheet, Worksheet,
};
use crate::xml::Element;
use crate::{DefaultReadFilter, ReadFilter};

/// Ratio between `ss:Width` (points) and column widths (characters)
const WIDTH_RATIO: f64 = 5.4;

const UNKNOWN_AUTHOR: &str = "unknown";

/// Options of a load
#[derive(Default)]
pub(crate) struct LoadOptions {
    /// Only load the named sheets listed here
    pub sheets_only: Option<Vec<String>>,
    /// Cells rejected by the filter are skipped
    pub read_filter: Option<Box<dyn ReadFilter>>,
}

/// Loads every (selected) worksheet of a workbook
pub(crate) fn load(workbook: &Element, options: &LoadOptions) -> Result<Spreadsheet, Error> {
    let properties = read_properties(workbook)?;
    let styles = StyleTable::from_workbook(workbook);
    debug!("{} styles found", styles.len());

    let filter: &dyn ReadFilter = match &options.read_filter {
        Some(f) => &**f,
        None => &DefaultReadFilter,
    };

    let mut book = Spreadsheet::new(properties);
    for (ordinal, worksheet) in worksheets(workbook) {
        if let (Some(only), Some(name)) = (&options.sheets_only, worksheet.attr("Name")) {
            if !only.iter().any(|n| n == name) {
                debug!("skipping worksheet '{}'", name);
                continue;
            }
        }
        let name = sheet_name(worksheet, ordinal);
        if book.contains(&name) {
            return Err(Error::InvalidFormat(format!(
                "duplicate worksheet name '{}'",
                name
            )));
        }
        let mut sheet = Worksheet::new(name);
        let mut placement = Placement::default();
        for table in worksheet.children_named("Table") {
            read_columns(&mut sheet, table)?;
            read_rows(&mut sheet, table, &styles, filter, &mut placement)?;
        }
        for sheet_options in worksheet.children_named("WorksheetOptions") {
            read_page_setup(sheet.page_setup_mut(), sheet_options);
        }
        book.push(sheet);
    }
    Ok(book)
}

fn read_columns(sheet: &mut Worksheet, table: &Element) -> Result<(), Error> {
    let mut next = 1u32;
    for column in table.children_named("Column") {
        let index = match index_attr(column, "Index", MAX_COLUMNS)? {
            Some(i) => i,
            None if next <= MAX_COLUMNS => next,
            None => return Err(Error::InvalidFormat("too many columns".to_string())),
        };
        let last = index.saturating_add(span_attr(column, "Span")?);
        if last > MAX_COLUMNS {
            return Err(Error::InvalidFormat(format!(
                "column span from column {} out of range",
                index
            )));
        }
        if let Some(width) = column.attr("Width") {
            let width = fast_float2::parse::<f64, _>(width.trim().as_bytes())? / WIDTH_RATIO;
            for c in index..=last {
                sheet.set_column_width(c, width);
            }
        }
        next = last + 1;
    }
    Ok(())
}

/// Positions already taken in a worksheet, filtered cells included
#[derive(Default)]
struct Placement {
    cells: BTreeSet<(u32, u32)>,
    merges: Vec<MergeRegion>,
}

impl Placement {
    /// Takes the position of a cell, and the region it merges if any
    fn take(&mut self, row: u32, column: u32, merge: Option<MergeRegion>) -> Result<(), Error> {
        if !self.cells.insert((row, column)) {
            return Err(Error::InvalidFormat(format!(
                "duplicate cell at row {} column {}",
                row, column
            )));
        }
        if self.merges.iter().any(|m| m.contains(row, column)) {
            return Err(Error::InvalidFormat(format!(
                "cell at row {} column {} inside a merged region",
                row, column
            )));
        }
        let Some(merge) = merge else {
            return Ok(());
        };
        let overlaps_cell = self
            .cells
            .range(merge.start..=merge.end)
            .any(|&(r, c)| (r, c) != merge.start && merge.contains(r, c));
        if overlaps_cell || self.merges.iter().any(|m| m.overlaps(&merge)) {
            return Err(Error::InvalidFormat(format!(
                "merged region {} overlaps other cells",
                merge
            )));
        }
        self.merges.push(merge);
        Ok(())
    }
}

fn read_rows(
    sheet: &mut Worksheet,
    table: &Element,
    styles: &StyleTable,
    filter: &dyn ReadFilter,
    placement: &mut Placement,
) -> Result<(), Error> {
    let sheet_name = sheet.name().to_string();
    for row in rows(table) {
        let (row_index, row) = row?;
        let mut has_data = false;
        for cell in cells(row) {
            let (column, cell) = cell?;

            let across = span_attr(cell, "MergeAcross")?;
            let down = span_attr(cell, "MergeDown")?;
            let merge = if across > 0 || down > 0 {
                let end = (row_index.saturating_add(down), column.saturating_add(across));
                if end.0 > MAX_ROWS || end.1 > MAX_COLUMNS {
                    return Err(Error::InvalidFormat(format!(
                        "merge from row {} column {} out of range",
                        row_index, column
                    )));
                }
                Some(MergeRegion {
                    start: (row_index, column),
                    end,
                })
            } else {
                None
            };
            placement.take(row_index, column, merge)?;

            if !filter.read_cell(&column_name(column - 1), row_index, &sheet_name) {
                trace!("cell ({}, {}) filtered out", row_index, column);
                continue;
            }
            if let Some(merge) = merge {
                sheet.add_merge(merge);
            }

            let data = cell.child("Data");
            if let Some(data) = data {
                let (kind, value) = read_data(data)?;
                let c = sheet.cell_mut(row_index, column);
                c.kind = kind;
                c.value = value;
                if let Some(formula) = cell.attr("Formula") {
                    c.kind = CellKind::Formula;
                    c.formula = Some(translate(formula, row_index, column)?);
                    if let Some(array) = cell.attr("ArrayRange") {
                        c.array_range = Some(translate(array, row_index, column)?);
                    }
                }
                if let Some((id, style)) = cell
                    .attr("StyleID")
                    .and_then(|id| styles.resolve(id).map(|s| (id, s)))
                {
                    c.style_id = Some(id.to_string());
                    c.style = Some(Arc::clone(style));
                }
                has_data = true;
            } else if cell.attr("Formula").is_some() {
                debug!("formula without data ignored at ({}, {})", row_index, column);
            }

            if let Some(comment) = cell.child("Comment") {
                let author = comment.attr("Author").unwrap_or(UNKNOWN_AUTHOR).to_string();
                let text = comment.child("Data").map(Element::text).unwrap_or_default();
                sheet.cell_mut(row_index, column).comment = Some(Comment {
                    author,
                    text: RichText::new(text),
                });
            }
        }

        if has_data {
            let height = match row.attr("Height") {
                Some(h) => Some(fast_float2::parse::<f64, _>(h.trim().as_bytes())?),
                None => None,
            };
            let style_id = row.attr("StyleID").map(str::to_string);
            if height.is_some() || style_id.is_some() {
                sheet.set_row_dimension(row_index, RowDimension { height, style_id });
            }
        }
    }
    Ok(())
}

/// Reads a `Data` element into its kind and value
fn read_data(data: &Element) -> Result<(CellKind, Data), Error> {
    let text = data.text();
    Ok(match data.attr("Type") {
        Some("String") => (CellKind::String, Data::String(text)),
        Some("Number") => {
            let v = fast_float2::parse::<f64, _>(text.trim().as_bytes())?;
            (CellKind::Numeric, Data::from_number(v))
        }
        Some("Boolean") => {
            let v = text.trim();
            let b = match fast_float2::parse::<f64, _>(v.as_bytes()) {
                Ok(f) => f != 0.0,
                Err(_) => v.eq_ignore_ascii_case("true"),
            };
            (CellKind::Boolean, Data::Bool(b))
        }
        Some("DateTime") => {
            let serial = datetime_to_serial(parse_datetime(&text)?);
            (CellKind::Numeric, Data::Float(serial))
        }
        Some("Error") => (CellKind::Error, Data::Error(CellErrorType::from_text(&text))),
        t => {
            debug!("unknown data type {:?}", t);
            let value = if text.is_empty() {
                Data::Empty
            } else {
                Data::String(text)
            };
            (CellKind::Null, value)
        }
    })
}

fn read_page_setup(setup: &mut PageSetup, options: &Element) {
    if let Some(page) = options.child("PageSetup") {
        if let Some(layout) = page.child("Layout") {
            setup.orientation = layout.attr("Orientation").and_then(Orientation::from_name);
        }
        if let Some(margins) = page.child("PageMargins") {
            setup.margins.top = float_attr(margins, "Top");
            setup.margins.bottom = float_attr(margins, "Bottom");
            setup.margins.left = float_attr(margins, "Left");
            setup.margins.right = float_attr(margins, "Right");
        }
        if let Some(header) = page.child("Header") {
            setup.margins.header = float_attr(header, "Margin");
        }
        if let Some(footer) = page.child("Footer") {
            setup.margins.footer = float_attr(footer, "Margin");
        }
    }
    if let Some(size) = options
        .child("Print")
        .and_then(|p| p.child("PaperSizeIndex"))
    {
        let text = size.text();
        match atoi_simd::parse::<u32>(text.trim().as_bytes()) {
            Ok(s) => setup.paper_size = Some(s),
            Err(_) => debug!("invalid paper size '{}'", text),
        }
    }
}

/// Print settings are informative only: invalid values are dropped
fn float_attr(e: &Element, name: &str) -> Option<f64> {
    let value = e.attr(name)?;
    match fast_float2::parse::<f64, _>(value.trim().as_bytes()) {
        Ok(v) => Some(v),
        Err(_) => {
            debug!("invalid {} '{}' on '{}'", name, value, e.name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    fn load_str(body: &str, options: &LoadOptions) -> Result<Spreadsheet, Error> {
        let doc = parse(&format!(
            r#"<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet"
 xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet"
 xmlns:x="urn:schemas-microsoft-com:office:excel">{body}</Workbook>"#
        ))?;
        load(&doc, options)
    }

    fn data(kind: &str, text: &str) -> (CellKind, Data) {
        let doc = parse(&format!(r#"<Data ss:Type="{kind}">{text}</Data>"#)).unwrap();
        read_data(&doc).unwrap()
    }

    #[test]
    fn test_read_data() {
        assert_eq!(data("String", "a&amp;b"), (CellKind::String, Data::from("a&b")));
        assert_eq!(data("Number", "42"), (CellKind::Numeric, Data::Int(42)));
        assert_eq!(data("Number", " 4.5 "), (CellKind::Numeric, Data::Float(4.5)));
        assert_eq!(data("Boolean", "1"), (CellKind::Boolean, Data::Bool(true)));
        assert_eq!(data("Boolean", "0"), (CellKind::Boolean, Data::Bool(false)));
        assert_eq!(
            data("DateTime", "1970-01-01T12:00:00.000"),
            (CellKind::Numeric, Data::Float(25569.5))
        );
        assert_eq!(
            data("Error", "#DIV/0!"),
            (CellKind::Error, Data::Error(CellErrorType::Div0))
        );
        assert_eq!(
            data("Error", "#SPILL!"),
            (
                CellKind::Error,
                Data::Error(CellErrorType::Other("#SPILL!".to_string()))
            )
        );
        assert_eq!(data("Odd", "raw"), (CellKind::Null, Data::from("raw")));
        let doc = parse(r#"<Data ss:Type="Number">abc</Data>"#).unwrap();
        assert!(matches!(read_data(&doc), Err(Error::ParseFloat(_))));
    }

    #[test]
    fn test_merge_and_gaps() {
        let book = load_str(
            r#"<Worksheet ss:Name="S"><Table>
<Column ss:Width="54"/><Column ss:Index="3" ss:Span="1" ss:Width="27"/><Column ss:Width="10.8"/>
<Row ss:Height="20"><Cell ss:MergeAcross="1"><Data ss:Type="String">wide</Data></Cell><Cell><Data ss:Type="Number">3</Data></Cell></Row>
<Row ss:Index="4" ss:Height="30"><Cell ss:StyleID="s1"/></Row>
<Row><Cell ss:Index="2" ss:MergeDown="2"><Data ss:Type="Number">5</Data></Cell></Row>
</Table></Worksheet>"#,
            &LoadOptions::default(),
        )
        .unwrap();
        let s = book.worksheet("S").unwrap();
        assert_eq!(s.cell_by_name("A1").unwrap().value, Data::from("wide"));
        assert_eq!(s.cell_by_name("C1").unwrap().value, Data::Int(3));
        assert!(s.cell_by_name("B1").is_none());
        assert_eq!(s.cell_by_name("B5").unwrap().value, Data::Int(5));
        assert_eq!(
            s.merges(),
            &[
                MergeRegion { start: (1, 1), end: (1, 2) },
                MergeRegion { start: (5, 2), end: (7, 2) },
            ]
        );
        assert_eq!(s.column_width(1), Some(10.0));
        assert_eq!(s.column_width(2), None);
        assert_eq!(s.column_width(3), Some(5.0));
        assert_eq!(s.column_width(4), Some(5.0));
        assert_eq!(s.column_width(5), Some(2.0));
        assert_eq!(s.row_dimension(1).and_then(|r| r.height), Some(20.0));
        // no data in row 4
        assert!(s.row_dimension(4).is_none());
    }

    #[test]
    fn test_formulas() {
        let book = load_str(
            r#"<Worksheet ss:Name="F"><Table><Row ss:Index="5">
<Cell ss:Index="3" ss:Formula="=R[-1]C[1]"><Data ss:Type="Number">7</Data></Cell>
<Cell ss:Formula="=RC[-1]*2"/>
<Cell ss:Formula="=RC[-2]" ss:ArrayRange="RC:R[1]C"><Data ss:Type="Number">7</Data></Cell>
</Row></Table></Worksheet>"#,
            &LoadOptions::default(),
        )
        .unwrap();
        let s = book.worksheet("F").unwrap();
        let c = s.cell(5, 3).unwrap();
        assert_eq!(c.kind, CellKind::Formula);
        assert_eq!(c.formula.as_deref(), Some("=D4"));
        assert_eq!(c.value, Data::Int(7));
        assert!(s.cell(5, 4).is_none());
        let array = s.cell(5, 5).unwrap();
        assert_eq!(array.formula.as_deref(), Some("=C5"));
        assert_eq!(array.array_range.as_deref(), Some("E5:E6"));
    }

    #[test]
    fn test_formula_out_of_range() {
        let res = load_str(
            r#"<Worksheet><Table><Row><Cell ss:Formula="=R[-1]C"><Data ss:Type="Number">1</Data></Cell></Row></Table></Worksheet>"#,
            &LoadOptions::default(),
        );
        assert!(matches!(res, Err(Error::ReferenceOutOfRange { .. })));
    }

    #[test]
    fn test_comments() {
        let book = load_str(
            r#"<Worksheet ss:Name="C"><Table><Row>
<Cell><Comment ss:Author="Ann"><ss:Data xmlns="http://www.w3.org/TR/REC-html40"><B>Bold</B> note</ss:Data></Comment></Cell>
<Cell><Data ss:Type="String">v</Data><Comment><Data>plain</Data></Comment></Cell>
</Row></Table></Worksheet>"#,
            &LoadOptions::default(),
        )
        .unwrap();
        let s = book.worksheet("C").unwrap();
        let a1 = s.cell_by_name("A1").unwrap();
        assert_eq!(a1.kind, CellKind::Null);
        assert_eq!(a1.value, Data::Empty);
        let comment = a1.comment.as_ref().unwrap();
        assert_eq!(comment.author, "Ann");
        assert_eq!(comment.text.plain_text(), "Bold note");
        let b1 = s.cell_by_name("B1").unwrap();
        assert_eq!(b1.comment.as_ref().unwrap().author, "unknown");
        assert_eq!(b1.value, Data::from("v"));
    }

    #[test]
    fn test_styles_applied_to_data_cells() {
        let book = load_str(
            r##"<Styles><Style ss:ID="s1"><Font ss:Bold="1"/></Style><Style ss:ID="s2"/></Styles>
<Worksheet ss:Name="S"><Table><Row ss:StyleID="s1">
<Cell ss:StyleID="s1" ss:MergeAcross="1"><Data ss:Type="String">a</Data></Cell>
<Cell ss:StyleID="s1"/>
<Cell ss:StyleID="s2"><Data ss:Type="String">b</Data></Cell>
<Cell ss:StyleID="nope"><Data ss:Type="String">c</Data></Cell>
</Row></Table></Worksheet>"##,
            &LoadOptions::default(),
        )
        .unwrap();
        let s = book.worksheet("S").unwrap();
        assert_eq!(s.cell(1, 1).unwrap().style_id.as_deref(), Some("s1"));
        assert!(s.style_at(1, 2).and_then(|st| st.get_font()).is_some_and(|f| f.is_bold()));
        assert!(s.cell(1, 3).is_none());
        assert!(s.cell(1, 4).unwrap().style.is_none());
        assert!(s.cell(1, 5).unwrap().style_id.is_none());
        assert_eq!(
            s.row_dimension(1).and_then(|r| r.style_id.as_deref()),
            Some("s1")
        );
    }

    #[test]
    fn test_sheet_selection_and_filter() {
        let body = r#"<Worksheet ss:Name="A"><Table><Row>
<Cell ss:MergeAcross="1"><Data ss:Type="Number">1</Data></Cell><Cell><Data ss:Type="Number">2</Data></Cell>
</Row></Table></Worksheet>
<Worksheet ss:Name="B"/><Worksheet/>"#;
        let options = LoadOptions {
            sheets_only: Some(vec!["A".to_string()]),
            read_filter: Some(Box::new(|column: &str, _row: u32, _sheet: &str| column != "A")),
        };
        let book = load_str(body, &options).unwrap();
        assert_eq!(book.sheet_names(), vec!["A", "Worksheet_3"]);
        let a = book.worksheet("A").unwrap();
        assert!(a.cell(1, 1).is_none());
        assert!(a.merges().is_empty());
        assert_eq!(a.cell(1, 3).unwrap().value, Data::Int(2));
    }

    #[test]
    fn test_cell_collisions() {
        let load_rows = |rows: &str| {
            load_str(
                &format!(r#"<Worksheet ss:Name="S"><Table>{rows}</Table></Worksheet>"#),
                &LoadOptions::default(),
            )
        };
        // below a vertical merge
        let res = load_rows(
            r#"<Row><Cell ss:MergeDown="1"><Data ss:Type="String">top</Data></Cell></Row>
<Row><Cell><Data ss:Type="String">inside</Data></Cell></Row>"#,
        );
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
        // same column twice
        let res = load_rows(
            r#"<Row ss:Index="3"><Cell ss:Index="2"><Data ss:Type="Number">1</Data></Cell>
<Cell ss:Index="2"><Data ss:Type="Number">2</Data></Cell></Row>"#,
        );
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
        // same row twice
        let res = load_rows(
            r#"<Row ss:Index="2"><Cell><Data ss:Type="Number">1</Data></Cell></Row>
<Row ss:Index="2"><Cell><Data ss:Type="Number">2</Data></Cell></Row>"#,
        );
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
        // a merge reaching back over an earlier cell
        let res = load_rows(
            r#"<Row ss:Index="2"><Cell ss:Index="2"><Data ss:Type="Number">1</Data></Cell></Row>
<Row ss:Index="1"><Cell ss:MergeAcross="1" ss:MergeDown="1"><Data ss:Type="Number">2</Data></Cell></Row>"#,
        );
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
        // cells placed around a merge are fine
        let book = load_rows(
            r#"<Row><Cell ss:MergeAcross="1" ss:MergeDown="1"><Data ss:Type="Number">1</Data></Cell><Cell/></Row>
<Row><Cell ss:Index="3"><Data ss:Type="Number">2</Data></Cell></Row>"#,
        )
        .unwrap();
        assert_eq!(book.worksheet("S").unwrap().cell(2, 3).unwrap().value, Data::Int(2));
    }

    #[test]
    fn test_filtered_cells_still_placed() {
        let options = LoadOptions {
            read_filter: Some(Box::new(|_column: &str, row: u32, _sheet: &str| row != 1)),
            ..Default::default()
        };
        let res = load_str(
            r#"<Worksheet ss:Name="S"><Table>
<Row><Cell ss:MergeDown="1"><Data ss:Type="String">top</Data></Cell></Row>
<Row><Cell><Data ss:Type="String">inside</Data></Cell></Row>
</Table></Worksheet>"#,
            &options,
        );
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_column_span_out_of_range() {
        let res = load_str(
            r#"<Worksheet><Table><Column ss:Index="16384" ss:Span="1" ss:Width="10"/></Table></Worksheet>"#,
            &LoadOptions::default(),
        );
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_duplicate_names() {
        let res = load_str(
            r#"<Worksheet ss:Name="A"/><Worksheet ss:Name="A"/>"#,
            &LoadOptions::default(),
        );
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_page_setup() {
        let book = load_str(
            r#"<Worksheet ss:Name="P"><WorksheetOptions xmlns="urn:schemas-microsoft-com:office:excel">
<PageSetup><Layout x:Orientation="Landscape"/><Header x:Margin="0.3"/><Footer x:Margin="0.35"/>
<PageMargins x:Bottom="0.75" x:Left="0.7" x:Right="0.7" x:Top="oops"/></PageSetup>
<Print><ValidPrinterInfo/><PaperSizeIndex>9</PaperSizeIndex></Print>
</WorksheetOptions></Worksheet>"#,
            &LoadOptions::default(),
        )
        .unwrap();
        let setup = book.worksheet("P").unwrap().page_setup();
        assert_eq!(setup.orientation, Some(Orientation::Landscape));
        assert_eq!(setup.margins.top, None);
        assert_eq!(setup.margins.bottom, Some(0.75));
        assert_eq!(setup.margins.left, Some(0.7));
        assert_eq!(setup.margins.header, Some(0.3));
        assert_eq!(setup.margins.footer, Some(0.35));
        assert_eq!(setup.paper_size, Some(9));
    }
}
