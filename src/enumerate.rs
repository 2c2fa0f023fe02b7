//! Worksheet metadata without building the model, and the row/cell
//! placement rules shared with the loader

use serde::Serialize;

use crate::errors::Error;
use crate::utils::{column_name, MAX_COLUMNS, MAX_ROWS};
use crate::xml::Element;

/// Summary of a worksheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorksheetInfo {
    /// Worksheet name
    pub name: String,
    /// Letters of the last column holding data
    pub last_column_letter: String,
    /// 0 based index of the last column holding data
    pub last_column_index: u32,
    /// Number of rows holding data
    pub total_rows: u32,
    /// `last_column_index + 1`
    pub total_columns: u32,
}

/// Name of a worksheet, `Worksheet_{ordinal}` when not declared
pub(crate) fn sheet_name(worksheet: &Element, ordinal: usize) -> String {
    match worksheet.attr("Name") {
        Some(name) => name.to_string(),
        None => format!("Worksheet_{}", ordinal),
    }
}

/// `Worksheet` elements of a workbook, with their 1 based ordinal
pub(crate) fn worksheets(workbook: &Element) -> impl Iterator<Item = (usize, &Element)> {
    workbook
        .children_named("Worksheet")
        .enumerate()
        .map(|(i, w)| (i + 1, w))
}

/// Names of every worksheet, in document order
pub fn list_names(workbook: &Element) -> Vec<String> {
    worksheets(workbook)
        .map(|(ordinal, w)| sheet_name(w, ordinal))
        .collect()
}

/// Dimensions of every worksheet, in document order
pub fn list_info(workbook: &Element) -> Result<Vec<WorksheetInfo>, Error> {
    let mut infos = Vec::new();
    for (ordinal, worksheet) in worksheets(workbook) {
        let mut last_column_index = 0;
        let mut total_rows = 0;
        for table in worksheet.children_named("Table") {
            for row in rows(table) {
                let (_, row) = row?;
                let mut has_data = false;
                for cell in cells(row) {
                    let (column, cell) = cell?;
                    if cell.child("Data").is_some() {
                        last_column_index = last_column_index.max(column - 1);
                        has_data = true;
                    }
                }
                if has_data {
                    total_rows += 1;
                }
            }
        }
        infos.push(WorksheetInfo {
            name: sheet_name(worksheet, ordinal),
            last_column_letter: column_name(last_column_index),
            last_column_index,
            total_rows,
            total_columns: last_column_index + 1,
        });
    }
    Ok(infos)
}

/// Parses a 1 based position attribute
pub(crate) fn index_attr(e: &Element, name: &str, max: u32) -> Result<Option<u32>, Error> {
    let Some(value) = e.attr(name) else {
        return Ok(None);
    };
    match atoi_simd::parse::<u32>(value.trim().as_bytes()) {
        Ok(i) if (1..=max).contains(&i) => Ok(Some(i)),
        Ok(i) => Err(Error::InvalidFormat(format!(
            "{} '{}' out of range on '{}'",
            name, i, e.name
        ))),
        Err(_) => Err(Error::ParseInt(value.to_string())),
    }
}

/// Parses a span attribute (`ss:MergeAcross`, `ss:Span`...), 0 when absent
pub(crate) fn span_attr(e: &Element, name: &str) -> Result<u32, Error> {
    match e.attr(name) {
        None => Ok(0),
        Some(value) => atoi_simd::parse::<u32>(value.trim().as_bytes())
            .map_err(|_| Error::ParseInt(value.to_string())),
    }
}

/// `Row` elements of a `Table` with their 1 based row
///
/// `ss:Index` sets the row, otherwise rows follow the previous one.
pub(crate) fn rows(table: &Element) -> impl Iterator<Item = Result<(u32, &Element), Error>> {
    let mut next = 1u32;
    table.children_named("Row").map(move |row| {
        let index = match index_attr(row, "Index", MAX_ROWS)? {
            Some(i) => i,
            None if next <= MAX_ROWS => next,
            None => return Err(Error::InvalidFormat("too many rows".to_string())),
        };
        next = index + 1;
        Ok((index, row))
    })
}

/// `Cell` elements of a `Row` with their 1 based column
///
/// `ss:Index` sets the column, otherwise a cell follows the previous one and
/// the columns it merges across.
pub(crate) fn cells(row: &Element) -> impl Iterator<Item = Result<(u32, &Element), Error>> {
    let mut next = 1u64;
    row.children_named("Cell").map(move |cell| {
        let column = match index_attr(cell, "Index", MAX_COLUMNS)? {
            Some(i) => i,
            None if next <= MAX_COLUMNS as u64 => next as u32,
            None => return Err(Error::InvalidFormat("too many columns".to_string())),
        };
        next = column as u64 + 1 + span_attr(cell, "MergeAcross")? as u64;
        Ok((column, cell))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    fn workbook(sheets: &str) -> Element {
        parse(&format!(
            r#"<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet"
 xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">{sheets}</Workbook>"#
        ))
        .unwrap()
    }

    #[test]
    fn test_list_names() {
        let doc = workbook(
            r#"<Worksheet ss:Name="Data"/><Worksheet/><Worksheet ss:Name="Caf&#233;"/>"#,
        );
        assert_eq!(list_names(&doc), vec!["Data", "Worksheet_2", "Café"]);
    }

    #[test]
    fn test_list_info() {
        let doc = workbook(
            r#"<Worksheet ss:Name="S1"><Table>
<Row><Cell><Data ss:Type="String">a</Data></Cell><Cell ss:StyleID="s1"/><Cell><Data ss:Type="Number">1</Data></Cell></Row>
<Row ss:StyleID="s2"><Cell ss:StyleID="s1"/></Row>
<Row><Cell ss:Index="5"><Data ss:Type="Number">2</Data></Cell></Row>
</Table></Worksheet>
<Worksheet><Table/></Worksheet>"#,
        );
        let infos = list_info(&doc).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(
            infos[0],
            WorksheetInfo {
                name: "S1".to_string(),
                last_column_letter: "E".to_string(),
                last_column_index: 4,
                total_rows: 2,
                total_columns: 5,
            }
        );
        assert_eq!(infos[1].name, "Worksheet_2");
        assert_eq!(infos[1].last_column_letter, "A");
        assert_eq!(infos[1].total_rows, 0);
        assert_eq!(infos[1].total_columns, 1);
    }

    #[test]
    fn test_cell_positions() {
        let doc = parse(
            r#"<Row><Cell/><Cell ss:MergeAcross="2"/><Cell/><Cell ss:Index="10"/><Cell/></Row>"#,
        )
        .unwrap();
        let columns: Vec<u32> = cells(&doc).map(|c| c.unwrap().0).collect();
        assert_eq!(columns, vec![1, 2, 5, 10, 11]);
    }

    #[test]
    fn test_row_positions() {
        let doc = parse(r#"<Table><Row/><Row ss:Index="4"/><Row/><Column/></Table>"#).unwrap();
        let indexes: Vec<u32> = rows(&doc).map(|r| r.unwrap().0).collect();
        assert_eq!(indexes, vec![1, 4, 5]);
    }

    #[test]
    fn test_invalid_index() {
        let doc = parse(r#"<Row><Cell ss:Index="0"/></Row>"#).unwrap();
        assert!(matches!(cells(&doc).next(), Some(Err(Error::InvalidFormat(_)))));
        let doc = parse(r#"<Row><Cell ss:Index="x"/></Row>"#).unwrap();
        assert!(matches!(cells(&doc).next(), Some(Err(Error::ParseInt(_)))));
    }
}
