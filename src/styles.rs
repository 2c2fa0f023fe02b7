// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Style table built from the `Styles` section of a workbook

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};

use crate::style::*;
use crate::xml::Element;

/// Identifier of the style every other style inherits from
pub const DEFAULT_STYLE_ID: &str = "Default";

/// Child elements of a `Style`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StyleCategory {
    Alignment,
    Borders,
    Font,
    Interior,
    NumberFormat,
    Protection,
}

impl StyleCategory {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Alignment" => Some(StyleCategory::Alignment),
            "Borders" => Some(StyleCategory::Borders),
            "Font" => Some(StyleCategory::Font),
            "Interior" => Some(StyleCategory::Interior),
            "NumberFormat" => Some(StyleCategory::NumberFormat),
            "Protection" => Some(StyleCategory::Protection),
            _ => None,
        }
    }
}

/// Style records keyed by their `ss:ID`
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleTable {
    styles: HashMap<String, Arc<StyleRecord>>,
}

impl StyleTable {
    /// Builds the table from the root `Workbook` element
    ///
    /// Each style starts as a copy of the `Default` style as parsed so far.
    pub fn from_workbook(workbook: &Element) -> StyleTable {
        let mut table = StyleTable::default();
        let styles = workbook.children_named("Styles").flat_map(|s| s.children_named("Style"));
        for style in styles {
            let Some(id) = style.attr("ID") else {
                debug!("style without ss:ID skipped");
                continue;
            };
            let mut record = table
                .styles
                .get(DEFAULT_STYLE_ID)
                .map(|d| StyleRecord::clone(d))
                .unwrap_or_default();
            for child in style.elements() {
                match StyleCategory::from_name(&child.name) {
                    Some(category) => apply_category(&mut record, category, child),
                    None => debug!("unknown style category '{}' in style '{}'", child.name, id),
                }
            }
            table.styles.insert(id.to_string(), Arc::new(record));
        }
        table
    }

    /// Style applicable to a cell: `None` when the id is unknown or its record is empty
    pub fn resolve(&self, id: &str) -> Option<&Arc<StyleRecord>> {
        self.styles.get(id).filter(|s| !s.is_empty())
    }

    /// Number of styles in the table
    pub fn len(&self) -> usize {
        self.styles.len()
    }
}

fn apply_category(record: &mut StyleRecord, category: StyleCategory, e: &Element) {
    match category {
        StyleCategory::Alignment => read_alignment(record, e),
        StyleCategory::Borders => read_borders(record, e),
        StyleCategory::Font => read_font(record, e),
        StyleCategory::Interior => {
            if let Some(color) = e.attr("Color") {
                record.fill.get_or_insert_with(Fill::default).color = Some(strip_marker(color));
            }
        }
        StyleCategory::NumberFormat => {
            if let Some(format) = e.attr("Format").and_then(number_format) {
                record.number_format = Some(NumberFormat::new(format));
            }
        }
        StyleCategory::Protection => {
            for a in e.plain_attrs() {
                trace!("protection attribute '{}' not mapped", a.name);
            }
        }
    }
}

fn read_alignment(record: &mut StyleRecord, e: &Element) {
    for a in e.plain_attrs() {
        match a.name.as_str() {
            "Horizontal" => match HorizontalAlignment::from_name(&a.value) {
                Some(h) => alignment(record).horizontal = Some(h),
                None => debug!("unknown horizontal alignment '{}'", a.value),
            },
            "Vertical" => match VerticalAlignment::from_name(&a.value) {
                Some(v) => alignment(record).vertical = Some(v),
                None => debug!("unknown vertical alignment '{}'", a.value),
            },
            "WrapText" => alignment(record).wrap_text = Some(flag(&a.value)),
            _ => (),
        }
    }
}

fn alignment(record: &mut StyleRecord) -> &mut Alignment {
    record.alignment.get_or_insert_with(Alignment::default)
}

fn read_borders(record: &mut StyleRecord, e: &Element) {
    for b in e.children_named("Border") {
        let mut border = None;
        let mut position = None;
        for a in b.plain_attrs() {
            match a.name.as_str() {
                "LineStyle" => {
                    border.get_or_insert_with(Border::default).style = BorderStyle::Medium;
                }
                "Color" => {
                    border.get_or_insert_with(Border::default).color = Some(strip_marker(&a.value));
                }
                "Position" => position = Some(a.value.to_ascii_lowercase()),
                _ => (),
            }
        }
        let Some(border) = border else {
            continue;
        };
        match position.as_deref().and_then(BorderPosition::from_name) {
            Some(p) => record.borders.get_or_insert_with(Borders::default).set(p, border),
            None => debug!("border position {:?} not supported", position),
        }
    }
}

fn read_font(record: &mut StyleRecord, e: &Element) {
    for a in e.plain_attrs() {
        match a.name.as_str() {
            "FontName" => font(record).name = Some(a.value.clone()),
            "Size" => match fast_float2::parse::<f64, _>(a.value.trim()) {
                Ok(size) => font(record).size = Some(size),
                Err(_) => debug!("invalid font size '{}'", a.value),
            },
            "Color" => font(record).color = Some(strip_marker(&a.value)),
            "Bold" => font(record).bold = Some(flag(&a.value)),
            "Italic" => font(record).italic = Some(flag(&a.value)),
            "Underline" => match UnderlineStyle::from_name(&a.value) {
                Some(u) => font(record).underline = Some(u),
                None => debug!("unknown underline style '{}'", a.value),
            },
            _ => (),
        }
    }
}

fn font(record: &mut StyleRecord) -> &mut Font {
    record.font.get_or_insert_with(Font::default)
}

/// `"0"` is false, any other value true
fn flag(value: &str) -> bool {
    value.trim() != "0"
}

/// Removes the leading `#` of a color
fn strip_marker(color: &str) -> String {
    color.strip_prefix('#').unwrap_or(color).to_string()
}

fn number_format(format: &str) -> Option<String> {
    let format = format.replace("\\-", "-").replace("\\ ", " ");
    let format = match format.as_str() {
        "Short Date" => "dd/mm/yyyy".to_string(),
        _ => format,
    };
    if format.is_empty() {
        None
    } else {
        Some(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    fn table(styles: &str) -> StyleTable {
        let doc = format!(
            r#"<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet"
 xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet"><Styles>{styles}</Styles></Workbook>"#
        );
        StyleTable::from_workbook(&parse(&doc).unwrap())
    }

    #[test]
    fn test_inherit_default() {
        let t = table(
            r##"<Style ss:ID="Default" ss:Name="Normal"><Font ss:FontName="Arial"/></Style>
<Style ss:ID="s1"><Font ss:Bold="1"/></Style>"##,
        );
        let font = t.resolve("s1").unwrap().get_font().unwrap();
        assert_eq!(font.name.as_deref(), Some("Arial"));
        assert!(font.is_bold());
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_default_snapshot() {
        // styles declared before Default do not inherit from it
        let t = table(
            r##"<Style ss:ID="s0"><Interior ss:Color="#00FF00"/></Style>
<Style ss:ID="Default"><Font ss:FontName="Arial"/></Style>"##,
        );
        assert!(t.resolve("s0").unwrap().get_font().is_none());
        assert_eq!(
            t.resolve("s0").unwrap().get_fill().unwrap().color.as_deref(),
            Some("00FF00")
        );
    }

    #[test]
    fn test_empty_style_resolves_to_none() {
        let t = table(
            r##"<Style ss:ID="s1"><Protection ss:Protected="0"/></Style>"##,
        );
        assert_eq!(t.len(), 1);
        assert!(t.resolve("s1").is_none());
        assert!(t.resolve("missing").is_none());
    }

    #[test]
    fn test_alignment_and_font() {
        let t = table(
            r##"<Style ss:ID="s1">
<Alignment ss:Horizontal="CENTER" ss:Vertical="Distributed" ss:WrapText="1"/>
<Font ss:Size="12.5" ss:Color="#FF0000" ss:Italic="0" ss:Underline="SingleAccounting"/>
</Style>
<Style ss:ID="s2"><Font ss:FontName="Arial" ss:Size="big" ss:Underline="Wavy"/><Unknown/></Style>
<Style ss:ID="s3"><Font ss:Size="big"/></Style>"##,
        );
        let s1 = t.resolve("s1").unwrap();
        let alignment = s1.get_alignment().unwrap();
        assert_eq!(alignment.horizontal, Some(HorizontalAlignment::Center));
        assert_eq!(alignment.vertical, None);
        assert_eq!(alignment.wrap_text, Some(true));
        let font = s1.get_font().unwrap();
        assert_eq!(font.size, Some(12.5));
        assert_eq!(font.color.as_deref(), Some("FF0000"));
        assert_eq!(font.italic, Some(false));
        assert_eq!(font.underline, Some(UnderlineStyle::SingleAccounting));

        let s2 = t.resolve("s2").unwrap().get_font().unwrap();
        assert_eq!(s2.name.as_deref(), Some("Arial"));
        assert_eq!(s2.size, None);
        assert_eq!(s2.underline, None);
        // only dropped values
        assert!(t.resolve("s3").is_none());
    }

    #[test]
    fn test_borders() {
        let t = table(
            r##"<Style ss:ID="s1"><Borders>
<Border ss:Position="Bottom" ss:LineStyle="Continuous" ss:Weight="1"/>
<Border ss:Position="Left" ss:Color="#123456"/>
<Border ss:Position="Top" ss:Weight="3"/>
<Border ss:Position="DiagonalLeft" ss:LineStyle="Continuous"/>
</Borders></Style>"##,
        );
        let borders = t.resolve("s1").unwrap().get_borders().unwrap();
        assert_eq!(borders.bottom, Some(Border::new(BorderStyle::Medium)));
        let left = borders.left.as_ref().unwrap();
        assert_eq!(left.style, BorderStyle::None);
        assert_eq!(left.color.as_deref(), Some("123456"));
        assert!(borders.top.is_none());
        assert!(borders.right.is_none());
    }

    #[test]
    fn test_number_formats() {
        let t = table(
            r##"<Style ss:ID="d"><NumberFormat ss:Format="Short Date"/></Style>
<Style ss:ID="n"><NumberFormat ss:Format="#,##0\-00\ &quot;x&quot;"/></Style>
<Style ss:ID="e"><NumberFormat ss:Format=""/></Style>"##,
        );
        assert_eq!(
            t.resolve("d").unwrap().get_number_format().unwrap().format_code,
            "dd/mm/yyyy"
        );
        assert_eq!(
            t.resolve("n").unwrap().get_number_format().unwrap().format_code,
            "#,##0-00 \"x\""
        );
        assert!(t.resolve("e").is_none());
    }
}
