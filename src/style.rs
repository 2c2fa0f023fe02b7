// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Cell formatting records
//!
//! Every sub-record of a [`StyleRecord`] is optional: an unset sub-record leaves
//! that aspect of the cell unstyled.

use serde::Serialize;

/// Border style enumeration
///
/// XML Spreadsheet line styles are all read as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BorderStyle {
    /// No border
    #[default]
    None,
    /// Thin border
    Thin,
    /// Medium border
    Medium,
    /// Thick border
    Thick,
}

/// Border side
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Border {
    /// Border style
    pub style: BorderStyle,
    /// Border color, hex text without the leading `#`
    pub color: Option<String>,
}

impl Border {
    /// Create a new border with style
    pub fn new(style: BorderStyle) -> Self {
        Self { style, color: None }
    }

    /// Create a new border with style and color
    pub fn with_color(style: BorderStyle, color: String) -> Self {
        Self {
            style,
            color: Some(color),
        }
    }

    /// Check if border is visible
    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None
    }
}

/// Border position within a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderPosition {
    /// Left side
    Left,
    /// Right side
    Right,
    /// Top side
    Top,
    /// Bottom side
    Bottom,
}

impl BorderPosition {
    /// Parses a lower cased position name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(BorderPosition::Left),
            "right" => Some(BorderPosition::Right),
            "top" => Some(BorderPosition::Top),
            "bottom" => Some(BorderPosition::Bottom),
            _ => None,
        }
    }
}

/// All borders for a cell
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Borders {
    /// Left border
    pub left: Option<Border>,
    /// Right border
    pub right: Option<Border>,
    /// Top border
    pub top: Option<Border>,
    /// Bottom border
    pub bottom: Option<Border>,
}

impl Borders {
    /// Create new borders
    pub fn new() -> Self {
        Self::default()
    }

    /// Border at this position
    pub fn get(&self, position: BorderPosition) -> Option<&Border> {
        match position {
            BorderPosition::Left => self.left.as_ref(),
            BorderPosition::Right => self.right.as_ref(),
            BorderPosition::Top => self.top.as_ref(),
            BorderPosition::Bottom => self.bottom.as_ref(),
        }
    }

    /// Replaces the border at this position
    pub fn set(&mut self, position: BorderPosition, border: Border) {
        let side = match position {
            BorderPosition::Left => &mut self.left,
            BorderPosition::Right => &mut self.right,
            BorderPosition::Top => &mut self.top,
            BorderPosition::Bottom => &mut self.bottom,
        };
        *side = Some(border);
    }

    /// Check if any border is visible
    pub fn has_visible_borders(&self) -> bool {
        [&self.left, &self.right, &self.top, &self.bottom]
            .into_iter()
            .flatten()
            .any(Border::is_visible)
    }
}

/// Underline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UnderlineStyle {
    /// No underline
    #[default]
    None,
    /// Single underline
    Single,
    /// Double underline
    Double,
    /// Single accounting underline
    SingleAccounting,
    /// Double accounting underline
    DoubleAccounting,
}

impl UnderlineStyle {
    /// Parses an `ss:Underline` value, case insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(UnderlineStyle::None),
            "single" => Some(UnderlineStyle::Single),
            "double" => Some(UnderlineStyle::Double),
            "singleaccounting" => Some(UnderlineStyle::SingleAccounting),
            "doubleaccounting" => Some(UnderlineStyle::DoubleAccounting),
            _ => None,
        }
    }
}

/// Font properties
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Font {
    /// Font name
    pub name: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    /// Font color, hex text without the leading `#`
    pub color: Option<String>,
    /// Bold
    pub bold: Option<bool>,
    /// Italic
    pub italic: Option<bool>,
    /// Underline style
    pub underline: Option<UnderlineStyle>,
}

impl Font {
    /// Create a new font
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font name
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Set font size
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set font color
    pub fn with_color(mut self, color: String) -> Self {
        self.color = Some(color);
        self
    }

    /// Check if font is bold
    pub fn is_bold(&self) -> bool {
        self.bold == Some(true)
    }

    /// Check if font is italic
    pub fn is_italic(&self) -> bool {
        self.italic == Some(true)
    }

    /// Check if font has underline
    pub fn has_underline(&self) -> bool {
        self.underline.is_some_and(|u| u != UnderlineStyle::None)
    }
}

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HorizontalAlignment {
    /// General alignment (default)
    #[default]
    General,
    /// Left alignment
    Left,
    /// Right alignment
    Right,
    /// Center alignment
    Center,
    /// Center across selection
    CenterContinuous,
    /// Justify alignment
    Justify,
}

impl HorizontalAlignment {
    /// Parses an `ss:Horizontal` value, case insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "general" => Some(HorizontalAlignment::General),
            "left" => Some(HorizontalAlignment::Left),
            "right" => Some(HorizontalAlignment::Right),
            "center" => Some(HorizontalAlignment::Center),
            "centercontinuous" => Some(HorizontalAlignment::CenterContinuous),
            "justify" => Some(HorizontalAlignment::Justify),
            _ => None,
        }
    }
}

/// Vertical alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VerticalAlignment {
    /// Bottom alignment
    #[default]
    Bottom,
    /// Top alignment
    Top,
    /// Center alignment
    Center,
    /// Justify alignment
    Justify,
}

impl VerticalAlignment {
    /// Parses an `ss:Vertical` value, case insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bottom" => Some(VerticalAlignment::Bottom),
            "top" => Some(VerticalAlignment::Top),
            "center" => Some(VerticalAlignment::Center),
            "justify" => Some(VerticalAlignment::Justify),
            _ => None,
        }
    }
}

/// Cell alignment properties
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Alignment {
    /// Horizontal alignment
    pub horizontal: Option<HorizontalAlignment>,
    /// Vertical alignment
    pub vertical: Option<VerticalAlignment>,
    /// Wrap text
    pub wrap_text: Option<bool>,
}

impl Alignment {
    /// Create new alignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set horizontal alignment
    pub fn with_horizontal(mut self, horizontal: HorizontalAlignment) -> Self {
        self.horizontal = Some(horizontal);
        self
    }

    /// Set vertical alignment
    pub fn with_vertical(mut self, vertical: VerticalAlignment) -> Self {
        self.vertical = Some(vertical);
        self
    }

    /// Set wrap text
    pub fn with_wrap_text(mut self, wrap: bool) -> Self {
        self.wrap_text = Some(wrap);
        self
    }
}

/// Fill properties
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fill {
    /// Solid fill color, hex text without the leading `#`
    pub color: Option<String>,
}

impl Fill {
    /// Create solid fill with color
    pub fn solid(color: String) -> Self {
        Self { color: Some(color) }
    }
}

/// Number format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberFormat {
    /// Format code
    pub format_code: String,
}

impl NumberFormat {
    /// Create new number format
    pub fn new(format_code: String) -> Self {
        Self { format_code }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            format_code: "General".to_string(),
        }
    }
}

/// Complete cell style
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleRecord {
    /// Alignment
    pub alignment: Option<Alignment>,
    /// Borders
    pub borders: Option<Borders>,
    /// Font
    pub font: Option<Font>,
    /// Fill
    pub fill: Option<Fill>,
    /// Number format
    pub number_format: Option<NumberFormat>,
}

impl StyleRecord {
    /// Create new style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    /// Set fill
    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Set borders
    pub fn with_borders(mut self, borders: Borders) -> Self {
        self.borders = Some(borders);
        self
    }

    /// Set alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Set number format
    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.number_format = Some(number_format);
        self
    }

    /// Get font
    pub fn get_font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    /// Get fill
    pub fn get_fill(&self) -> Option<&Fill> {
        self.fill.as_ref()
    }

    /// Get borders
    pub fn get_borders(&self) -> Option<&Borders> {
        self.borders.as_ref()
    }

    /// Get alignment
    pub fn get_alignment(&self) -> Option<&Alignment> {
        self.alignment.as_ref()
    }

    /// Get number format
    pub fn get_number_format(&self) -> Option<&NumberFormat> {
        self.number_format.as_ref()
    }

    /// Check if style is empty (no formatting applied)
    pub fn is_empty(&self) -> bool {
        self.font.is_none()
            && self.fill.is_none()
            && self.borders.is_none()
            && self.alignment.is_none()
            && self.number_format.is_none()
    }
}
