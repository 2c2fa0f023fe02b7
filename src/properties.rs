//! Document metadata: `DocumentProperties` and `CustomDocumentProperties`

use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::debug;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::datatype::parse_datetime;
use crate::errors::Error;
use crate::xml::Element;

static ESCAPED_CHAR: OnceLock<Regex> = OnceLock::new();

fn escaped_char() -> &'static Regex {
    ESCAPED_CHAR.get_or_init(|| Regex::new(r"_x([0-9A-Fa-f]{4})_").expect("valid escape regex"))
}

/// Standard document properties
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentProperties {
    /// Title
    pub title: Option<String>,
    /// Subject
    pub subject: Option<String>,
    /// Author
    pub creator: Option<String>,
    /// Creation date, as a Unix timestamp
    pub created: Option<i64>,
    /// Last author
    pub last_modified_by: Option<String>,
    /// Last save date, as a Unix timestamp
    pub modified: Option<i64>,
    /// Company
    pub company: Option<String>,
    /// Category
    pub category: Option<String>,
    /// Manager
    pub manager: Option<String>,
    /// Keywords
    pub keywords: Option<String>,
    /// Description
    pub description: Option<String>,
    /// User defined properties, by name
    pub custom: BTreeMap<String, CustomProperty>,
}

/// Type tag of a custom property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropertyType {
    /// Text
    String,
    /// Boolean
    Boolean,
    /// Integer
    Integer,
    /// Float
    Float,
    /// Date
    Date,
    /// Any other declared type
    Unknown,
}

impl PropertyType {
    /// Maps a `dt:dt` attribute value
    pub fn from_name(name: &str) -> PropertyType {
        match name {
            "string" => PropertyType::String,
            "boolean" => PropertyType::Boolean,
            "integer" => PropertyType::Integer,
            "float" => PropertyType::Float,
            "dateTime.tz" => PropertyType::Date,
            _ => PropertyType::Unknown,
        }
    }
}

/// A typed custom property value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CustomProperty {
    /// Text, trimmed
    String(String),
    /// Boolean
    Boolean(bool),
    /// Integer
    Integer(i64),
    /// Float
    Float(f64),
    /// Date, as a Unix timestamp
    Date(i64),
    /// Raw text of a property of an unknown type
    Unknown(String),
}

impl CustomProperty {
    /// Parses the text of a property declared with this type
    pub fn parse(kind: PropertyType, value: &str) -> Result<CustomProperty, Error> {
        Ok(match kind {
            PropertyType::String => CustomProperty::String(value.trim().to_string()),
            PropertyType::Boolean => CustomProperty::Boolean(parse_bool(value)),
            PropertyType::Integer => {
                let v = value.trim();
                let v = v.strip_prefix('+').unwrap_or(v);
                CustomProperty::Integer(
                    atoi_simd::parse::<i64>(v.as_bytes())
                        .map_err(|_| Error::ParseInt(value.to_string()))?,
                )
            }
            PropertyType::Float => {
                CustomProperty::Float(fast_float2::parse::<f64, _>(value.trim().as_bytes())?)
            }
            PropertyType::Date => {
                CustomProperty::Date(parse_datetime(value)?.and_utc().timestamp())
            }
            PropertyType::Unknown => CustomProperty::Unknown(value.to_string()),
        })
    }

    /// Type tag of the value
    pub fn kind(&self) -> PropertyType {
        match self {
            CustomProperty::String(_) => PropertyType::String,
            CustomProperty::Boolean(_) => PropertyType::Boolean,
            CustomProperty::Integer(_) => PropertyType::Integer,
            CustomProperty::Float(_) => PropertyType::Float,
            CustomProperty::Date(_) => PropertyType::Date,
            CustomProperty::Unknown(_) => PropertyType::Unknown,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

/// Decodes `_xHHHH_` escapes of property names
pub fn decode_name(name: &str) -> String {
    escaped_char()
        .replace_all(name, |caps: &Captures<'_>| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn timestamp(value: &str) -> Result<i64, Error> {
    Ok(parse_datetime(value)?.and_utc().timestamp())
}

/// Reads the properties of the root `Workbook` element
pub(crate) fn read_properties(workbook: &Element) -> Result<DocumentProperties, Error> {
    let mut props = DocumentProperties::default();
    if let Some(doc) = workbook.child("DocumentProperties") {
        for p in doc.elements() {
            let value = p.text();
            match p.name.as_str() {
                "Title" => props.title = Some(value),
                "Subject" => props.subject = Some(value),
                "Author" => props.creator = Some(value),
                "Created" => props.created = Some(timestamp(&value)?),
                "LastAuthor" => props.last_modified_by = Some(value),
                "LastSaved" => props.modified = Some(timestamp(&value)?),
                "Company" => props.company = Some(value),
                "Category" => props.category = Some(value),
                "Manager" => props.manager = Some(value),
                "Keywords" => props.keywords = Some(value),
                "Description" => props.description = Some(value),
                _ => (),
            }
        }
    }
    if let Some(custom) = workbook.child("CustomDocumentProperties") {
        for p in custom.elements() {
            let kind = PropertyType::from_name(p.attr("dt").unwrap_or_default());
            if kind == PropertyType::Unknown {
                debug!("custom property '{}' has an unknown type", p.name);
            }
            let value = CustomProperty::parse(kind, &p.text())?;
            props.custom.insert(decode_name(&p.name), value);
        }
    }
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    #[test]
    fn test_decode_name() {
        assert_eq!(decode_name("Project_x0020_Code"), "Project Code");
        assert_eq!(decode_name("a_x00e9__x0041_"), "aéA");
        assert_eq!(decode_name("plain_name"), "plain_name");
        // surrogates are not characters
        assert_eq!(decode_name("_xD800_"), "_xD800_");
    }

    #[test]
    fn test_custom_values() {
        use CustomProperty as P;
        assert_eq!(
            P::parse(PropertyType::String, "  x ").unwrap(),
            P::String("x".to_string())
        );
        assert_eq!(P::parse(PropertyType::Boolean, "1").unwrap(), P::Boolean(true));
        assert_eq!(P::parse(PropertyType::Boolean, "FALSE").unwrap(), P::Boolean(false));
        assert_eq!(P::parse(PropertyType::Boolean, "").unwrap(), P::Boolean(false));
        assert_eq!(P::parse(PropertyType::Integer, "-42").unwrap(), P::Integer(-42));
        assert_eq!(P::parse(PropertyType::Float, "2.5").unwrap(), P::Float(2.5));
        assert_eq!(
            P::parse(PropertyType::Date, "2006-09-16T00:00:00Z").unwrap(),
            P::Date(1_158_364_800)
        );
        assert_eq!(P::parse(PropertyType::Date, "x").ok(), None);
        assert!(matches!(
            P::parse(PropertyType::Integer, "12a"),
            Err(Error::ParseInt(_))
        ));
        assert_eq!(P::Float(1.0).kind(), PropertyType::Float);
    }

    #[test]
    fn test_read_properties() {
        let doc = parse(
            r#"<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet"
 xmlns:o="urn:schemas-microsoft-com:office:office"
 xmlns:dt="uuid:C2F41010-65B3-11d1-A29F-00AA00C14882">
 <DocumentProperties xmlns="urn:schemas-microsoft-com:office:office">
  <Title>Budget</Title>
  <Author>Mark Baker</Author>
  <LastAuthor>Someone</LastAuthor>
  <Created>2006-09-16T00:00:00Z</Created>
  <LastSaved>2006-09-16T00:00:01Z</LastSaved>
  <Company>Acme</Company>
  <Version>16.00</Version>
 </DocumentProperties>
 <CustomDocumentProperties xmlns="urn:schemas-microsoft-com:office:office">
  <Project_x0020_Code dt:dt="string"> PX-1 </Project_x0020_Code>
  <Approved dt:dt="boolean">1</Approved>
  <Budget dt:dt="float">1234.5</Budget>
  <Revision dt:dt="integer">7</Revision>
  <Due dt:dt="dateTime.tz">2006-09-16T00:00:00Z</Due>
  <Blob dt:dt="bin.base64">AAAA</Blob>
 </CustomDocumentProperties>
</Workbook>"#,
        )
        .unwrap();
        let props = read_properties(&doc).unwrap();
        assert_eq!(props.title.as_deref(), Some("Budget"));
        assert_eq!(props.creator.as_deref(), Some("Mark Baker"));
        assert_eq!(props.last_modified_by.as_deref(), Some("Someone"));
        assert_eq!(props.created, Some(1_158_364_800));
        assert_eq!(props.modified, Some(1_158_364_801));
        assert_eq!(props.company.as_deref(), Some("Acme"));
        assert_eq!(props.subject, None);

        let custom = &props.custom;
        assert_eq!(custom.len(), 6);
        assert_eq!(custom["Project Code"], CustomProperty::String("PX-1".into()));
        assert_eq!(custom["Approved"], CustomProperty::Boolean(true));
        assert_eq!(custom["Budget"], CustomProperty::Float(1234.5));
        assert_eq!(custom["Revision"], CustomProperty::Integer(7));
        assert_eq!(custom["Due"].kind(), PropertyType::Date);
        assert_eq!(custom["Blob"], CustomProperty::Unknown("AAAA".into()));
    }
}
