use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::errors::Error;

static EXCEL_EPOCH: OnceLock<NaiveDateTime> = OnceLock::new();

/// First day after the non-existent 1900-02-29 of the 1900 date system
static EXCEL_LEAP_BUG: OnceLock<NaiveDateTime> = OnceLock::new();

const MS_MULTIPLIER: f64 = 24f64 * 60f64 * 60f64 * 1e+3f64;

fn excel_epoch() -> NaiveDateTime {
    *EXCEL_EPOCH.get_or_init(|| {
        NaiveDate::from_ymd_opt(1899, 12, 30)
            .unwrap_or_default()
            .and_time(NaiveTime::MIN)
    })
}

fn excel_leap_bug() -> NaiveDateTime {
    *EXCEL_LEAP_BUG.get_or_init(|| {
        NaiveDate::from_ymd_opt(1900, 3, 1)
            .unwrap_or_default()
            .and_time(NaiveTime::MIN)
    })
}

// https://msdn.microsoft.com/en-us/library/office/ff839168.aspx
/// An enum to represent all different errors that can appear as
/// a value in a worksheet cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CellErrorType {
    /// Division by 0 error
    Div0,
    /// Unavailable value error
    NA,
    /// Invalid name error
    Name,
    /// Null value error
    Null,
    /// Number error
    Num,
    /// Invalid cell reference error
    Ref,
    /// Value error
    Value,
    /// Getting data
    GettingData,
    /// Any other error text, kept verbatim (`#SPILL!`, `#CALC!`...)
    Other(String),
}

impl fmt::Display for CellErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            CellErrorType::Div0 => write!(f, "#DIV/0!"),
            CellErrorType::NA => write!(f, "#N/A"),
            CellErrorType::Name => write!(f, "#NAME?"),
            CellErrorType::Null => write!(f, "#NULL!"),
            CellErrorType::Num => write!(f, "#NUM!"),
            CellErrorType::Ref => write!(f, "#REF!"),
            CellErrorType::Value => write!(f, "#VALUE!"),
            CellErrorType::GettingData => write!(f, "#DATA!"),
            CellErrorType::Other(s) => f.write_str(s),
        }
    }
}

impl FromStr for CellErrorType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "#DIV/0!" => Ok(CellErrorType::Div0),
            "#N/A" => Ok(CellErrorType::NA),
            "#NAME?" => Ok(CellErrorType::Name),
            "#NULL!" => Ok(CellErrorType::Null),
            "#NUM!" => Ok(CellErrorType::Num),
            "#REF!" => Ok(CellErrorType::Ref),
            "#VALUE!" => Ok(CellErrorType::Value),
            "#DATA!" | "#GETTING_DATA" => Ok(CellErrorType::GettingData),
            _ => Err(Error::CellError(s.into())),
        }
    }
}

impl CellErrorType {
    /// Reads the text of an error cell, unknown codes becoming [`CellErrorType::Other`]
    pub fn from_text(text: &str) -> CellErrorType {
        text.parse()
            .unwrap_or_else(|_| CellErrorType::Other(text.trim().to_string()))
    }
}

/// An enum to represent all different data types that can appear as
/// a value in a worksheet cell
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum Data {
    /// Signed integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
    /// Boolean
    Bool(bool),
    /// Error
    Error(CellErrorType),
    /// Empty cell
    #[default]
    Empty,
}

/// Type tag of a cell, as stored in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellKind {
    /// Text
    String,
    /// Numbers and dates (as serial numbers)
    Numeric,
    /// Boolean
    Boolean,
    /// Error value
    Error,
    /// Formula with a cached value
    Formula,
    /// No typed value
    Null,
}

impl Data {
    /// Coerces a number to an integer when it has no fractional part
    pub fn from_number(v: f64) -> Data {
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Data::Int(v as i64)
        } else {
            Data::Float(v)
        }
    }

    /// Kind of a plain (non formula) value
    pub fn kind(&self) -> CellKind {
        match self {
            Data::Int(_) | Data::Float(_) => CellKind::Numeric,
            Data::String(_) => CellKind::String,
            Data::Bool(_) => CellKind::Boolean,
            Data::Error(_) => CellKind::Error,
            Data::Empty => CellKind::Null,
        }
    }
}

/// A trait to represent all different data types that can appear as
/// a value in a worksheet cell
pub trait DataType {
    /// Assess if datatype is empty
    fn is_empty(&self) -> bool;

    /// Assess if datatype is a int
    fn is_int(&self) -> bool;

    /// Assess if datatype is a float
    fn is_float(&self) -> bool;

    /// Assess if datatype is a bool
    fn is_bool(&self) -> bool;

    /// Assess if datatype is a string
    fn is_string(&self) -> bool;

    /// Assess if datatype is a CellErrorType
    fn is_error(&self) -> bool;

    /// Try getting int value
    fn get_int(&self) -> Option<i64>;

    /// Try getting float value
    fn get_float(&self) -> Option<f64>;

    /// Try getting bool value
    fn get_bool(&self) -> Option<bool>;

    /// Try getting string value
    fn get_string(&self) -> Option<&str>;

    /// Try getting Error value
    fn get_error(&self) -> Option<&CellErrorType>;

    /// Try converting data type into a string
    fn as_string(&self) -> Option<String>;

    /// Try converting data type into a float
    fn as_f64(&self) -> Option<f64>;

    /// Try converting a serial date number into a datetime
    fn as_datetime(&self) -> Option<NaiveDateTime> {
        self.as_f64().and_then(serial_to_datetime)
    }
}

impl DataType for Data {
    fn is_empty(&self) -> bool {
        *self == Data::Empty
    }
    fn is_int(&self) -> bool {
        matches!(*self, Data::Int(_))
    }
    fn is_float(&self) -> bool {
        matches!(*self, Data::Float(_))
    }
    fn is_bool(&self) -> bool {
        matches!(*self, Data::Bool(_))
    }
    fn is_string(&self) -> bool {
        matches!(*self, Data::String(_))
    }
    fn is_error(&self) -> bool {
        matches!(*self, Data::Error(_))
    }

    fn get_int(&self) -> Option<i64> {
        if let Data::Int(v) = self {
            Some(*v)
        } else {
            None
        }
    }
    fn get_float(&self) -> Option<f64> {
        if let Data::Float(v) = self {
            Some(*v)
        } else {
            None
        }
    }
    fn get_bool(&self) -> Option<bool> {
        if let Data::Bool(v) = self {
            Some(*v)
        } else {
            None
        }
    }
    fn get_string(&self) -> Option<&str> {
        if let Data::String(v) = self {
            Some(&**v)
        } else {
            None
        }
    }
    fn get_error(&self) -> Option<&CellErrorType> {
        match self {
            Data::Error(e) => Some(e),
            _ => None,
        }
    }

    fn as_string(&self) -> Option<String> {
        match self {
            Data::Float(v) => Some(v.to_string()),
            Data::Int(v) => Some(v.to_string()),
            Data::String(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Data::Int(v) => Some(*v as f64),
            Data::Float(v) => Some(*v),
            Data::Bool(v) => Some((*v as i32).into()),
            Data::String(v) => v.parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl PartialEq<&str> for Data {
    fn eq(&self, other: &&str) -> bool {
        matches!(*self, Data::String(ref s) if s == other)
    }
}

impl PartialEq<str> for Data {
    fn eq(&self, other: &str) -> bool {
        matches!(*self, Data::String(ref s) if s == other)
    }
}

impl PartialEq<f64> for Data {
    fn eq(&self, other: &f64) -> bool {
        matches!(*self, Data::Float(ref s) if *s == *other)
    }
}

impl PartialEq<bool> for Data {
    fn eq(&self, other: &bool) -> bool {
        matches!(*self, Data::Bool(ref s) if *s == *other)
    }
}

impl PartialEq<i64> for Data {
    fn eq(&self, other: &i64) -> bool {
        matches!(*self, Data::Int(ref s) if *s == *other)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        match *self {
            Data::Int(ref e) => write!(f, "{}", e),
            Data::Float(ref e) => write!(f, "{}", e),
            Data::String(ref e) => write!(f, "{}", e),
            Data::Bool(ref e) => write!(f, "{}", e),
            Data::Error(ref e) => write!(f, "{}", e),
            Data::Empty => Ok(()),
        }
    }
}

macro_rules! define_from {
    ($variant:path, $ty:ty) => {
        impl From<$ty> for Data {
            fn from(v: $ty) -> Self {
                $variant(v)
            }
        }
    };
}

define_from!(Data::Int, i64);
define_from!(Data::Float, f64);
define_from!(Data::String, String);
define_from!(Data::Bool, bool);
define_from!(Data::Error, CellErrorType);

impl<'a> From<&'a str> for Data {
    fn from(v: &'a str) -> Self {
        Data::String(String::from(v))
    }
}

/// Parses the ISO 8601 date times written by spreadsheet applications
///
/// Values carrying an offset are converted to UTC, naive values are kept as is.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, Error> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    let s = s.trim_end_matches('Z');
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| Error::InvalidDateTime(s.to_string()))
}

/// Converts a datetime into a serial date number of the 1900 date system
///
/// Dates before 1900-03-01 are shifted by one day, the 1900 date system
/// counting a 1900-02-29 which never existed.
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let ms = (dt - excel_epoch()).num_milliseconds() as f64;
    let serial = ms / MS_MULTIPLIER;
    if dt < excel_leap_bug() {
        serial - 1.0
    } else {
        serial
    }
}

/// Converts a serial date number of the 1900 date system into a datetime
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let f = if serial >= 60.0 { serial } else { serial + 1.0 };
    let ms = f * MS_MULTIPLIER;
    let duration = chrono::Duration::try_milliseconds(ms.round() as i64)?;
    excel_epoch().checked_add_signed(duration)
}
