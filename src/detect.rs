//! Format sniffing on the first bytes of a document

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;

use crate::errors::Error;

/// Number of bytes inspected when sniffing a document
pub const SNIFF_LEN: usize = 2048;

/// Every entry must be present in the prefix, in any order
const SIGNATURE: [&[u8]; 2] = [
    b"<?xml version=\"1.0\"",
    b"<?mso-application progid=\"Excel.Sheet\"?>",
];

static ENCODING_DECL: OnceLock<Regex> = OnceLock::new();

fn encoding_decl() -> &'static Regex {
    ENCODING_DECL.get_or_init(|| {
        Regex::new(r#"<\?xml[^>]*?encoding="([^"]*)"[^>]*?\?>"#).expect("valid encoding regex")
    })
}

/// Character set used to decode every textual content of a document
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Charset {
    /// Looks a charset up by its label (`"ISO-8859-1"`, `"utf-8"`...)
    pub fn for_label(label: &str) -> Option<Charset> {
        Encoding::for_label(label.trim().as_bytes()).map(Charset)
    }

    /// Canonical name of the charset
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decodes raw document bytes into UTF-8
    ///
    /// A byte order mark, if any, takes precedence over the declared charset.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, Error> {
        let (text, used, had_errors) = self.0.decode(bytes);
        if had_errors {
            return Err(Error::Decoding(used.name()));
        }
        Ok(text)
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset(UTF_8)
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.name())
    }
}

/// Outcome of sniffing a document prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// All signature entries were found
    pub is_valid: bool,
    /// Upper cased label of the `encoding` declaration, if any
    pub encoding_label: Option<String>,
}

impl Detection {
    /// Resolves the declared charset, defaulting to UTF-8
    pub fn charset(&self) -> Result<Charset, Error> {
        match &self.encoding_label {
            None => Ok(Charset::default()),
            Some(label) => {
                Charset::for_label(label).ok_or_else(|| Error::UnsupportedCharset(label.clone()))
            }
        }
    }
}

/// Inspects the first [`SNIFF_LEN`] bytes of a document
pub fn sniff(prefix: &[u8]) -> Detection {
    let prefix = &prefix[..prefix.len().min(SNIFF_LEN)];
    // both quoting styles are valid in the prolog
    let data: Vec<u8> = prefix
        .iter()
        .map(|&b| if b == b'\'' { b'"' } else { b })
        .collect();

    let is_valid = SIGNATURE
        .iter()
        .all(|sig| data.windows(sig.len()).any(|w| w == *sig));

    let encoding_label = encoding_decl()
        .captures(&data)
        .and_then(|c| c.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).to_uppercase());

    Detection {
        is_valid,
        encoding_label,
    }
}

/// Can this prefix start an XML Spreadsheet document?
pub fn can_read(prefix: &[u8]) -> bool {
    sniff(prefix).is_valid
}
