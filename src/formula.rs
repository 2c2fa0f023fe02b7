//! Formula reference rewriting
//!
//! XML Spreadsheet formulas use R1C1 references (`R2C3`, `R[-1]C`, `RC[2]`)
//! relative to the cell holding them. They are rewritten into absolute A1
//! references, string literals being left untouched.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::Error;
use crate::utils::{column_name, MAX_COLUMNS, MAX_ROWS};

/// Prefix of OpenFormula formulas
const OPEN_FORMULA_PREFIX: &str = "of:";

static R1C1_REFERENCE: OnceLock<Regex> = OnceLock::new();

fn r1c1_reference() -> &'static Regex {
    // group 1 is the character before the token, if any, as there is no look-behind
    R1C1_REFERENCE.get_or_init(|| {
        Regex::new(r"(^|[^A-Za-z0-9_.$])R(\[[-+]?\d+\]|\d*)C(\[[-+]?\d+\]|\d*)")
            .expect("valid R1C1 regex")
    })
}

/// Translates a formula found at a 1 based (`row`, `column`) position
///
/// The formula is split on `"`: odd segments are string literals and are kept verbatim.
/// Escaped quotes (`""`) inside a literal are not special cased.
pub fn translate(formula: &str, row: u32, column: u32) -> Result<String, Error> {
    match formula.strip_prefix(OPEN_FORMULA_PREFIX) {
        Some(formula) => map_unquoted(formula, |s| {
            Ok(s.replace("[.", "").replace('.', "").replace(']', ""))
        }),
        None => map_unquoted(formula, |s| r1c1_to_a1(s, row, column)),
    }
}

fn map_unquoted<F>(formula: &str, mut rewrite: F) -> Result<String, Error>
where
    F: FnMut(&str) -> Result<String, Error>,
{
    let mut out = String::with_capacity(formula.len());
    for (i, segment) in formula.split('"').enumerate() {
        if i > 0 {
            out.push('"');
        }
        if i % 2 == 0 {
            out.push_str(&rewrite(segment)?);
        } else {
            out.push_str(segment);
        }
    }
    Ok(out)
}

struct Reference {
    start: usize,
    end: usize,
    a1: String,
}

fn r1c1_to_a1(segment: &str, row: u32, column: u32) -> Result<String, Error> {
    let mut references = Vec::new();
    for caps in r1c1_reference().captures_iter(segment) {
        let (Some(token), Some(prefix)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // a token glued to what follows is part of a name or a function call
        let glued = segment[token.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '(');
        if glued {
            continue;
        }
        let r = resolve(caps.get(2).map_or("", |m| m.as_str()), row)?;
        let c = resolve(caps.get(3).map_or("", |m| m.as_str()), column)?;
        if !(1..=MAX_ROWS as i64).contains(&r) || !(1..=MAX_COLUMNS as i64).contains(&c) {
            return Err(Error::ReferenceOutOfRange { row: r, column: c });
        }
        references.push(Reference {
            start: prefix.end(),
            end: token.end(),
            a1: format!("{}{}", column_name(c as u32 - 1), r),
        });
    }

    let mut out = segment.to_string();
    for reference in references.iter().rev() {
        out.replace_range(reference.start..reference.end, &reference.a1);
    }
    Ok(out)
}

/// Resolves one part of a reference: empty is the current position,
/// `[n]` an offset from it, `n` an absolute position
fn resolve(part: &str, current: u32) -> Result<i64, Error> {
    if part.is_empty() {
        return Ok(current as i64);
    }
    match part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
        Some(offset) => {
            let offset = parse_signed(offset)?;
            (current as i64)
                .checked_add(offset)
                .ok_or_else(|| Error::ParseInt(part.to_string()))
        }
        None => parse_signed(part),
    }
}

fn parse_signed(s: &str) -> Result<i64, Error> {
    let s = s.strip_prefix('+').unwrap_or(s);
    atoi_simd::parse::<i64>(s.as_bytes()).map_err(|_| Error::ParseInt(s.to_string()))
}
