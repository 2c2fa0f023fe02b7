//! Internal module providing handy functions

use quick_xml::events::BytesRef;

use crate::errors::Error;

macro_rules! from_err {
    ($from:ty, $to:tt, $var:tt) => {
        impl From<$from> for $to {
            fn from(e: $from) -> $to {
                $to::$var(e)
            }
        }
    };
}

/// Maximum number of rows addressable in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns addressable in a worksheet
pub const MAX_COLUMNS: u32 = 16_384;

/// Converts a 0 based column index into its alphabetic name (0 -> "A", 26 -> "AA")
pub fn column_name(index: u32) -> String {
    let mut col = Vec::with_capacity(3);
    let mut num = index as u64 + 1;
    while num > 0 {
        col.push(((num - 1) % 26) as u8 + b'A');
        num = (num - 1) / 26;
    }
    col.reverse();
    // only ascii letters were pushed
    col.into_iter().map(char::from).collect()
}

/// Converts an alphabetic column name into its 0 based index ("A" -> 0, "AA" -> 26)
///
/// Lower case letters are accepted. Returns `None` for empty or non alphabetic names.
pub fn column_index(name: &str) -> Option<u32> {
    if name.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for c in name.bytes() {
        let v = match c {
            b'A'..=b'Z' => c - b'A',
            b'a'..=b'z' => c - b'a',
            _ => return None,
        };
        col = col.checked_mul(26)?.checked_add(v as u32 + 1)?;
    }
    Some(col - 1)
}

/// Converts a 1 based (row, column) position into its A1 name
pub fn coordinate_to_name(row: u32, column: u32) -> String {
    format!("{}{}", column_name(column.saturating_sub(1)), row)
}

/// Converts an A1 name into its 1 based (row, column) position
pub fn name_to_coordinate(name: &str) -> Option<(u32, u32)> {
    let split = name.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = name.split_at(split);
    let column = column_index(letters)? + 1;
    let row = atoi_simd::parse::<u32>(digits.as_bytes()).ok()?;
    if row == 0 {
        return None;
    }
    Some((row, column))
}

/// Resolves a general entity reference (`&amp;`, `&#10;`...) into `buffer`
pub(crate) fn unescape_entity_to_buffer(
    entity: &BytesRef<'_>,
    buffer: &mut String,
) -> Result<(), Error> {
    if let Some(ch) = entity.resolve_char_ref()? {
        buffer.push(ch);
        return Ok(());
    }
    let name = entity.decode()?;
    match quick_xml::escape::resolve_predefined_entity(&name) {
        Some(s) => buffer.push_str(s),
        None => return Err(Error::UnknownEntity(name.into_owned())),
    }
    Ok(())
}
