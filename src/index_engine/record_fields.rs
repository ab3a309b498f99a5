use crate::index_engine::constants::*;
use crate::utils::scan_leading_int;

/// Comma-separated fields of one dataset line, split once and borrowed.
///
/// The same split serves both the identity check (field 0) and the date
/// extraction (field 5). Fields are positional: `a,,b` has three fields, the
/// middle one empty. Quoted fields are not recognized; a comma inside quotes
/// still splits.
#[derive(Debug)]
pub struct RecordFields<'a> {
    fields: Vec<&'a [u8]>,
}

impl<'a> RecordFields<'a> {
    pub fn split(line: &'a [u8]) -> Self {
        Self {
            fields: line.split(|&b| b == FIELD_DELIMITER).collect(),
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        self.fields.get(index).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The lookup key (field 0).
    #[inline]
    pub fn key(&self) -> Option<&'a [u8]> {
        self.get(KEY_FIELD_INDEX)
    }

    /// Exact, case-sensitive key comparison.
    #[inline]
    pub fn key_matches(&self, id: &[u8]) -> bool {
        self.key() == Some(id)
    }

    /// Parsed checkout date (field 5), if present and well-formed.
    pub fn checkout_date(&self) -> Option<CheckoutDate> {
        self.get(DATE_FIELD_INDEX).and_then(CheckoutDate::parse)
    }
}

/// Month/day/year triple read from a `MM/DD/YYYY hh:mm:ss` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutDate {
    pub month: i64,
    pub day: i64,
    pub year: i64,
}

impl CheckoutDate {
    /// Parses `month/day/year` off the front of `field`.
    ///
    /// Matches `sscanf("%d/%d/%d")`: whitespace before each number is
    /// allowed, each `/` must immediately follow the preceding number, and
    /// anything after the year (the time of day) is ignored.
    pub fn parse(field: &[u8]) -> Option<Self> {
        let (month, used) = scan_leading_int(field)?;
        let rest = field[used..].strip_prefix(b"/")?;
        let (day, used) = scan_leading_int(rest)?;
        let rest = rest[used..].strip_prefix(b"/")?;
        let (year, _) = scan_leading_int(rest)?;

        Some(Self { month, day, year })
    }
}
