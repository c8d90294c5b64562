//! Four-level numeric addresses and their packed ordinal form.

use std::fmt;

use serde::Serialize;

use crate::alias::BookId;
use crate::error::Error;

/// Smallest value of any field. Also marks the start of an enclosing unit.
pub const FIRST: u16 = 1;

/// Largest value of any field. Also marks the end of an enclosing unit.
pub const LAST: u16 = 999;

/// Each field packs as one base-1000 digit of the ordinal.
const RADIX: u64 = 1000;

/// A (library, book, chapter, verse) address. Every field lies in 1..=999.
///
/// Ordering is lexicographic over the fields in declaration order, which is
/// also the numeric order of [`Coordinate::to_ordinal`].
#[allow(
    clippy::arbitrary_source_item_ordering,
    reason = "field order defines the derived lexicographic ordering"
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Coordinate {
    library: u16,
    book: u16,
    chapter: u16,
    verse: u16,
}

impl Coordinate {
    /// The book component.
    pub const fn book(&self) -> u16 {
        return self.book;
    }

    /// The (library, book) pair this coordinate sits in.
    pub const fn book_id(&self) -> BookId {
        return BookId::new_unchecked(self.library, self.book);
    }

    /// The chapter component.
    pub const fn chapter(&self) -> u16 {
        return self.chapter;
    }

    /// Unpack an ordinal produced by [`Coordinate::to_ordinal`].
    ///
    /// # Errors
    ///
    /// Returns `Error::OrdinalOutOfRange` if the ordinal has digits above the
    /// library position, or `Error::OutOfRange` if any digit is zero.
    pub fn from_ordinal(ordinal: u64) -> Result<Self, Error> {
        let (rest, verse) = split_digit(ordinal);
        let (rest, chapter) = split_digit(rest);
        let (rest, book) = split_digit(rest);
        let (rest, library) = split_digit(rest);
        if rest != 0 {
            return Err(Error::OrdinalOutOfRange { ordinal });
        }
        return Self::new(
            narrow(library, ordinal)?,
            narrow(book, ordinal)?,
            narrow(chapter, ordinal)?,
            narrow(verse, ordinal)?,
        );
    }

    /// The library component.
    pub const fn library(&self) -> u16 {
        return self.library;
    }

    /// Build a coordinate, rejecting any field outside 1..=999.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` naming the first offending field.
    pub fn new(library: u16, book: u16, chapter: u16, verse: u16) -> Result<Self, Error> {
        check_field("library", library)?;
        check_field("book", book)?;
        check_field("chapter", chapter)?;
        check_field("verse", verse)?;
        return Ok(Self { library, book, chapter, verse });
    }

    /// Build a coordinate from fields already known to be in range.
    pub(crate) const fn new_unchecked(library: u16, book: u16, chapter: u16, verse: u16) -> Self {
        return Self { library, book, chapter, verse };
    }

    /// Pack into one integer, one base-1000 digit per field.
    ///
    /// `Coordinate(1, 2, 3, 4)` packs to `1_002_003_004`. Ordinals sort in
    /// the same order as coordinates, so they work as storage keys.
    pub fn to_ordinal(&self) -> u64 {
        return [self.book, self.chapter, self.verse]
            .into_iter()
            .fold(u64::from(self.library), |acc, field| {
                return acc.saturating_mul(RADIX).saturating_add(u64::from(field));
            });
    }

    /// The verse component.
    pub const fn verse(&self) -> u16 {
        return self.verse;
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}.{}.{}:{}", self.library, self.book, self.chapter, self.verse);
    }
}

/// Reject a field outside 1..=999.
///
/// # Errors
///
/// Returns `Error::OutOfRange` for zero or anything above 999.
pub(crate) fn check_field(field: &'static str, value: u16) -> Result<(), Error> {
    if (FIRST..=LAST).contains(&value) {
        return Ok(());
    }
    return Err(Error::OutOfRange { field, value });
}

/// Convert one unpacked digit to a field value.
///
/// # Errors
///
/// Returns `Error::OrdinalOutOfRange` if the digit does not fit a `u16`.
fn narrow(digit: u64, ordinal: u64) -> Result<u16, Error> {
    return u16::try_from(digit).map_err(|_err| return Error::OrdinalOutOfRange { ordinal });
}

/// Split off the lowest base-1000 digit.
const fn split_digit(value: u64) -> (u64, u64) {
    return (value / RADIX, value % RADIX);
}
