//! Closed coordinate intervals and the algebra over them.

use std::fmt;

use serde::Serialize;

use crate::alias::BookId;
use crate::coordinate::{Coordinate, FIRST, LAST};
use crate::error::Error;

/// The shape of an interval. Every interval has exactly one kind.
///
/// Classification checks the broadest shapes first: a span that is a whole
/// chapter is never also reported as a verse range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntervalKind {
    /// Spans books and does not cover each of them completely.
    InterBookRange,
    /// Within one book, spans chapters without starting at verse 1 and
    /// ending at verse 999.
    InterChapterRange,
    /// One verse.
    SingleVerse,
    /// Several verses within one chapter.
    VerseRange,
    /// One complete book: chapters 1..=999, verses 1..=999.
    WholeBook,
    /// Several complete books within one library.
    WholeBookRange,
    /// One complete chapter: verses 1..=999.
    WholeChapter,
    /// Several complete chapters within one book.
    WholeChapterRange,
}

impl IntervalKind {
    /// The unit two intervals of this kind must share to be adjacent.
    const fn unit(self) -> Option<Unit> {
        return match self {
            Self::SingleVerse | Self::VerseRange => Some(Unit::Verse),
            Self::WholeChapter | Self::WholeChapterRange => Some(Unit::Chapter),
            Self::WholeBook | Self::WholeBookRange => Some(Unit::Book),
            Self::InterBookRange | Self::InterChapterRange => None,
        };
    }
}

/// Granularity used for adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Book,
    Chapter,
    Verse,
}

/// A closed interval `[start, end]` of coordinates with `start <= end`.
///
/// Intervals compare by start, then by end.
#[allow(
    clippy::arbitrary_source_item_ordering,
    reason = "field order defines the derived (start, end) ordering"
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Interval {
    start: Coordinate,
    end: Coordinate,
}

impl Interval {
    /// Whether `self` and `other` are consecutive units of the same
    /// granularity: verse n and n+1 of one chapter, chapter n and n+1 of one
    /// book, or book n and n+1 of one library. Order does not matter.
    pub fn adjoins(&self, other: &Self) -> bool {
        let (Some(unit), Some(other_unit)) = (self.kind().unit(), other.kind().unit()) else {
            return false;
        };
        if unit != other_unit {
            return false;
        }
        return match unit {
            Unit::Verse => {
                self.within_one_chapter_with(other)
                    && (follows(self.end.verse(), other.start.verse())
                        || follows(other.end.verse(), self.start.verse()))
            }
            Unit::Chapter => {
                self.within_one_book_with(other)
                    && (follows(self.end.chapter(), other.start.chapter())
                        || follows(other.end.chapter(), self.start.chapter()))
            }
            Unit::Book => {
                self.within_one_library_with(other)
                    && (follows(self.end.book(), other.start.book())
                        || follows(other.end.book(), self.start.book()))
            }
        };
    }

    /// A complete book or run of books: chapters 1..=999 of `book` through
    /// chapters 1..=999 of `end_book` (or of `book` itself).
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` for an out-of-range id, or
    /// `Error::InvertedInterval` if `end_book < book`.
    pub fn book_range(library: u16, book: u16, end_book: Option<u16>) -> Result<Self, Error> {
        return Self::new(
            Coordinate::new(library, book, FIRST, FIRST)?,
            Coordinate::new(library, end_book.unwrap_or(book), LAST, LAST)?,
        );
    }

    /// A complete chapter or run of chapters within one book.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` for an out-of-range field, or
    /// `Error::InvertedInterval` if `end_chapter < chapter`.
    pub fn chapter_range(
        library: u16,
        book: u16,
        chapter: u16,
        end_chapter: Option<u16>,
    ) -> Result<Self, Error> {
        return Self::new(
            Coordinate::new(library, book, chapter, FIRST)?,
            Coordinate::new(library, book, end_chapter.unwrap_or(chapter), LAST)?,
        );
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        return self.start <= other.start && other.end <= self.end;
    }

    /// The last coordinate.
    pub const fn end(&self) -> Coordinate {
        return self.end;
    }

    /// Whether both endpoints share a book.
    pub fn is_same_book(&self) -> bool {
        return self.start.book_id() == self.end.book_id();
    }

    /// Whether both endpoints share a chapter of one book.
    pub fn is_same_chapter(&self) -> bool {
        return self.is_same_book() && self.start.chapter() == self.end.chapter();
    }

    pub fn is_inter_book_range(&self) -> bool {
        return self.kind() == IntervalKind::InterBookRange;
    }

    pub fn is_inter_chapter_range(&self) -> bool {
        return self.kind() == IntervalKind::InterChapterRange;
    }

    pub fn is_single_verse(&self) -> bool {
        return self.kind() == IntervalKind::SingleVerse;
    }

    pub fn is_verse_range(&self) -> bool {
        return self.kind() == IntervalKind::VerseRange;
    }

    pub fn is_whole_book(&self) -> bool {
        return self.kind() == IntervalKind::WholeBook;
    }

    pub fn is_whole_book_range(&self) -> bool {
        return self.kind() == IntervalKind::WholeBookRange;
    }

    pub fn is_whole_chapter(&self) -> bool {
        return self.kind() == IntervalKind::WholeChapter;
    }

    pub fn is_whole_chapter_range(&self) -> bool {
        return self.kind() == IntervalKind::WholeChapterRange;
    }

    /// Join two adjacent intervals into one spanning both.
    ///
    /// Returns `None` when they do not adjoin.
    pub fn join(&self, other: &Self) -> Option<Self> {
        if !self.adjoins(other) {
            return None;
        }
        return Some(self.hull(other));
    }

    /// Classify this interval. See [`IntervalKind`].
    pub fn kind(&self) -> IntervalKind {
        let (start, end) = (self.start, self.end);
        let whole_verses = start.verse() == FIRST && end.verse() == LAST;
        let whole_chapters = start.chapter() == FIRST && end.chapter() == LAST;
        if self.is_same_book() {
            if start.chapter() == end.chapter() {
                if whole_verses {
                    return IntervalKind::WholeChapter;
                }
                if start.verse() == end.verse() {
                    return IntervalKind::SingleVerse;
                }
                return IntervalKind::VerseRange;
            }
            if whole_chapters && whole_verses {
                return IntervalKind::WholeBook;
            }
            if whole_verses {
                return IntervalKind::WholeChapterRange;
            }
            return IntervalKind::InterChapterRange;
        }
        if start.library() == end.library() && whole_chapters && whole_verses {
            return IntervalKind::WholeBookRange;
        }
        return IntervalKind::InterBookRange;
    }

    /// Merge two overlapping intervals into one spanning both.
    ///
    /// Returns `None` when they do not overlap.
    pub fn merge(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        return Some(self.hull(other));
    }

    /// Build an interval, rejecting `start > end`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvertedInterval` if `start` is after `end`.
    pub fn new(start: Coordinate, end: Coordinate) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvertedInterval { end, start });
        }
        return Ok(Self { start, end });
    }

    /// Whether any coordinate lies in both intervals.
    pub fn overlaps(&self, other: &Self) -> bool {
        return self.start <= other.end && other.start <= self.end;
    }

    /// The first coordinate.
    pub const fn start(&self) -> Coordinate {
        return self.start;
    }

    /// A single verse or run of verses within one chapter.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` for an out-of-range field, or
    /// `Error::InvertedInterval` if `end_verse < verse`.
    pub fn verse_range(
        library: u16,
        book: u16,
        chapter: u16,
        verse: u16,
        end_verse: Option<u16>,
    ) -> Result<Self, Error> {
        return Self::new(
            Coordinate::new(library, book, chapter, verse)?,
            Coordinate::new(library, book, chapter, end_verse.unwrap_or(verse))?,
        );
    }

    /// The whole of an already-validated book.
    pub const fn whole_book(book: BookId) -> Self {
        return Self {
            start: Coordinate::new_unchecked(book.library(), book.book(), FIRST, FIRST),
            end: Coordinate::new_unchecked(book.library(), book.book(), LAST, LAST),
        };
    }

    /// The smallest interval covering both.
    fn hull(&self, other: &Self) -> Self {
        return Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        };
    }

    fn within_one_book_with(&self, other: &Self) -> bool {
        let book = self.start.book_id();
        return self.is_same_book() && other.is_same_book() && other.start.book_id() == book;
    }

    fn within_one_chapter_with(&self, other: &Self) -> bool {
        return self.within_one_book_with(other)
            && self.is_same_chapter()
            && other.is_same_chapter()
            && self.start.chapter() == other.start.chapter();
    }

    fn within_one_library_with(&self, other: &Self) -> bool {
        let library = self.start.library();
        return [self.end, other.start, other.end]
            .iter()
            .all(|coordinate| return coordinate.library() == library);
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            return write!(f, "{}", self.start);
        }
        return write!(f, "{}-{}", self.start, self.end);
    }
}

/// Whether `next` is exactly one more than `previous`.
fn follows(previous: u16, next: u16) -> bool {
    return previous.checked_add(1) == Some(next);
}
