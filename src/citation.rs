//! Non-empty ordered lists of intervals.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Add;

use serde::{Serialize, Serializer};

use crate::alias::BookId;
use crate::coordinate::Coordinate;
use crate::error::Error;
use crate::interval::Interval;

/// One recognized reference: at least one interval, in the order written.
///
/// A citation is a value. Every operation returns a new citation and leaves
/// the receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Citation {
    /// Guarantees non-emptiness without a runtime check on access.
    first: Interval,
    rest: Vec<Interval>,
}

#[allow(clippy::len_without_is_empty, reason = "a citation is never empty")]
impl Citation {
    /// Whether the highest interval of one citation is adjacent to the
    /// lowest interval of the other, in either direction. Written order
    /// plays no part.
    pub fn adjoins(&self, other: &Self) -> bool {
        return self.highest().adjoins(other.lowest()) || other.highest().adjoins(self.lowest());
    }

    /// A whole book.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` for an out-of-range id.
    pub fn book(library: u16, book: u16) -> Result<Self, Error> {
        return Ok(Self::from(Interval::book_range(library, book, None)?));
    }

    /// A whole chapter.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` for an out-of-range field.
    pub fn chapter(library: u16, book: u16, chapter: u16) -> Result<Self, Error> {
        return Ok(Self::from(Interval::chapter_range(library, book, chapter, None)?));
    }

    /// [`Citation::merge`], then join neighbours that adjoin. Joining never
    /// reopens a merge: a joined span is not merged again with what follows.
    pub fn combine(&self) -> Self {
        return self.merge().fold_sorted(Interval::join);
    }

    /// Whether every interval of `other` lies inside some interval of `self`.
    pub fn contains(&self, other: &Self) -> bool {
        return other
            .iter()
            .all(|needle| return self.iter().any(|interval| return interval.contains(needle)));
    }

    /// Number of distinct (library, book) pairs touched by any endpoint.
    pub fn count_distinct_books(&self) -> usize {
        return self
            .iter()
            .flat_map(|interval| return [interval.start().book_id(), interval.end().book_id()])
            .collect::<BTreeSet<BookId>>()
            .len();
    }

    /// The first interval as written.
    pub const fn first(&self) -> &Interval {
        return &self.first;
    }

    /// Start of the first interval.
    pub const fn first_coordinate(&self) -> Coordinate {
        return self.first.start();
    }

    /// Whether the first interval is a complete book.
    pub fn is_whole_book(&self) -> bool {
        return self.first.is_whole_book();
    }

    /// Whether the first interval is a complete chapter.
    pub fn is_whole_chapter(&self) -> bool {
        return self.first.is_whole_chapter();
    }

    /// Iterate the intervals in written order.
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        return std::iter::once(&self.first).chain(self.rest.iter());
    }

    /// The last interval as written.
    pub fn last(&self) -> &Interval {
        return self.rest.last().unwrap_or(&self.first);
    }

    /// End of the last interval.
    pub fn last_coordinate(&self) -> Coordinate {
        return self.last().end();
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        return self.rest.len().saturating_add(1);
    }

    /// Sort, then fuse every overlapping pair. Adjacent intervals stay apart.
    pub fn merge(&self) -> Self {
        return self.fold_sorted(Interval::merge);
    }

    /// Build a citation from intervals in written order.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyCitation` if `intervals` is empty.
    pub fn new(intervals: Vec<Interval>) -> Result<Self, Error> {
        let mut iter = intervals.into_iter();
        let first = iter.next().ok_or(Error::EmptyCitation)?;
        return Ok(Self {
            first,
            rest: iter.collect(),
        });
    }

    /// Whether any interval of one overlaps any interval of the other.
    pub fn overlaps(&self, other: &Self) -> bool {
        return self
            .iter()
            .any(|interval| return other.iter().any(|theirs| return interval.overlaps(theirs)));
    }

    /// A sort key for ordering citations: the start of the first interval.
    ///
    /// Citations themselves have no total order.
    pub const fn start(&self) -> Coordinate {
        return self.first_coordinate();
    }

    /// The same intervals in ascending order.
    pub fn sort(&self) -> Self {
        let mut all: Vec<Interval> = self.iter().copied().collect();
        all.sort_unstable();
        let mut iter = all.into_iter();
        let Some(first) = iter.next() else {
            return self.clone();
        };
        return Self {
            first,
            rest: iter.collect(),
        };
    }

    /// A single verse or run of verses.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` for an out-of-range field, or
    /// `Error::InvertedInterval` if `end_verse < verse`.
    pub fn verse(
        library: u16,
        book: u16,
        chapter: u16,
        verse: u16,
        end_verse: Option<u16>,
    ) -> Result<Self, Error> {
        return Ok(Self::from(Interval::verse_range(
            library, book, chapter, verse, end_verse,
        )?));
    }

    /// Sort, then walk left to right replacing each neighbouring pair with
    /// `fuse(pair)` whenever it returns `Some`.
    fn fold_sorted(&self, fuse: impl Fn(&Interval, &Interval) -> Option<Interval>) -> Self {
        let Self { first, rest } = self.sort();
        let mut head = first;
        let mut tail: Vec<Interval> = Vec::with_capacity(rest.len());
        for next in rest {
            let current = tail.last_mut().unwrap_or(&mut head);
            match fuse(current, &next) {
                Some(fused) => *current = fused,
                None => tail.push(next),
            }
        }
        return Self {
            first: head,
            rest: tail,
        };
    }

    /// The greatest interval by coordinate order.
    fn highest(&self) -> &Interval {
        return self.rest.iter().fold(&self.first, std::cmp::max);
    }

    /// The least interval by coordinate order.
    fn lowest(&self) -> &Interval {
        return self.rest.iter().fold(&self.first, std::cmp::min);
    }
}

impl Add for Citation {
    type Output = Self;

    /// Concatenate in written order. No sorting or fusing.
    fn add(self, other: Self) -> Self {
        let mut rest = self.rest;
        rest.push(other.first);
        rest.extend(other.rest);
        return Self {
            first: self.first,
            rest,
        };
    }
}

impl From<Interval> for Citation {
    fn from(interval: Interval) -> Self {
        return Self {
            first: interval,
            rest: Vec::new(),
        };
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, interval) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{interval}")?;
        }
        return Ok(());
    }
}

impl Serialize for Citation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.collect_seq(self.iter());
    }
}
