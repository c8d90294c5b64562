//! Turning raw references into citations.
//!
//! A [`Scanner`] is built once per corpus and may be shared across threads.
//! Each call to [`Scanner::scan`] owns its own [`ContextStack`], so scans
//! never see each other's context.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::alias::{AliasIndex, AliasOptions, BookId};
use crate::citation::Citation;
use crate::config::{Book, Corpus, Language};
use crate::coordinate::{Coordinate, FIRST, LAST};
use crate::error::Error;
use crate::grammar::{Body, Grammar, ListItem};
use crate::interval::Interval;
use crate::number::{parse_number, resolve_span};
use crate::tokenizer::{RawReference, Token, Tokenizer};

/// What a scan reports.
#[allow(clippy::struct_excessive_bools, reason = "three independent switches")]
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Look for bodies without a book name, resolved against context.
    pub contextual: bool,
    /// Report a book name standing alone as a whole-book citation.
    pub include_books: bool,
    /// Report references that fail to resolve, with no citation.
    pub include_unresolved: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        return Self {
            contextual: true,
            include_books: false,
            include_unresolved: false,
        };
    }
}

/// One recognized reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match<'a> {
    /// The resolved citation, or `None` when the reference could not be
    /// resolved and unresolved references were requested.
    pub citation: Option<Citation>,
    /// Byte offset just past the match.
    pub end: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// The matched text, exactly as written.
    pub text: &'a str,
}

/// Pushdown record of the most recent interval at each bracket depth.
///
/// An opening bracket copies the current interval into a new level; a
/// closing bracket drops back to the enclosing one. Unbalanced closers on
/// an empty stack are ignored.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    /// Innermost level last.
    levels: Vec<Interval>,
}

impl ContextStack {
    /// Leave a bracketed level.
    pub fn close(&mut self) {
        self.levels.pop();
    }

    /// The interval bodies without a book name resolve against.
    pub fn current(&self) -> Option<&Interval> {
        return self.levels.last();
    }

    /// Number of levels, zero before any context is known.
    pub fn depth(&self) -> usize {
        return self.levels.len();
    }

    /// Enter a bracketed level, starting from the current interval.
    pub fn open(&mut self) {
        if let Some(&top) = self.levels.last() {
            self.levels.push(top);
        }
    }

    /// Record `interval` as the current one at this level.
    pub fn set(&mut self, interval: Interval) {
        if let Some(top) = self.levels.last_mut() {
            *top = interval;
            return;
        }
        self.levels.push(interval);
    }
}

/// Finds and resolves citations in text for one corpus.
#[derive(Debug)]
pub struct Scanner {
    /// Every accepted spelling, number-prefix forms included.
    aliases: AliasIndex,
    /// Spellings that never stand alone as a book-only match.
    ambiguous: HashSet<String>,
    /// Book metadata, chapter counts included.
    books: HashMap<BookId, Book>,
    /// Single `(` or `)`.
    brackets: Regex,
    /// Book-name and body patterns, built from the unexpanded aliases.
    grammar: Grammar,
    /// Number-prefix spellings used to normalize matched names.
    language: Language,
}

impl Scanner {
    /// The alias table, number-prefix spellings included.
    pub const fn aliases(&self) -> &AliasIndex {
        return &self.aliases;
    }

    /// Metadata for a book.
    pub fn book(&self, library: u16, book: u16) -> Option<&Book> {
        return self.books.get(&BookId::new(library, book).ok()?);
    }

    /// Every match in `text`, in order.
    pub fn find_all<'a>(&self, text: &'a str, options: ScanOptions) -> Vec<Match<'a>> {
        return self.scan(text, options).collect();
    }

    /// The first match in `text`.
    pub fn first<'a>(&self, text: &'a str, options: ScanOptions) -> Option<Match<'a>> {
        return self.scan(text, options).next();
    }

    /// Build a scanner for a corpus.
    ///
    /// # Errors
    ///
    /// Returns alias errors from [`AliasIndex::build`] and
    /// [`AliasIndex::with_number_prefixes`], `Error::InvalidConfig` for an
    /// invalid corpus, or `Error::Pattern` if the book-name pattern cannot
    /// be compiled.
    pub fn new(corpus: &Corpus, options: &AliasOptions) -> Result<Self, Error> {
        corpus.validate()?;
        let direct = AliasIndex::build(&corpus.libraries, options)?;
        let aliases = direct.with_number_prefixes(&corpus.language)?;
        let grammar = Grammar::new(&direct, &corpus.language)?;
        let mut books = HashMap::new();
        for library in &corpus.libraries {
            for book in &library.books {
                books.insert(BookId::new(library.id, book.id)?, book.clone());
            }
        }
        info!(
            aliases = aliases.len(),
            books = books.len(),
            libraries = corpus.libraries.len(),
            "scanner built"
        );
        return Ok(Self {
            aliases,
            ambiguous: corpus.language.ambiguous_aliases.iter().cloned().collect(),
            books,
            brackets: Regex::new(r"[()]")?,
            grammar,
            language: corpus.language.clone(),
        });
    }

    /// Lazily scan `text`. Nothing is read until the iterator is advanced.
    pub fn scan<'s, 'a>(&'s self, text: &'a str, options: ScanOptions) -> Scan<'s, 'a> {
        return Scan {
            context: ContextStack::default(),
            options,
            scanner: self,
            tokens: Tokenizer::new(&self.grammar, &self.brackets, text, options.contextual),
        };
    }
}

/// A lazy scan over one text. See [`Scanner::scan`].
pub struct Scan<'s, 'a> {
    /// Context for bodies without a book name.
    context: ContextStack,
    /// What to report.
    options: ScanOptions,
    /// The scanner this scan belongs to.
    scanner: &'s Scanner,
    /// Raw tokens of the text.
    tokens: Tokenizer<'s, 'a>,
}

impl<'a> Scan<'_, 'a> {
    /// Record a resolved citation as context and report it, or report the
    /// failure when asked to.
    fn conclude(&mut self, raw: &RawReference<'a>, citation: Option<Citation>) -> Option<Match<'a>> {
        let Some(citation) = citation else {
            debug!(text = raw.text, start = raw.start, "reference did not resolve");
            return self.options.include_unresolved.then(|| return to_match(raw, None));
        };
        self.context.set(*citation.last());
        return Some(to_match(raw, Some(citation)));
    }

    /// Resolve one raw reference, updating context.
    fn resolve(&mut self, raw: &RawReference<'a>) -> Option<Match<'a>> {
        let scanner = self.scanner;
        let Some(name) = raw.book else {
            let citation = raw
                .body
                .as_ref()
                .zip(self.context.current())
                .and_then(|(body, scope)| return resolve_in_context(body, scope));
            return self.conclude(raw, citation);
        };

        let Some((spelling, id)) = scanner.aliases.resolve_spelling(name, &scanner.language) else {
            return self.conclude(raw, None);
        };
        let Some(book) = scanner.books.get(&id) else {
            return self.conclude(raw, None);
        };
        let Some(body) = &raw.body else {
            let whole = Interval::whole_book(id);
            self.context.set(whole);
            if self.options.include_books && !scanner.ambiguous.contains(&spelling) {
                return Some(to_match(raw, Some(Citation::from(whole))));
            }
            return None;
        };
        let citation = resolve_after_book(body, id, book);
        return self.conclude(raw, citation);
    }
}

impl<'a> Iterator for Scan<'_, 'a> {
    type Item = Match<'a>;

    fn next(&mut self) -> Option<Match<'a>> {
        loop {
            match self.tokens.next()? {
                Token::Open => self.context.open(),
                Token::Close => self.context.close(),
                Token::Reference(raw) => {
                    if let Some(found) = self.resolve(&raw) {
                        return Some(found);
                    }
                }
            }
        }
    }
}

// ── Body resolution ──────────────────────────────────────────────────

/// `c:v–c:v` within one book. The end is taken as written.
fn chapter_range(id: BookId, start: (&str, &str), end: (&str, &str)) -> Option<Interval> {
    let at = |(chapter, verse): (&str, &str)| -> Option<Coordinate> {
        return Coordinate::new(id.library(), id.book(), parse_number(chapter)?, parse_number(verse)?).ok();
    };
    return Interval::new(at(start)?, at(end)?).ok();
}

/// Each item as a run of whole chapters.
fn chapter_spans(id: BookId, items: &[ListItem<'_>]) -> Option<Citation> {
    let intervals = items
        .iter()
        .map(|item| {
            let (first, last) = resolve_span(item.start, item.end)?;
            return Interval::new(
                Coordinate::new(id.library(), id.book(), first, FIRST).ok()?,
                Coordinate::new(id.library(), id.book(), last, LAST).ok()?,
            )
            .ok();
        })
        .collect::<Option<Vec<_>>>()?;
    return Citation::new(intervals).ok();
}

/// A body directly after a book name.
fn resolve_after_book(body: &Body<'_>, id: BookId, book: &Book) -> Option<Citation> {
    return match body {
        Body::ChapterRange {
            end_chapter,
            end_verse,
            start_chapter,
            start_verse,
        } => chapter_range(id, (*start_chapter, *start_verse), (*end_chapter, *end_verse)).map(Citation::from),
        Body::ChapterList { chapter, items } => verse_list(id, parse_number(chapter)?, items),
        Body::List(items) if book.chapters == 1 => verse_list(id, FIRST, items),
        Body::List(items) => chapter_spans(id, items),
        Body::Marked(_) => None,
    };
}

/// A body with no book name, read against the current context.
///
/// Every form needs a context within one book. A verse-marker list reads as
/// verses of the chapter the context starts in, so after a whole book it
/// means chapter 1.
fn resolve_in_context(body: &Body<'_>, scope: &Interval) -> Option<Citation> {
    if !scope.is_same_book() {
        return None;
    }
    let id = scope.start().book_id();
    return match body {
        Body::ChapterRange {
            end_chapter,
            end_verse,
            start_chapter,
            start_verse,
        } => chapter_range(id, (*start_chapter, *start_verse), (*end_chapter, *end_verse)).map(Citation::from),
        Body::ChapterList { chapter, items } => verse_list(id, parse_number(chapter)?, items),
        Body::Marked(items) => verse_list(id, scope.start().chapter(), items),
        Body::List(_) => None,
    };
}

/// Each item as verses of one chapter.
fn verse_list(id: BookId, chapter: u16, items: &[ListItem<'_>]) -> Option<Citation> {
    let intervals = items
        .iter()
        .map(|item| {
            let (first, last) = resolve_span(item.start, item.end)?;
            return Interval::verse_range(id.library(), id.book(), chapter, first, Some(last)).ok();
        })
        .collect::<Option<Vec<_>>>()?;
    return Citation::new(intervals).ok();
}

/// Wrap a raw reference's position and text around a result.
fn to_match<'a>(raw: &RawReference<'a>, citation: Option<Citation>) -> Match<'a> {
    return Match {
        citation,
        end: raw.end,
        start: raw.start,
        text: raw.text,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    const CORPUS: &str = r#"
[language]
verse_markers = ["v.", "vv."]
ambiguous_aliases = ["Am"]

[[libraries]]
id = 1
name = "Library"
abbrev = "Lib"
books = [
    { id = 1, name = "Big Book", abbrev = "Big", chapters = 20 },
    { id = 2, name = "Amos", abbrev = "Am", chapters = 9 },
    { id = 3, name = "Short", abbrev = "Sh", chapters = 1 },
]
"#;

    fn scanner() -> Scanner {
        let corpus = Corpus::from_toml_str(CORPUS).unwrap();
        return Scanner::new(&corpus, &AliasOptions::default()).unwrap();
    }

    fn verses(book: u16, chapter: u16, verse: u16, end: u16) -> Interval {
        return Interval::verse_range(1, book, chapter, verse, Some(end)).unwrap();
    }

    fn intervals(found: &Match<'_>) -> Vec<Interval> {
        return found.citation.as_ref().unwrap().iter().copied().collect();
    }

    #[test]
    fn context_stack_duplicates_on_open_and_restores_on_close() {
        let mut stack = ContextStack::default();
        stack.open();
        stack.close();
        assert_eq!(stack.depth(), 0);

        let outer = verses(1, 1, 1, 1);
        let inner = verses(1, 2, 1, 1);
        stack.set(outer);
        stack.open();
        assert_eq!(stack.current(), Some(&outer));
        stack.set(inner);
        assert_eq!(stack.current(), Some(&inner));
        stack.close();
        assert_eq!(stack.current(), Some(&outer));
        stack.close();
        stack.close();
        assert_eq!(stack.current(), None);
    }

    #[test]
    fn book_then_marked_verses_follow_context() {
        let scanner = scanner();
        let found = scanner.find_all("Big Book 5 is useful, esp. vv.3-4 and v.8.", ScanOptions::default());
        assert_eq!(found.len(), 3);
        let whole = found.first().unwrap();
        assert!(whole.citation.as_ref().unwrap().is_whole_chapter());
        assert_eq!(intervals(found.get(1).unwrap()), vec![verses(1, 5, 3, 4)]);
        assert_eq!(intervals(found.get(2).unwrap()), vec![verses(1, 5, 8, 8)]);
        assert_eq!(found.get(1).unwrap().text, "vv.3-4");
    }

    #[test]
    fn bare_list_in_single_chapter_book_is_verses() {
        let scanner = scanner();
        let found = scanner.first("Short 3-6", ScanOptions::default()).unwrap();
        assert_eq!(intervals(&found), vec![verses(3, 1, 3, 6)]);
    }

    #[test]
    fn bare_list_in_longer_book_is_chapters() {
        let scanner = scanner();
        let found = scanner.first("Big 3-4", ScanOptions::default()).unwrap();
        let only = *found.citation.unwrap().first();
        assert!(only.is_whole_chapter_range());
        assert_eq!(only, Interval::chapter_range(1, 1, 3, Some(4)).unwrap());
    }

    #[test]
    fn books_alone_are_reported_only_when_asked() {
        let scanner = scanner();
        assert!(scanner.first("Big Book is long", ScanOptions::default()).is_none());
        let options = ScanOptions {
            include_books: true,
            ..ScanOptions::default()
        };
        let found = scanner.first("Big Book is long", options).unwrap();
        assert!(found.citation.unwrap().is_whole_book());
    }

    #[test]
    fn ambiguous_aliases_never_stand_alone() {
        let scanner = scanner();
        let options = ScanOptions {
            include_books: true,
            ..ScanOptions::default()
        };
        assert!(scanner.first("I Am here", options).is_none());
        let found = scanner.find_all("Am 3:1 and Amos", options);
        assert_eq!(found.len(), 2);
        assert_eq!(intervals(found.first().unwrap()), vec![verses(2, 3, 1, 1)]);
    }

    #[test]
    fn marked_verses_after_a_book_mention_read_from_its_first_chapter() {
        let scanner = scanner();
        let found = scanner.find_all("Short v.15, then Big Book, vv.2-3", ScanOptions::default());
        assert_eq!(found.len(), 2);
        assert_eq!(intervals(found.first().unwrap()), vec![verses(3, 1, 15, 15)]);
        assert_eq!(intervals(found.get(1).unwrap()), vec![verses(1, 1, 2, 3)]);
    }

    #[test]
    fn marked_verses_after_a_chapter_range_use_its_start() {
        let found = scanner().find_all("Big 3-4, v.7", ScanOptions::default());
        assert_eq!(intervals(found.get(1).unwrap()), vec![verses(1, 3, 7, 7)]);
    }

    #[test]
    fn unresolved_references_surface_without_citation() {
        let scanner = scanner();
        let options = ScanOptions {
            include_unresolved: true,
            ..ScanOptions::default()
        };
        let found = scanner.find_all("v.5 and 6:7", options);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| return m.citation.is_none()));
        assert!(scanner.find_all("v.5 and 6:7", ScanOptions::default()).is_empty());
    }

    #[test]
    fn no_context_ignores_bare_bodies() {
        let scanner = scanner();
        let options = ScanOptions {
            contextual: false,
            include_unresolved: true,
            ..ScanOptions::default()
        };
        let found = scanner.find_all("Big 1:1, v.5", options);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn matches_report_byte_offsets() {
        let scanner = scanner();
        let text = "See Big 2:1–3.";
        let found = scanner.first(text, ScanOptions::default()).unwrap();
        assert_eq!(text.get(found.start..found.end), Some("Big 2:1–3"));
        assert_eq!(found.text, "Big 2:1–3");
    }

    #[test]
    fn book_metadata_lookup() {
        let scanner = scanner();
        assert_eq!(scanner.book(1, 3).unwrap().name, "Short");
        assert!(scanner.book(1, 9).is_none());
        assert!(scanner.book(0, 1).is_none());
    }

    #[test]
    fn scanner_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Scanner>();
    }
}
