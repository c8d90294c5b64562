use std::iter::Peekable;

use regex::{Match, Matches, Regex};

use crate::cursor::Cursor;
use crate::grammar::{Body, Grammar};

/// A reference as found in the text, before any resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference<'a> {
    /// Parsed body, absent for a book name standing alone.
    pub body: Option<Body<'a>>,
    /// Book name exactly as written, absent for a body standing alone.
    pub book: Option<&'a str>,
    /// Byte offset just past the reference.
    pub end: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// The matched text.
    pub text: &'a str,
}

/// One event in the text, in order of position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `)`
    Close,
    /// `(`
    Open,
    /// A book name, a body, or both.
    Reference(RawReference<'a>),
}

/// Splits text into brackets and raw references, left to right.
///
/// Each reference is the earliest one at or after the previous reference's
/// end. A book name wins over a bare body starting at the same place. Work
/// per byte is bounded, so a scan is linear in the length of the text.
pub struct Tokenizer<'g, 'a> {
    /// Bracket positions, in order.
    brackets: Peekable<Matches<'g, 'a>>,
    /// Whether bodies without a book name are looked for at all.
    contextual: bool,
    /// Patterns for book names and bodies.
    grammar: &'g Grammar,
    /// Next book-name match at or after `pos`, once searched.
    next_book: Option<Match<'a>>,
    /// Set once the book search has run past the end of the text.
    no_more_books: bool,
    /// The next reference, found ahead of the brackets before it.
    pending: Option<Option<RawReference<'a>>>,
    /// Where the search for the next reference resumes.
    pos: usize,
    /// The whole text being scanned.
    text: &'a str,
}

impl<'g, 'a> Tokenizer<'g, 'a> {
    /// Tokenize `text`, with `brackets` matching single `(` and `)`.
    pub fn new(grammar: &'g Grammar, brackets: &'g Regex, text: &'a str, contextual: bool) -> Self {
        return Self {
            brackets: brackets.find_iter(text).peekable(),
            contextual,
            grammar,
            next_book: None,
            no_more_books: false,
            pending: None,
            pos: 0,
            text,
        };
    }

    /// The earliest bare body in `pos..limit` that starts at a word boundary.
    fn find_bare(&self, limit: usize) -> Option<RawReference<'a>> {
        let window = self.text.get(self.pos..limit)?;
        let mut previous = Cursor::new(self.text, self.pos).previous();
        for (offset, c) in window.char_indices() {
            let at_boundary = !previous.is_some_and(char::is_alphanumeric);
            previous = Some(c);
            if !at_boundary || !self.grammar.could_start_bare_body(c) {
                continue;
            }
            let start = self.pos.saturating_add(offset);
            if let Some((body, end)) = self.grammar.bare_body(self.text, start) {
                return Some(RawReference {
                    body: Some(body),
                    book: None,
                    end,
                    start,
                    text: self.text.get(start..end).unwrap_or_default(),
                });
            }
        }
        return None;
    }

    /// The next book-name match at or after `pos`, searching again only when
    /// the cached one was consumed or overrun.
    fn next_book(&mut self) -> Option<Match<'a>> {
        let stale = self.next_book.is_some_and(|found| return found.start() < self.pos);
        if stale || (self.next_book.is_none() && !self.no_more_books) {
            self.next_book = self.grammar.find_book(self.text, self.pos);
            self.no_more_books = self.next_book.is_none();
        }
        return self.next_book;
    }

    /// The earliest reference at or after `pos`, advancing past it.
    fn next_reference(&mut self) -> Option<RawReference<'a>> {
        let book = self.next_book();
        let limit = book.map_or(self.text.len(), |found| return found.start());
        if self.contextual
            && let Some(bare) = self.find_bare(limit)
        {
            self.pos = bare.end;
            return Some(bare);
        }
        let book = book?;
        self.next_book = None;
        let (body, end) = self
            .grammar
            .book_body(self.text, book.end())
            .map_or((None, book.end()), |(body, end)| return (Some(body), end));
        self.pos = end;
        return Some(RawReference {
            body,
            book: Some(book.as_str()),
            end,
            start: book.start(),
            text: self.text.get(book.start()..end).unwrap_or_default(),
        });
    }
}

impl<'a> Iterator for Tokenizer<'_, 'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pending.is_none() {
            self.pending = Some(self.next_reference());
        }
        let reference_start = self.pending.as_ref().and_then(|pending| return pending.as_ref()).map(|r| return r.start);
        let bracket_start = self.brackets.peek().map(Match::start);
        let bracket_first = match (bracket_start, reference_start) {
            (Some(bracket), Some(reference)) => bracket < reference,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if bracket_first {
            let bracket = self.brackets.next()?;
            return Some(if bracket.as_str() == "(" { Token::Open } else { Token::Close });
        }
        return self.pending.take().flatten().map(Token::Reference);
    }
}
