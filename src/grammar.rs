//! Recognition patterns: the book-name regex and the reference-body grammar.
//!
//! A reference is a book name followed by an optional body, or a body on its
//! own. Bodies are parsed by hand over a [`Cursor`] so that every decision
//! looks at a bounded amount of text:
//!
//! ```text
//! number        = digits [a-d]            (not followed by a letter or digit)
//! item          = number [dash number]
//! list          = item ("," ws* item)*    (a later lone number must not start
//!                                          a chapter:verse or a numbered book)
//! chapter-range = number colon number dash number colon number
//! chapter-list  = number colon list
//! book body     = ws* (chapter-range | chapter-list | list)
//! bare body     = marker ws* list | chapter-range | chapter-list
//! colon         = ":" | "."
//! dash          = "-" | "–"
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use regex::{Match, Regex};

use crate::alias::{AliasIndex, prefixes_by_number, split_number_prefix};
use crate::config::Language;
use crate::cursor::Cursor;
use crate::error::Error;

/// One entry of a number list, as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem<'a> {
    /// Range end, if the item is a range.
    pub end: Option<&'a str>,
    pub start: &'a str,
}

/// The shape of a reference body, with its numbers as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body<'a> {
    /// `chapter:list`, e.g. `1:1–4, 6`.
    ChapterList {
        chapter: &'a str,
        items: Vec<ListItem<'a>>,
    },
    /// `chapter:verse–chapter:verse`, e.g. `1:1-2:4`.
    ChapterRange {
        end_chapter: &'a str,
        end_verse: &'a str,
        start_chapter: &'a str,
        start_verse: &'a str,
    },
    /// A bare list after a book name: chapters, or verses of a
    /// single-chapter book.
    List(Vec<ListItem<'a>>),
    /// A list after a verse marker: verses of the current chapter.
    Marked(Vec<ListItem<'a>>),
}

/// Compiled recognition patterns for one alias set and language.
#[derive(Debug)]
pub struct Grammar {
    /// Any book name, anchored at word boundaries, with an optional
    /// trailing period.
    book: Option<Regex>,
    /// Digit-led book names anchored at the start of the haystack. Keeps a
    /// number list from swallowing the `3` of `3 John`.
    numbered_book: Option<Regex>,
    /// Verse markers, longest first.
    verse_markers: Vec<String>,
}

impl Grammar {
    /// Parse a body directly after a book name ending at `at`.
    pub fn book_body<'a>(&self, text: &'a str, at: usize) -> Option<(Body<'a>, usize)> {
        let mut cursor = Cursor::new(text, at);
        cursor.skip_whitespace();
        let start = cursor.pos();
        if let Some(body) = chapter_range(&mut cursor) {
            return Some((body, cursor.pos()));
        }
        cursor.reset(start);
        if let Some(body) = self.chapter_list(&mut cursor) {
            return Some((body, cursor.pos()));
        }
        cursor.reset(start);
        let items = self.list(&mut cursor)?;
        return Some((Body::List(items), cursor.pos()));
    }

    /// Parse a body with no book name, starting exactly at `at`.
    ///
    /// The caller checks that `at` is a word boundary.
    pub fn bare_body<'a>(&self, text: &'a str, at: usize) -> Option<(Body<'a>, usize)> {
        let mut cursor = Cursor::new(text, at);
        if let Some(marker) = self.verse_markers.iter().find(|marker| return cursor.rest().starts_with(marker.as_str())) {
            cursor.eat_str(marker);
            cursor.skip_whitespace();
            let items = self.list(&mut cursor)?;
            return Some((Body::Marked(items), cursor.pos()));
        }
        if let Some(body) = chapter_range(&mut cursor) {
            return Some((body, cursor.pos()));
        }
        cursor.reset(at);
        let body = self.chapter_list(&mut cursor)?;
        return Some((body, cursor.pos()));
    }

    /// Whether a bare body could start with `c`.
    pub fn could_start_bare_body(&self, c: char) -> bool {
        return c.is_ascii_digit() || self.verse_markers.iter().any(|marker| return marker.starts_with(c));
    }

    /// Leftmost book name at or after byte `from`.
    pub fn find_book<'a>(&self, text: &'a str, from: usize) -> Option<Match<'a>> {
        return self.book.as_ref()?.find_at(text, from);
    }

    /// Compile patterns for the aliases of `index`.
    ///
    /// `index` should hold the aliases as configured, before number-prefix
    /// expansion; the pattern builds those spellings itself.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if the alternation is too large to compile.
    pub fn new(index: &AliasIndex, language: &Language) -> Result<Self, Error> {
        let mut numbered: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut plain: BTreeSet<&str> = BTreeSet::new();
        for (alias, _) in index.iter() {
            match split_number_prefix(alias) {
                Some((digits, rest)) => {
                    numbered.entry(digits).or_default().insert(rest);
                }
                None => {
                    plain.insert(alias);
                }
            }
        }

        let spellings: HashMap<&str, Vec<&str>> = prefixes_by_number(language).into_values().collect();
        let mut any_groups = Vec::new();
        let mut digit_groups = Vec::new();
        let mut ordered: Vec<(&str, &BTreeSet<&str>)> = numbered.iter().map(|(d, rest)| return (*d, rest)).collect();
        ordered.sort_by_key(|(digits, _)| return Reverse(digits.parse::<u16>().unwrap_or(0)));
        for (digits, rests) in ordered {
            let names = alternation(rests.iter().copied());
            let prefixes = spellings.get(digits).cloned().unwrap_or_else(|| return vec![digits]);
            any_groups.push(format!(r"(?:{})\s*(?:{names})", alternation(prefixes.into_iter())));
            digit_groups.push(format!(r"{}\s*(?:{names})", regex::escape(digits)));
        }
        if !plain.is_empty() {
            any_groups.push(format!("(?:{})", alternation(plain.into_iter())));
        }

        let book = if any_groups.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"\b(?:{})\b\.?", any_groups.join("|")))?)
        };
        let numbered_book = if digit_groups.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"^(?:{})\b", digit_groups.join("|")))?)
        };

        let mut verse_markers: Vec<String> = language
            .verse_markers
            .iter()
            .filter(|marker| return !marker.is_empty())
            .cloned()
            .collect();
        verse_markers.sort_by(|a, b| return b.len().cmp(&a.len()).then_with(|| return a.cmp(b)));
        verse_markers.dedup();

        return Ok(Self {
            book,
            numbered_book,
            verse_markers,
        });
    }

    /// `chapter colon list`.
    fn chapter_list<'a>(&self, cursor: &mut Cursor<'a>) -> Option<Body<'a>> {
        let chapter = number(cursor)?;
        if !cursor.eat(is_colon) {
            return None;
        }
        let items = self.list(cursor)?;
        return Some(Body::ChapterList { chapter, items });
    }

    /// A comma-separated list of numbers and ranges. The cursor ends after
    /// the last item taken.
    fn list<'a>(&self, cursor: &mut Cursor<'a>) -> Option<Vec<ListItem<'a>>> {
        let mut items = vec![item(cursor)?];
        loop {
            let before_comma = cursor.pos();
            if !cursor.eat(|c| return c == ',') {
                break;
            }
            cursor.skip_whitespace();
            match self.later_item(cursor) {
                Some(next) => items.push(next),
                None => {
                    cursor.reset(before_comma);
                    break;
                }
            }
        }
        return Some(items);
    }

    /// An item after the first. A lone number is refused when it opens a
    /// `chapter:verse` or a numbered book name such as `3 John`.
    fn later_item<'a>(&self, cursor: &mut Cursor<'a>) -> Option<ListItem<'a>> {
        let at = cursor.pos();
        let next = item(cursor)?;
        if next.end.is_some() {
            return Some(next);
        }
        if opens_chapter_verse(cursor) || self.starts_numbered_book(cursor.text(), at) {
            cursor.reset(at);
            return None;
        }
        return Some(next);
    }

    fn starts_numbered_book(&self, text: &str, at: usize) -> bool {
        let Some(pattern) = &self.numbered_book else {
            return false;
        };
        return text.get(at..).is_some_and(|rest| return pattern.is_match(rest));
    }
}

/// `number colon number dash number colon number`.
fn chapter_range<'a>(cursor: &mut Cursor<'a>) -> Option<Body<'a>> {
    let start_chapter = number(cursor)?;
    cursor.eat(is_colon).then_some(())?;
    let start_verse = number(cursor)?;
    cursor.eat(is_dash).then_some(())?;
    let end_chapter = number(cursor)?;
    cursor.eat(is_colon).then_some(())?;
    let end_verse = number(cursor)?;
    return Some(Body::ChapterRange {
        end_chapter,
        end_verse,
        start_chapter,
        start_verse,
    });
}

/// `number [dash number]`. A dash not followed by a number is left unread.
fn item<'a>(cursor: &mut Cursor<'a>) -> Option<ListItem<'a>> {
    let start = number(cursor)?;
    let after_start = cursor.pos();
    if cursor.eat(is_dash)
        && let Some(end) = number(cursor)
    {
        return Some(ListItem {
            end: Some(end),
            start,
        });
    }
    cursor.reset(after_start);
    return Some(ListItem { end: None, start });
}

/// Digits with an optional partial-verse letter, ending at a word boundary.
fn number<'a>(cursor: &mut Cursor<'a>) -> Option<&'a str> {
    let start = cursor.pos();
    cursor.eat_digits()?;
    let after_digits = cursor.pos();
    if cursor.eat(|c| return matches!(c, 'a'..='d')) && cursor.peek().is_some_and(char::is_alphanumeric) {
        cursor.reset(after_digits);
    }
    if cursor.peek().is_some_and(char::is_alphanumeric) {
        cursor.reset(start);
        return None;
    }
    return Some(cursor.slice_from(start));
}

fn opens_chapter_verse(cursor: &Cursor<'_>) -> bool {
    let mut probe = cursor.clone();
    return probe.eat(is_colon) && probe.peek().is_some_and(|c| return c.is_ascii_digit());
}

/// Regex alternation of `names`, longest first so that no name is cut short
/// by one of its own prefixes. Inner whitespace matches any whitespace run.
fn alternation<'n>(names: impl Iterator<Item = &'n str>) -> String {
    let mut names: Vec<&str> = names.collect();
    names.sort_by(|a, b| return b.len().cmp(&a.len()).then_with(|| return a.cmp(b)));
    names.dedup();
    return names
        .iter()
        .map(|name| return name.split_whitespace().map(regex::escape).collect::<Vec<_>>().join(r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
}

const fn is_colon(c: char) -> bool {
    return matches!(c, ':' | '.');
}

const fn is_dash(c: char) -> bool {
    return matches!(c, '-' | '–');
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::alias::AliasOptions;
    use crate::config::Corpus;

    const CORPUS: &str = r#"
[language]
verse_markers = ["v.", "vv."]

[language.number_prefixes]
"1" = ["First", "I"]
"3" = ["Third", "III"]

[[libraries]]
id = 400
name = "New Testament"
abbrev = "NT"
books = [
    { id = 4, name = "John", abbrev = "Jn", chapters = 21 },
    { id = 6, name = "Romans", abbrev = "Rom", chapters = 16 },
    { id = 7, name = "1 Corinthians", abbrev = "1 Cor", chapters = 16 },
    { id = 25, name = "3 John", abbrev = "3 Jn", chapters = 1 },
]
"#;

    fn grammar() -> Grammar {
        let corpus = Corpus::from_toml_str(CORPUS).unwrap();
        let index = AliasIndex::build(&corpus.libraries, &AliasOptions::default()).unwrap();
        return Grammar::new(&index, &corpus.language).unwrap();
    }

    fn book_at<'a>(grammar: &Grammar, text: &'a str) -> &'a str {
        return grammar.find_book(text, 0).unwrap().as_str();
    }

    #[test]
    fn finds_book_names_with_prefix_spellings() {
        let grammar = grammar();
        assert_eq!(book_at(&grammar, "see Romans 1"), "Romans");
        assert_eq!(book_at(&grammar, "see 1 Cor 2"), "1 Cor");
        assert_eq!(book_at(&grammar, "see 1Cor 2"), "1Cor");
        assert_eq!(book_at(&grammar, "see First\n  Corinthians"), "First\n  Corinthians");
        assert_eq!(book_at(&grammar, "see III John"), "III John");
        assert_eq!(book_at(&grammar, "Rom. 3"), "Rom.");
        assert!(grammar.find_book("Romansque", 0).is_none());
    }

    #[test]
    fn book_body_shapes() {
        let grammar = grammar();
        let (body, end) = grammar.book_body("Rom 1:1-2:4b rest", 3).unwrap();
        assert!(matches!(body, Body::ChapterRange { end_verse: "4b", .. }));
        assert_eq!(end, 12);

        let (body, _) = grammar.book_body("Rom 1:1–4, 6, 7-9", 3).unwrap();
        let Body::ChapterList { chapter, items } = body else {
            panic!("expected a chapter list");
        };
        assert_eq!(chapter, "1");
        assert_eq!(items.len(), 3);
        assert_eq!(items.first().unwrap().end, Some("4"));

        let (body, _) = grammar.book_body("Rom 3-4", 3).unwrap();
        assert!(matches!(body, Body::List(ref items) if items.len() == 1));
        assert!(grammar.book_body("Rom, then", 3).is_none());
    }

    #[test]
    fn list_stops_before_new_chapter_or_numbered_book() {
        let grammar = grammar();
        let text = "Rom 1:1, 2, 3 John 3";
        let (body, end) = grammar.book_body(text, 3).unwrap();
        assert!(matches!(body, Body::ChapterList { ref items, .. } if items.len() == 2));
        assert_eq!(text.get(..end), Some("Rom 1:1, 2"));

        let text = "v.6-7, 6:5";
        let (_, end) = grammar.bare_body(text, 0).unwrap();
        assert_eq!(text.get(..end), Some("v.6-7"));
    }

    #[test]
    fn numbers_end_at_word_boundaries() {
        let grammar = grammar();
        assert!(grammar.book_body("Rom 5th", 3).is_none());
        let (body, _) = grammar.book_body("Rom 5a", 3).unwrap();
        assert!(matches!(body, Body::List(ref items) if items.first().unwrap().start == "5a"));
    }

    #[test]
    fn bare_bodies_need_a_marker_or_colon() {
        let grammar = grammar();
        assert!(matches!(grammar.bare_body("vv. 3-4", 0), Some((Body::Marked(_), 7))));
        assert!(matches!(grammar.bare_body("3:16", 0), Some((Body::ChapterList { .. }, 4))));
        assert!(grammar.bare_body("16 people", 0).is_none());
        assert!(grammar.bare_body("v. x", 0).is_none());
    }

    #[test]
    fn empty_alias_set_has_no_book_pattern() {
        let grammar = Grammar::new(&AliasIndex::default(), &Language::default()).unwrap();
        assert!(grammar.find_book("Romans 1:1", 0).is_none());
        assert!(grammar.bare_body("1:1", 0).is_some());
    }
}
