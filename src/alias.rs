//! Book-name spellings and their lookup table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::{Language, Library};
use crate::coordinate::check_field;
use crate::error::Error;

/// A (library, book) pair.
#[allow(
    clippy::arbitrary_source_item_ordering,
    reason = "field order defines the derived (library, book) ordering"
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BookId {
    /// Library id.
    library: u16,
    /// Book id within the library.
    book: u16,
}

impl BookId {
    /// Book id within the library.
    pub const fn book(&self) -> u16 {
        return self.book;
    }

    /// Library id.
    pub const fn library(&self) -> u16 {
        return self.library;
    }

    /// Build a pair, rejecting ids outside 1..=999.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if either id is outside 1..=999.
    pub fn new(library: u16, book: u16) -> Result<Self, Error> {
        check_field("library", library)?;
        check_field("book", book)?;
        return Ok(Self { library, book });
    }

    /// Build a pair from ids already known to be in range.
    pub(crate) const fn new_unchecked(library: u16, book: u16) -> Self {
        return Self { library, book };
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}.{}", self.library, self.book);
    }
}

/// How extra aliases are filtered and how collisions are treated.
#[derive(Debug, Clone, Copy)]
pub struct AliasOptions {
    /// Index two-letter extra aliases such as `Ro`. Names and
    /// abbreviations are indexed regardless.
    pub include_short_aliases: bool,
    /// Fail on an alias claimed by two different books. When off, the
    /// later book wins.
    pub strict: bool,
}

impl Default for AliasOptions {
    fn default() -> Self {
        return Self {
            include_short_aliases: true,
            strict: true,
        };
    }
}

/// Map from every accepted book spelling to the book it names.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    /// Spelling to book.
    entries: HashMap<String, BookId>,
    /// Whether a spelling claimed by two books is an error.
    strict: bool,
}

impl AliasIndex {
    /// Index each book's name, abbreviation, and qualifying extra aliases.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyAlias` for a blank spelling, `Error::OutOfRange`
    /// for an unusable id, or `Error::DuplicateAlias` when `options.strict`
    /// is set and two books share a spelling.
    pub fn build(libraries: &[Library], options: &AliasOptions) -> Result<Self, Error> {
        let mut index = Self {
            entries: HashMap::new(),
            strict: options.strict,
        };
        for library in libraries {
            for book in &library.books {
                let id = BookId::new(library.id, book.id)?;
                index.insert(&book.name, id)?;
                if book.abbrev != book.name {
                    index.insert(&book.abbrev, id)?;
                }
                for alias in &book.aliases {
                    if alias.trim().is_empty() {
                        return Err(Error::EmptyAlias { book: id });
                    }
                    if qualifies(alias, options.include_short_aliases) {
                        index.insert(alias, id)?;
                    }
                }
            }
        }
        return Ok(index);
    }

    /// Look up an exact spelling.
    pub fn get(&self, alias: &str) -> Option<BookId> {
        return self.entries.get(alias).copied();
    }

    /// Whether no spelling is indexed.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Every (spelling, book) pair, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, BookId)> {
        return self.entries.iter().map(|(alias, id)| return (alias.as_str(), *id));
    }

    /// Number of indexed spellings.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Resolve a spelling exactly as it was matched in running text.
    ///
    /// Whitespace runs collapse to one space and a trailing period is
    /// dropped. A number prefix written without a space (`1Cor`, `IICor`)
    /// is rewritten to the canonical `2 Cor` form. Returns the normalized
    /// spelling that was found, alongside the book.
    pub fn resolve_spelling(&self, matched: &str, language: &Language) -> Option<(String, BookId)> {
        let name = normalize_book_name(matched);
        if let Some(id) = self.get(&name) {
            return Some((name, id));
        }
        for (_, (digits, spellings)) in prefixes_by_number(language).into_iter().rev() {
            for spelling in spellings {
                let Some(tail) = name.strip_prefix(spelling) else {
                    continue;
                };
                let tail = tail.trim_start();
                if tail.is_empty() {
                    continue;
                }
                let canonical = format!("{digits} {tail}");
                if let Some(id) = self.get(&canonical) {
                    return Some((canonical, id));
                }
            }
        }
        debug!(name, "no alias matches spelling");
        return None;
    }

    /// A copy extended with every number-prefix spelling of each numbered
    /// alias: `1 Cor` also yields `First Cor`, `I Cor`, and so on.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateAlias` if an expanded spelling already names
    /// a different book and the index is strict.
    pub fn with_number_prefixes(&self, language: &Language) -> Result<Self, Error> {
        let mut expanded = self.clone();
        let mut numbered: Vec<(&str, BookId)> = self
            .iter()
            .filter(|(alias, _)| return split_number_prefix(alias).is_some())
            .collect();
        numbered.sort_unstable();
        for (alias, id) in numbered {
            let Some((digits, rest)) = split_number_prefix(alias) else {
                continue;
            };
            let Some(prefixes) = language.number_prefixes.get(digits) else {
                continue;
            };
            for prefix in prefixes {
                expanded.insert(&format!("{prefix} {rest}"), id)?;
            }
        }
        return Ok(expanded);
    }

    /// Add one spelling.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyAlias` for a blank spelling, or
    /// `Error::DuplicateAlias` if it names another book and the index is strict.
    fn insert(&mut self, alias: &str, id: BookId) -> Result<(), Error> {
        if alias.trim().is_empty() {
            return Err(Error::EmptyAlias { book: id });
        }
        if let Some(&existing) = self.entries.get(alias)
            && existing != id
        {
            if self.strict {
                return Err(Error::DuplicateAlias {
                    alias: alias.to_string(),
                    conflicting: id,
                    existing,
                });
            }
            debug!(alias, %existing, replacement = %id, "alias reassigned");
        }
        self.entries.insert(alias.to_string(), id);
        return Ok(());
    }
}

/// Collapse whitespace runs and drop one trailing period.
pub fn normalize_book_name(matched: &str) -> String {
    let collapsed = matched.split_whitespace().collect::<Vec<_>>().join(" ");
    return collapsed
        .strip_suffix('.')
        .map_or_else(|| return collapsed.clone(), str::to_string);
}

/// Each number's spellings, longest first, ending with the digits
/// themselves. Keyed by numeric value.
pub(crate) fn prefixes_by_number(language: &Language) -> BTreeMap<u16, (&str, Vec<&str>)> {
    let mut by_number: BTreeMap<u16, (&str, Vec<&str>)> = BTreeMap::new();
    for (digits, spellings) in &language.number_prefixes {
        let Ok(number) = digits.parse::<u16>() else {
            continue;
        };
        let mut all: Vec<&str> = spellings.iter().map(String::as_str).collect();
        all.sort_unstable_by(|a, b| return b.len().cmp(&a.len()).then_with(|| return a.cmp(b)));
        all.push(digits.as_str());
        by_number.insert(number, (digits.as_str(), all));
    }
    return by_number;
}

/// Split `"1 Cor"` into `("1", "Cor")`. Only a leading run of ASCII digits
/// followed by a single space counts as a number prefix.
pub fn split_number_prefix(alias: &str) -> Option<(&str, &str)> {
    let (digits, rest) = alias.split_once(' ')?;
    if digits.is_empty() || !digits.bytes().all(|b| return b.is_ascii_digit()) || rest.is_empty() {
        return None;
    }
    return Some((digits, rest));
}

/// Whether an extra alias is long enough to index.
fn qualifies(alias: &str, include_short_aliases: bool) -> bool {
    let bare = split_number_prefix(alias).map_or(alias, |(_, rest)| return rest);
    let length = bare.chars().count();
    return length > 2 || (length == 2 && include_short_aliases);
}
