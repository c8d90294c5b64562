use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::coordinate::check_field;
use crate::error::Error;

/// One book of a library.
#[derive(Debug, Clone, Deserialize)]
pub struct Book {
    /// Canonical abbreviation, e.g. `Rom`. Always indexed as an alias.
    pub abbrev: String,
    /// Further spellings, indexed subject to length filtering.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Number of chapters. A single-chapter book reads bare numbers as verses.
    pub chapters: u16,
    /// Id within the library, 1..=999.
    pub id: u16,
    /// Full name, e.g. `Romans`. Always indexed as an alias.
    pub name: String,
}

/// A numbered collection of books.
#[derive(Debug, Clone, Deserialize)]
pub struct Library {
    pub abbrev: String,
    pub books: Vec<Book>,
    /// Id, 1..=999. Libraries sort by id.
    pub id: u16,
    pub name: String,
}

/// Language-specific recognition parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Language {
    /// Short aliases that never produce a book-only match on their own.
    #[serde(default)]
    pub ambiguous_aliases: Vec<String>,
    /// Alternative spellings for a leading digit in a book name, e.g.
    /// `"1" = ["First", "I"]` makes `First Cor` and `I Cor` name `1 Cor`.
    #[serde(default)]
    pub number_prefixes: BTreeMap<String, Vec<String>>,
    /// Tokens introducing a verse list in the current chapter, e.g. `v.`.
    #[serde(default)]
    pub verse_markers: Vec<String>,
}

/// Everything a scanner needs: the reference system and its language.
#[derive(Debug, Clone, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub language: Language,
    pub libraries: Vec<Library>,
}

impl Corpus {
    /// Parse and validate a corpus from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed, or
    /// `Error::InvalidConfig` if ids or chapter counts are unusable.
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let corpus: Self = toml::from_str(content)?;
        corpus.validate()?;
        return Ok(corpus);
    }

    /// Load a corpus from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file does not exist,
    /// `Error::Io` if reading fails otherwise, and any error of
    /// [`Corpus::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::from_toml_str(&content);
    }

    /// Total number of books across all libraries.
    pub fn book_count(&self) -> usize {
        return self.libraries.iter().map(|library| return library.books.len()).sum();
    }

    /// Reject ids and chapter counts outside 1..=999, and repeated ids.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> Result<(), Error> {
        let mut library_ids = BTreeSet::new();
        for library in &self.libraries {
            check_field("library", library.id).map_err(|e| {
                return invalid(format!("library `{}`: {e}", library.name));
            })?;
            if !library_ids.insert(library.id) {
                return Err(invalid(format!("library id {} is used twice", library.id)));
            }
            let mut book_ids = BTreeSet::new();
            for book in &library.books {
                check_field("book", book.id).map_err(|e| {
                    return invalid(format!("book `{}`: {e}", book.name));
                })?;
                check_field("chapter", book.chapters).map_err(|e| {
                    return invalid(format!("book `{}` chapter count: {e}", book.name));
                })?;
                if !book_ids.insert(book.id) {
                    return Err(invalid(format!(
                        "book id {} is used twice in library {}",
                        book.id, library.id
                    )));
                }
            }
        }
        return Ok(());
    }
}

fn invalid(reason: String) -> Error {
    return Error::InvalidConfig { reason };
}
