//! Find citations such as `Rom 1:1–4, 6` in free text and resolve them to
//! intervals of (library, book, chapter, verse) coordinates.
//!
//! ```no_run
//! use citescan::{AliasOptions, Corpus, ScanOptions, Scanner};
//!
//! # fn main() -> Result<(), citescan::Error> {
//! let corpus = Corpus::load("corpus.toml".as_ref())?;
//! let scanner = Scanner::new(&corpus, &AliasOptions::default())?;
//! for found in scanner.scan("See Romans 1:16-17, v.20.", ScanOptions::default()) {
//!     println!("{} at {}..{}", found.text, found.start, found.end);
//! }
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod citation;
pub mod config;
pub mod coordinate;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod interval;
pub mod number;
pub mod scanner;
pub mod tokenizer;

pub use alias::{AliasIndex, AliasOptions, BookId};
pub use citation::Citation;
pub use config::{Book, Corpus, Language, Library};
pub use coordinate::Coordinate;
pub use error::Error;
pub use interval::{Interval, IntervalKind};
pub use scanner::{ContextStack, Match, Scan, ScanOptions, Scanner};
