/// Crate-level error types for citescan.
use std::path::PathBuf;

use crate::alias::BookId;
use crate::coordinate::Coordinate;

/// Every error names the value that caused it. Only configuration and direct
/// construction can fail; scanning text never produces an `Error`.
#[allow(clippy::error_impl_error, reason = "single crate-wide error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A corpus configuration file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// Two different books claim the same alias.
    #[error("duplicate book alias `{alias}`: already {existing}, also {conflicting}")]
    DuplicateAlias {
        /// The colliding spelling.
        alias: String,
        /// Book that tried to register the alias second.
        conflicting: BookId,
        /// Book that registered the alias first.
        existing: BookId,
    },

    /// A book's name, abbreviation, or extra alias is empty.
    #[error("empty book alias for {book}")]
    EmptyAlias {
        /// Book carrying the empty alias.
        book: BookId,
    },

    /// A citation was constructed from no intervals.
    #[error("a citation needs at least one interval")]
    EmptyCitation,

    /// The corpus configuration parsed but describes an impossible corpus.
    #[error("invalid corpus: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// An interval was constructed with its start after its end.
    #[error("interval start {start} is after end {end}")]
    InvertedInterval {
        /// The requested end coordinate.
        end: Coordinate,
        /// The requested start coordinate.
        start: Coordinate,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// A packed ordinal encodes more than four base-1000 digits.
    #[error("ordinal {ordinal} does not encode a coordinate")]
    OrdinalOutOfRange {
        /// The rejected ordinal.
        ordinal: u64,
    },

    /// A coordinate field falls outside 1..=999.
    #[error("{field} {value} is outside 1..=999")]
    OutOfRange {
        /// Which field was rejected (`library`, `book`, `chapter`, `verse`).
        field: &'static str,
        /// The rejected value.
        value: u16,
    },

    /// A book-name pattern could not be compiled.
    #[error("pattern: {0}")]
    Pattern(
        /// The wrapped regex build error.
        #[from]
        regex::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
