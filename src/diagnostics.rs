use citescan::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each configuration problem says what happened and how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Corpus Not Found

`{}` does not exist.

## Fix

Pass the corpus file with `--config path/to/corpus.toml`.
", path.display()),

        Error::DuplicateAlias { alias, conflicting, existing } => render_duplicate_alias(alias, *existing, *conflicting),

        Error::EmptyAlias { book } => format!("\
# Error: Empty Alias

Book {book} has a blank name, abbreviation, or alias.

## Fix

Remove the empty string from the book's entry.
"),

        Error::InvalidConfig { reason } => format!("\
# Error: Invalid Corpus

{reason}

## Fix

Library ids, book ids, and chapter counts must each lie in 1..=999, and ids
must be unique within their parent.
"),

        Error::Pattern(e) => format!("\
# Error: Book Pattern

The alias table could not be compiled into a pattern:

{e}
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),

        _ => format!("\
# Error

{e}
"),
    }
}

fn render_duplicate_alias(alias: &str, existing: citescan::BookId, conflicting: citescan::BookId) -> String {
    format!("\
# Error: Duplicate Alias

`{alias}` names both book {existing} and book {conflicting}.

## Fix

Remove `{alias}` from one of the two books, or let the later book win:

    citescan scan --loose ...
")
}
