//! CLI commands for citescan: scan, aliases, check.

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use citescan::{AliasOptions, Citation, Corpus, Error, ScanOptions, Scanner};
use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

use crate::{CorpusArgs, ScanArgs};

/// File extensions picked up when walking a directory.
const SCANNED_EXTENSIONS: &[&str] = &["md", "txt"];

/// One line of `scan --json` output.
#[derive(Serialize)]
struct Record<'a> {
    citation: Option<&'a Citation>,
    line: usize,
    source: &'a str,
    text: &'a str,
}

/// Print every alias with the book it names, sorted by spelling.
///
/// # Errors
///
/// Returns errors from loading the corpus or building the scanner.
pub fn aliases(args: &CorpusArgs) -> Result<ExitCode, Error> {
    let (_, scanner) = load(args)?;
    let mut rows: Vec<(&str, citescan::BookId)> = scanner.aliases().iter().collect();
    rows.sort_unstable();
    for (alias, id) in rows {
        let name = scanner.book(id.library(), id.book()).map_or("", |book| return book.name.as_str());
        println!("{alias}\t{id}\t{name}");
    }
    return Ok(ExitCode::SUCCESS);
}

/// Load the corpus and build its alias table, reporting the totals.
///
/// # Errors
///
/// Returns the first configuration or alias error found.
pub fn check(args: &CorpusArgs) -> Result<ExitCode, Error> {
    let (corpus, scanner) = load(args)?;
    println!(
        "{} libraries, {} books, {} aliases: OK",
        corpus.libraries.len(),
        corpus.book_count(),
        scanner.aliases().len()
    );
    return Ok(ExitCode::SUCCESS);
}

/// Print the citations found in each input. Exits 1 when nothing was found.
///
/// # Errors
///
/// Returns errors from loading the corpus, or `Error::Io` if stdin or an
/// explicitly named file cannot be read.
pub fn scan(args: &ScanArgs) -> Result<ExitCode, Error> {
    let (_, scanner) = load(&args.corpus)?;
    let options = ScanOptions {
        contextual: !args.no_context,
        include_books: args.books,
        include_unresolved: args.unresolved,
    };

    let mut found = 0_usize;
    if args.paths.is_empty() {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        found = found.saturating_add(scan_one(&scanner, "-", &content, options, args));
    } else {
        for path in collect_inputs(&args.paths) {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) if args.paths.contains(&path) => return Err(Error::Io(e)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                },
            };
            let source = path.display().to_string();
            found = found.saturating_add(scan_one(&scanner, &source, &content, options, args));
        }
    }

    if found == 0 {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Expand directories into the scannable files beneath them, in path order.
/// Files named directly are kept whatever their extension.
fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.is_dir() {
            inputs.push(path.clone());
            continue;
        }
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| {
                return entry
                    .map_err(|e| {
                        warn!(error = %e, "skipping unreadable directory entry");
                        return e;
                    })
                    .ok();
            })
            .filter(|entry| return entry.file_type().is_file() && has_scanned_extension(entry.path()))
            .map(walkdir::DirEntry::into_path)
            .collect();
        files.sort();
        inputs.extend(files);
    }
    return inputs;
}

fn has_scanned_extension(path: &Path) -> bool {
    return path
        .extension()
        .and_then(|ext| return ext.to_str())
        .is_some_and(|ext| return SCANNED_EXTENSIONS.contains(&ext));
}

/// 1-based line of byte offset `at`, given the offsets of every newline.
fn line_of(newlines: &[usize], at: usize) -> usize {
    return newlines.partition_point(|&newline| return newline < at).saturating_add(1);
}

/// Load the corpus named on the command line and build a scanner for it.
///
/// # Errors
///
/// Returns errors from [`Corpus::load`] and [`Scanner::new`].
fn load(args: &CorpusArgs) -> Result<(Corpus, Scanner), Error> {
    let corpus = Corpus::load(&args.config)?;
    let options = AliasOptions {
        include_short_aliases: !args.no_short_aliases,
        strict: !args.loose,
    };
    let scanner = Scanner::new(&corpus, &options)?;
    return Ok((corpus, scanner));
}

/// Print the matches in one input and return how many there were.
fn scan_one(scanner: &Scanner, source: &str, content: &str, options: ScanOptions, args: &ScanArgs) -> usize {
    let newlines: Vec<usize> = content.match_indices('\n').map(|(at, _)| return at).collect();
    let mut count = 0_usize;
    for found in scanner.scan(content, options) {
        count = count.saturating_add(1);
        let line = line_of(&newlines, found.start);
        let citation = found.citation.as_ref().map(|c| return if args.combine { c.combine() } else { c.clone() });
        if args.json {
            let record = Record {
                citation: citation.as_ref(),
                line,
                source,
                text: found.text,
            };
            match serde_json::to_string(&record) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!(error = %e, "could not serialize match"),
            }
            continue;
        }
        let text = found.text.split_whitespace().collect::<Vec<_>>().join(" ");
        match citation {
            Some(c) => println!("{source}:{line}: {text} => {c}"),
            None => println!("{source}:{line}: {text} => unresolved"),
        }
    }
    return count;
}
