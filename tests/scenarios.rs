use std::path::Path;

use citescan::{AliasOptions, Citation, Corpus, Interval, Match, ScanOptions, Scanner};

const NT: u16 = 400;
const JOHN: u16 = 4;
const ROMANS: u16 = 6;
const FIRST_CORINTHIANS: u16 = 7;
const PHILEMON: u16 = 18;
const THIRD_JOHN: u16 = 25;
const JUDE: u16 = 26;

fn scanner() -> Scanner {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/english.toml");
    let corpus = Corpus::load(&path).unwrap();
    return Scanner::new(&corpus, &AliasOptions::default()).unwrap();
}

fn verses(book: u16, chapter: u16, verse: u16, end: u16) -> Interval {
    return Interval::verse_range(NT, book, chapter, verse, Some(end)).unwrap();
}

fn intervals(found: &Match<'_>) -> Vec<Interval> {
    return found.citation.as_ref().map(|c| return c.iter().copied().collect()).unwrap_or_default();
}

fn all_intervals(found: &[Match<'_>]) -> Vec<Vec<Interval>> {
    return found.iter().map(intervals).collect();
}

fn unresolved() -> ScanOptions {
    return ScanOptions {
        include_unresolved: true,
        ..ScanOptions::default()
    };
}

#[test]
fn verse_list_in_one_chapter() {
    let found = scanner().find_all("Romans 1:1–4, 6, 7-9", ScanOptions::default());
    assert_eq!(
        all_intervals(&found),
        vec![vec![verses(ROMANS, 1, 1, 4), verses(ROMANS, 1, 6, 6), verses(ROMANS, 1, 7, 9)]]
    );
}

#[test]
fn chapter_crossing_range_ignores_partial_verse_letters() {
    let scanner = scanner();
    let expected = Interval::new(
        citescan::Coordinate::new(NT, ROMANS, 1, 1).unwrap(),
        citescan::Coordinate::new(NT, ROMANS, 2, 4).unwrap(),
    )
    .unwrap();
    for text in ["Rom 1:1-2:4", "Rom 1:1a-2:4b"] {
        let found = scanner.first(text, ScanOptions::default()).unwrap();
        assert_eq!(intervals(&found), vec![expected], "{text}");
        assert!(expected.is_inter_chapter_range());
    }
}

#[test]
fn single_chapter_book_reads_bare_numbers_as_verses() {
    let found = scanner().find_all("Philemon 3-6, v.15", ScanOptions::default());
    assert_eq!(
        all_intervals(&found),
        vec![vec![verses(PHILEMON, 1, 3, 6)], vec![verses(PHILEMON, 1, 15, 15)]]
    );
}

#[test]
fn verse_markers_follow_the_current_chapter() {
    let found = scanner().find_all("Romans 1:1, v.9, vv.11-12", ScanOptions::default());
    assert_eq!(
        all_intervals(&found),
        vec![
            vec![verses(ROMANS, 1, 1, 1)],
            vec![verses(ROMANS, 1, 9, 9)],
            vec![verses(ROMANS, 1, 11, 12)],
        ]
    );
}

#[test]
fn bodies_without_context_resolve_to_nothing() {
    let scanner = scanner();
    let text = "v.5, v.6-7, 6:5, 8:6-7";
    assert!(scanner.find_all(text, ScanOptions::default()).is_empty());
    let found = scanner.find_all(text, unresolved());
    assert_eq!(found.len(), 4);
    assert!(found.iter().all(|m| return m.citation.is_none()));
    let texts: Vec<&str> = found.iter().map(|m| return m.text).collect();
    assert_eq!(texts, vec!["v.5", "v.6-7", "6:5", "8:6-7"]);
}

#[test]
fn verse_marker_after_book_mention_reads_from_chapter_one() {
    let scanner = scanner();
    let found = scanner.find_all("Romans, v.5", ScanOptions::default());
    assert_eq!(all_intervals(&found), vec![vec![verses(ROMANS, 1, 5, 5)]]);
    let found = scanner.find_all("Philemon v.15", ScanOptions::default());
    assert_eq!(all_intervals(&found), vec![vec![verses(PHILEMON, 1, 15, 15)]]);
    let found = scanner.find_all("Jude, v.3", ScanOptions::default());
    assert_eq!(all_intervals(&found), vec![vec![verses(JUDE, 1, 3, 3)]]);
}

#[test]
fn lone_number_before_numbered_book_stays_out_of_the_list() {
    let found = scanner().find_all("Romans 1:1, 2, 3 John 3", ScanOptions::default());
    assert_eq!(
        all_intervals(&found),
        vec![
            vec![verses(ROMANS, 1, 1, 1), verses(ROMANS, 1, 2, 2)],
            vec![verses(THIRD_JOHN, 1, 3, 3)],
        ]
    );
}

#[test]
fn inverted_ranges_need_an_abbreviation_reading() {
    let found = scanner().find_all("Romans 1:4–1, Rom 1:776-77, Rom 1:13-4", ScanOptions::default());
    assert_eq!(
        all_intervals(&found),
        vec![vec![verses(ROMANS, 1, 776, 777)], vec![verses(ROMANS, 1, 13, 14)]]
    );
}

#[test]
fn brackets_scope_context() {
    let found = scanner().find_all("Romans (John 1:1–4 (1 Cor 5:24 ()) 3:16) 1:16-17", ScanOptions::default());
    assert_eq!(
        all_intervals(&found),
        vec![
            vec![verses(JOHN, 1, 1, 4)],
            vec![verses(FIRST_CORINTHIANS, 5, 24, 24)],
            vec![verses(JOHN, 3, 16, 16)],
            vec![verses(ROMANS, 1, 16, 17)],
        ]
    );
}

#[test]
fn unbalanced_brackets_degrade_gracefully() {
    let found = scanner().find_all("Romans )John 1:1–4 (1 Cor 5:24 (() 3:16) 1:16-17", ScanOptions::default());
    assert_eq!(
        all_intervals(&found),
        vec![
            vec![verses(JOHN, 1, 1, 4)],
            vec![verses(FIRST_CORINTHIANS, 5, 24, 24)],
            vec![verses(FIRST_CORINTHIANS, 3, 16, 16)],
            vec![verses(FIRST_CORINTHIANS, 1, 16, 17)],
        ]
    );
}

#[test]
fn near_miss_words_are_not_books() {
    let options = ScanOptions {
        include_books: true,
        include_unresolved: true,
        ..ScanOptions::default()
    };
    assert!(scanner().find_all("Esxxx Gexxx Rexxx Laxxx!", options).is_empty());
}

#[test]
fn book_name_may_wrap_across_lines() {
    let found = scanner().find_all("as argued in 1 \n        Cor 5, and again", ScanOptions::default());
    assert_eq!(found.len(), 1);
    let citation = found.first().unwrap().citation.clone().unwrap();
    assert_eq!(citation, Citation::chapter(NT, FIRST_CORINTHIANS, 5).unwrap());
}

#[test]
fn number_prefix_spellings_name_the_same_book() {
    let scanner = scanner();
    for text in ["1 Cor 5:24", "1Cor 5:24", "I Cor 5:24", "ICor 5:24", "First Corinthians 5:24", "1st Cor 5:24"] {
        let found = scanner.first(text, ScanOptions::default()).unwrap();
        assert_eq!(intervals(&found), vec![verses(FIRST_CORINTHIANS, 5, 24, 24)], "{text}");
    }
}

#[test]
fn ambiguous_alias_is_not_a_book_mention_alone() {
    let options = ScanOptions {
        include_books: true,
        ..ScanOptions::default()
    };
    let found = scanner().find_all("Is this Isaiah? Am 5:24 says so.", options);
    let texts: Vec<&str> = found.iter().map(|m| return m.text).collect();
    assert_eq!(texts, vec!["Isaiah", "Am 5:24"]);
    assert!(found.first().unwrap().citation.as_ref().unwrap().is_whole_book());
    let amos = Interval::verse_range(200, 30, 5, 24, None).unwrap();
    assert_eq!(intervals(found.get(1).unwrap()), vec![amos]);
}

#[test]
fn book_mentions_are_reported_when_asked() {
    let options = ScanOptions {
        include_books: true,
        ..ScanOptions::default()
    };
    let found = scanner().find_all("Romans and Galatians", options);
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|m| return m.citation.as_ref().unwrap().is_whole_book()));
}

#[test]
fn matches_are_ordered_and_disjoint() {
    let text = "Rom 1:1; John 3:16 (cf. v.17), 1 Cor 13, and 3 John 4.";
    let found = scanner().find_all(text, unresolved());
    assert_eq!(found.len(), 5);
    for pair in found.windows(2) {
        let [first, second] = pair else {
            panic!("windows(2) yields pairs");
        };
        assert!(first.end <= second.start);
    }
    for m in &found {
        assert_eq!(text.get(m.start..m.end), Some(m.text));
    }
}

#[test]
fn scanning_is_restartable() {
    let scanner = scanner();
    let text = "Romans 1:1, v.9";
    assert_eq!(scanner.find_all(text, ScanOptions::default()), scanner.find_all(text, ScanOptions::default()));
    assert_eq!(scanner.first("v.9", ScanOptions::default()), None);
}

#[test]
fn combined_scan_output_is_minimal() {
    let found = scanner().first("Rom 1:3-5, 1-2, 6, 8", ScanOptions::default()).unwrap();
    let combined = found.citation.unwrap().combine();
    assert_eq!(combined.iter().copied().collect::<Vec<_>>(), vec![verses(ROMANS, 1, 1, 6), verses(ROMANS, 1, 8, 8)]);
}
