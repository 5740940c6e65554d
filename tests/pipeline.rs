//! End-to-end checks: files in, pipeline, files out.

use contact_merge::{
    dedupe_union, load_table, load_tables, parse_quoted_pairs, parse_semicolon_list, repair,
    subtract_asymmetric, subtract_symmetric, write_records, ContactError, Layout, Record,
};
use std::path::{Path, PathBuf};

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_pasted_text_repair_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let text = r#""john doe" <John.Doe@Example.com>, "mary@example.com" <mary.smith@example.com>, "Prince" <prince@example.com>"#;

    let parsed = parse_quoted_pairs(text).unwrap();
    assert_eq!(parsed.len(), 3);

    let (repaired, report) = repair(&parsed);
    assert_eq!(
        repaired,
        vec![
            Record::new("John", "Doe", "john.doe@example.com"),
            Record::new("Mary", "Smith", "mary.smith@example.com"),
        ]
    );
    assert_eq!(report.names_filled, 1);
    assert_eq!(report.entries_deleted, 1);

    let out = dir.path().join("clean.csv");
    write_records(&repaired, &out, true).unwrap();
    let back = load_table(&out, Layout::Named).unwrap().records().unwrap();
    assert_eq!(back, repaired);
}

#[test]
fn test_semicolon_list_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let records =
        parse_semicolon_list("Ada Lovelace <ada@x.com>;; solo@x.com; Alan M Turing <alan@x.com>;");

    let out = dir.path().join("list.csv");
    write_records(&records, &out, true).unwrap();
    let content = std::fs::read_to_string(&out).unwrap();

    assert_eq!(
        content,
        "First Name,Last Name,Email\nAda,Lovelace,ada@x.com\n,,solo@x.com\nAlan,M Turing,alan@x.com\n"
    );
}

#[test]
fn test_combine_named_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(
        dir.path(),
        "a.csv",
        "First Name,Last Name,Email\nAda,Lovelace,ada@x.com\nAlan,Turing,ALAN@x.com\n",
    );
    let b = write_file(
        dir.path(),
        "b.csv",
        "Email,First Name,Last Name\nalan@X.com,Al,T\ngrace@x.com,Grace,Hopper\n",
    );

    let tables = load_tables(&[a, b], Layout::Named).unwrap();
    let result = dedupe_union(&tables).unwrap();

    assert_eq!(result.initial_count, 4);
    assert_eq!(result.removed_count, 1);
    assert_eq!(result.removed_emails, vec!["alan@x.com"]);
    assert_eq!(
        result.surviving_records,
        vec![
            Record::new("Ada", "Lovelace", "ada@x.com"),
            Record::new("Alan", "Turing", "alan@x.com"),
            Record::new("Grace", "Hopper", "grace@x.com"),
        ]
    );
}

#[test]
fn test_combine_rejects_file_without_email_column() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.csv", "First Name,Last Name,Email\nAda,L,ada@x.com\n");
    let b = write_file(dir.path(), "b.csv", "First Name,Last Name\nAlan,Turing\n");

    let tables = load_tables(&[a, b.clone()], Layout::Named).unwrap();
    let err = dedupe_union(&tables).unwrap_err();

    assert_eq!(
        err,
        ContactError::missing_column(b.display().to_string(), "Email")
    );
}

#[test]
fn test_subtract_header_less_files() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_file(
        dir.path(),
        "base.csv",
        "Ada,Lovelace,ada@x.com\nAlan,Turing,alan@x.com\nGrace,Hopper,grace@x.com\n",
    );
    let exclude = write_file(dir.path(), "exclude.csv", "X,Y,alan@x.com\n");

    let base = load_table(&base, Layout::Positional).unwrap();
    let exclude = load_table(&exclude, Layout::Positional).unwrap();
    let result = subtract_asymmetric(&base, &exclude).unwrap();

    let out = dir.path().join("out.csv");
    write_records(&result.surviving_records, &out, false).unwrap();

    assert_eq!(result.initial_count, 3);
    assert_eq!(result.remaining_count(), 2);
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "Ada,Lovelace,ada@x.com\nGrace,Hopper,grace@x.com\n"
    );
}

#[test]
fn test_subtract_all_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.csv", "First Name,Last Name,Email\na,b,p@q.com\ne,f,r@s.com\n");
    let b = write_file(dir.path(), "b.csv", "First Name,Last Name,Email\nc,d,P@Q.com\n");

    let tables = load_tables(&[a, b], Layout::Named).unwrap();
    let result = subtract_symmetric(&tables).unwrap();

    assert_eq!(result.surviving_records, vec![Record::new("e", "f", "r@s.com")]);
    assert_eq!(result.removed_count, 2);
    assert_eq!(result.removed_emails, vec!["p@q.com"]);
}

#[test]
fn test_repair_file_round_trip_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        dir.path(),
        "raw.csv",
        "First Name,Last Name,Email\n  ada ,LOVELACE, Ada@X.com\nLegal Name,,alan.turing@x.com\n,,\nBob,,bob@x.com\n",
    );

    let records = load_table(&input, Layout::Named).unwrap().records().unwrap();
    let (repaired, report) = repair(&records);
    assert_eq!(
        repaired,
        vec![
            Record::new("Ada", "Lovelace", "ada@x.com"),
            Record::new("Alan", "Turing", "alan.turing@x.com"),
        ]
    );
    assert_eq!(report.entries_deleted, 2);

    let out = dir.path().join("repaired.csv");
    write_records(&repaired, &out, true).unwrap();
    let reloaded = load_table(&out, Layout::Named).unwrap().records().unwrap();
    let (again, second_report) = repair(&reloaded);

    assert_eq!(again, repaired);
    assert!(second_report.is_clean());
}
