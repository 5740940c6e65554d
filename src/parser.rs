// 📝 Text Parser - pasted contact lists → records
// Two grammars:
//   Semicolon list:  John Doe <john@x.com>; jane@y.com; "Ann Lee" <ann@z.com>
//   Quoted pairs:    "John Doe" <john@x.com>, "Jane Roe" <jane@y.com>

use crate::error::{ContactError, Result};
use crate::record::{Record, RecordCollection};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

// ============================================================================
// SEMICOLON LIST
// ============================================================================

/// Characters dropped from every segment before it is split
const STRIPPED_CHARS: [char; 3] = ['<', '>', '"'];

/// Accumulates name fragments until an email token closes the row
#[derive(Debug, Default)]
struct RowBuilder {
    first_name: Option<String>,
    last_name: Vec<String>,
}

impl RowBuilder {
    fn push_name(&mut self, token: &str) {
        if self.first_name.is_none() {
            self.first_name = Some(token.to_string());
        } else {
            self.last_name.push(token.to_string());
        }
    }

    fn finish(self, email: &str) -> Record {
        Record {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.join(" "),
            email: email.to_string(),
        }
    }
}

/// Parse a `;`-separated list of `Name <email>` entries
///
/// Each segment is split at its last space into a name part and an email.
/// The first name token becomes the first name, the remaining ones are
/// joined into the last name. A name part that itself contains `@` means the
/// segment carries no real name. Segments with no email yield no row.
pub fn parse_semicolon_list(text: &str) -> RecordCollection {
    let mut records = Vec::new();

    for segment in text.split(';') {
        let cleaned: String = segment.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            continue;
        }

        let mut row = RowBuilder::default();
        let email = match cleaned.rsplit_once(' ') {
            Some((name, email)) if !name.contains('@') => {
                for token in name.split_whitespace() {
                    row.push_name(token);
                }
                email
            }
            Some((_, email)) => email,
            None => cleaned,
        };

        if !email.contains('@') {
            debug!(segment = cleaned, "skipping segment without an email");
            continue;
        }

        records.push(row.finish(email));
    }

    info!(rows = records.len(), "parsed semicolon list");
    records
}

// ============================================================================
// QUOTED PAIRS
// ============================================================================

fn quoted_pair_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""([^"]+)"\s*<([^>]+)>"#).expect("quoted pair pattern is valid")
    })
}

/// Extract every `"Full Name" <email>` occurrence
///
/// The full name is split at its first space: the head is the first name,
/// everything after it the last name.
pub fn parse_quoted_pairs(text: &str) -> Result<RecordCollection> {
    if text.trim().is_empty() {
        return Err(ContactError::NoInput("no text provided".to_string()));
    }

    let records: RecordCollection = quoted_pair_pattern()
        .captures_iter(text)
        .map(|caps| {
            let full_name = &caps[1];
            let email = &caps[2];
            let (first, last) = full_name.split_once(' ').unwrap_or((full_name, ""));
            Record::new(first, last, email)
        })
        .collect();

    if records.is_empty() {
        return Err(ContactError::NoMatchesFound);
    }

    info!(rows = records.len(), "parsed quoted pairs");
    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
