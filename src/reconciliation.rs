// ⚖️ Collection Reconciler - merge and subtract contact collections by email
//
// Three operations:
//   Union-dedupe         keep the first record per lowercased email
//   Asymmetric subtract  drop base rows whose email appears in the exclude table
//   Symmetric subtract   drop every row whose email appears more than once overall
//
// Table-level entry points resolve every source's email column before any
// work starts, so a missing column never yields a partial result.

use crate::error::{ContactError, Result};
use crate::record::{Record, RecordCollection};
use crate::table::{Layout, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

// ============================================================================
// RECONCILIATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub surviving_records: RecordCollection,

    /// Rows going in, across all sources
    pub initial_count: usize,

    pub removed_count: usize,

    /// Emails of removed rows; order and multiplicity depend on the operation
    pub removed_emails: Vec<String>,

    pub reconciled_at: DateTime<Utc>,
}

impl ReconciliationResult {
    fn new(
        surviving_records: RecordCollection,
        initial_count: usize,
        removed_emails: Vec<String>,
        removed_count: usize,
    ) -> Self {
        ReconciliationResult {
            surviving_records,
            initial_count,
            removed_count,
            removed_emails,
            reconciled_at: Utc::now(),
        }
    }

    pub fn remaining_count(&self) -> usize {
        self.surviving_records.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "Total rows: {}, Removed: {}, Remaining: {}",
            self.initial_count,
            self.removed_count,
            self.remaining_count()
        )
    }
}

// ============================================================================
// MATCH POLICY
// ============================================================================

/// How emails are compared by the two-table subtraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailMatch {
    #[default]
    CaseInsensitive,
    Exact,
}

impl EmailMatch {
    pub fn from_case_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            EmailMatch::Exact
        } else {
            EmailMatch::CaseInsensitive
        }
    }

    fn key(&self, email: &str) -> String {
        match self {
            EmailMatch::CaseInsensitive => email.to_lowercase(),
            EmailMatch::Exact => email.to_string(),
        }
    }
}

// ============================================================================
// RECORD-LEVEL OPERATIONS
// ============================================================================

fn lowercase_emails(records: RecordCollection) -> RecordCollection {
    records
        .into_iter()
        .map(|mut r| {
            r.email = r.email.to_lowercase();
            r
        })
        .collect()
}

/// Keep the first record per lowercased email, in input order
///
/// Surviving emails are written lowercased. `removed_emails` lists the
/// lowercased email of every dropped row, in drop order.
pub fn dedupe_records(records: RecordCollection) -> ReconciliationResult {
    dedupe_records_with(lowercase_emails(records))
}

/// Same matching as [`dedupe_records`], but surviving rows keep their cells
/// exactly as loaded
pub fn dedupe_records_raw(records: RecordCollection) -> ReconciliationResult {
    dedupe_records_with(records)
}

fn dedupe_records_with(records: RecordCollection) -> ReconciliationResult {
    let initial_count = records.len();
    let mut seen: HashSet<String> = HashSet::new();
    let mut surviving = Vec::new();
    let mut removed_emails = Vec::new();

    for record in records {
        let key = record.email_key();
        if seen.insert(key.clone()) {
            surviving.push(record);
        } else {
            debug!(email = %key, "dropping later duplicate");
            removed_emails.push(key);
        }
    }

    let removed_count = removed_emails.len();
    ReconciliationResult::new(surviving, initial_count, removed_emails, removed_count)
}

/// Drop every record whose lowercased email occurs more than once
///
/// All copies go, not just the later ones. `removed_emails` holds each
/// duplicated email once, in order of first appearance.
pub fn remove_all_duplicates(records: RecordCollection) -> ReconciliationResult {
    let initial_count = records.len();
    let records = lowercase_emails(records);

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for record in &records {
        *occurrences.entry(record.email.as_str()).or_insert(0) += 1;
    }

    let mut removed_emails: Vec<String> = Vec::new();
    let mut reported: HashSet<&str> = HashSet::new();
    let mut surviving = Vec::new();
    let mut removed_count = 0;

    for record in &records {
        let email = record.email.as_str();
        if occurrences[email] > 1 {
            removed_count += 1;
            if reported.insert(email) {
                removed_emails.push(email.to_string());
            }
        } else {
            surviving.push(record.clone());
        }
    }

    ReconciliationResult::new(surviving, initial_count, removed_emails, removed_count)
}

/// Drop base records whose email appears anywhere in `exclude`
///
/// Surviving rows are returned unchanged, in their original order.
pub fn subtract_records(
    base: RecordCollection,
    exclude: &[Record],
    policy: EmailMatch,
) -> ReconciliationResult {
    let initial_count = base.len();
    let excluded: HashSet<String> = exclude.iter().map(|r| policy.key(&r.email)).collect();

    let (removed, surviving): (Vec<Record>, Vec<Record>) = base
        .into_iter()
        .partition(|r| excluded.contains(&policy.key(&r.email)));

    let removed_emails: Vec<String> = removed.into_iter().map(|r| r.email).collect();
    let removed_count = removed_emails.len();
    ReconciliationResult::new(surviving, initial_count, removed_emails, removed_count)
}

// ============================================================================
// TABLE-LEVEL OPERATIONS
// ============================================================================

/// Concatenate the records of every table, failing before any work if one
/// of them has no email column
fn concat_records(tables: &[Table]) -> Result<RecordCollection> {
    if tables.is_empty() {
        return Err(ContactError::NoInput("no files selected".to_string()));
    }

    let per_table = tables
        .iter()
        .map(Table::records)
        .collect::<Result<Vec<_>>>()?;

    Ok(per_table.into_iter().flatten().collect())
}

/// Union-dedupe several tables (first occurrence wins)
///
/// When every source is header-less the surviving rows are written back
/// unchanged; any named source switches the output to lowercased emails.
pub fn dedupe_union(tables: &[Table]) -> Result<ReconciliationResult> {
    let records = concat_records(tables)?;
    let all_positional = tables.iter().all(|t| t.layout == Layout::Positional);
    let result = if all_positional {
        dedupe_records_raw(records)
    } else {
        dedupe_records(records)
    };

    info!(
        sources = tables.len(),
        total = result.initial_count,
        removed = result.removed_count,
        "union dedupe complete"
    );
    Ok(result)
}

/// Remove every row whose email is duplicated anywhere across the tables
pub fn subtract_symmetric(tables: &[Table]) -> Result<ReconciliationResult> {
    let records = concat_records(tables)?;
    let result = remove_all_duplicates(records);

    info!(
        sources = tables.len(),
        total = result.initial_count,
        removed = result.removed_count,
        distinct_emails = result.removed_emails.len(),
        "symmetric subtraction complete"
    );
    Ok(result)
}

/// Subtract `exclude` from `base` with case-insensitive email matching
pub fn subtract_asymmetric(base: &Table, exclude: &Table) -> Result<ReconciliationResult> {
    subtract_asymmetric_with(base, exclude, EmailMatch::default())
}

pub fn subtract_asymmetric_with(
    base: &Table,
    exclude: &Table,
    policy: EmailMatch,
) -> Result<ReconciliationResult> {
    let base_records = base.records()?;
    let exclude_records = exclude.records()?;
    let result = subtract_records(base_records, &exclude_records, policy);

    info!(
        base = %base.source,
        exclude = %exclude.source,
        ?policy,
        initial = result.initial_count,
        remaining = result.remaining_count(),
        "asymmetric subtraction complete"
    );
    Ok(result)
}

// ============================================================================
// TESTS
// ============================================================================
