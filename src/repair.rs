// 🧹 Record Repairer - clean fields, recover names, reject unusable rows
//
// Per row, in order:
//   1. trim + strip non-letters + title-case the names; trim + lowercase the email
//   2. no email            → delete
//   3. missing/placeholder/email-like first name → recover names from the email local part
//   4. still missing a name → delete
//   5. otherwise keep the cleaned row
//
// Rows are never removed in place: the pass builds a new collection.

use crate::config::RepairConfig;
use crate::record::{Record, RecordCollection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// REPAIR REPORT
// ============================================================================

/// Counters for one repair run; they only ever grow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    pub non_alpha_removed: usize,
    pub spaces_removed: usize,
    pub entries_deleted: usize,
    pub names_filled: usize,
    /// Rows whose first name called for email recovery but none could be found
    pub flagged_for_review: usize,
}

impl RepairReport {
    /// Labelled counters in display order
    pub fn entries(&self) -> [(&'static str, usize); 5] {
        [
            ("Non-Alphabetic Characters Removed", self.non_alpha_removed),
            ("Spaces Removed", self.spaces_removed),
            ("Entries Deleted", self.entries_deleted),
            ("Names Filled", self.names_filled),
            ("Flagged for Manual Review", self.flagged_for_review),
        ]
    }

    pub fn summary(&self) -> String {
        self.entries()
            .iter()
            .map(|(label, count)| format!("{}: {}", label, count))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_clean(&self) -> bool {
        *self == RepairReport::default()
    }
}

// ============================================================================
// FIELD HELPERS
// ============================================================================

/// Lowercase everything, then capitalize the first letter of every word
///
/// A word starts at any letter not preceded by another letter, so
/// `"mary-jane o neil"` becomes `"Mary-Jane O Neil"`.
pub fn normalize_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;

    for c in value.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }

    out
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '-'
}

// ============================================================================
// RECORD REPAIRER
// ============================================================================

pub struct RecordRepairer {
    config: RepairConfig,
    report: RepairReport,
}

impl Default for RecordRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordRepairer {
    pub fn new() -> Self {
        Self::with_config(RepairConfig::default())
    }

    pub fn with_config(config: RepairConfig) -> Self {
        RecordRepairer {
            config,
            report: RepairReport::default(),
        }
    }

    pub fn report(&self) -> &RepairReport {
        &self.report
    }

    /// Keep ASCII letters and hyphens only
    pub fn strip_non_alphabetic(&mut self, value: &str) -> String {
        let kept: String = value.chars().filter(|&c| is_name_char(c)).collect();
        self.report.non_alpha_removed += value.chars().count() - kept.chars().count();
        kept
    }

    /// Trim surrounding whitespace
    pub fn strip_spaces(&mut self, value: &str) -> String {
        let trimmed = value.trim();
        self.report.spaces_removed += value.chars().count() - trimmed.chars().count();
        trimmed.to_string()
    }

    /// Derive (first, last) from the email local part, split at the first `.`
    pub fn extract_names_from_email(&mut self, email: &str) -> (String, String) {
        let local = email.split('@').next().unwrap_or_default();
        let (first, last) = local.split_once('.').unwrap_or((local, ""));

        let first = self.strip_spaces(first);
        let first = self.strip_non_alphabetic(&first);
        let last = self.strip_spaces(last);
        let last = self.strip_non_alphabetic(&last);

        (first, last)
    }

    fn clean_name(&mut self, value: &str) -> String {
        let trimmed = self.strip_spaces(value);
        normalize_case(&self.strip_non_alphabetic(&trimmed))
    }

    fn needs_recovery(&self, raw_first: &str, cleaned_first: &str) -> bool {
        cleaned_first.is_empty() || self.config.is_placeholder(raw_first) || raw_first.contains('@')
    }

    /// Repair one row; `None` means the row is deleted
    pub fn repair_record(&mut self, record: &Record) -> Option<Record> {
        // Step 1
        let mut first_name = self.clean_name(&record.first_name);
        let mut last_name = self.clean_name(&record.last_name);
        let email = self.strip_spaces(&record.email).to_lowercase();

        // Step 2
        if email.is_empty() {
            debug!(?record, "deleting row without email");
            self.report.entries_deleted += 1;
            return None;
        }

        // Step 3
        if self.needs_recovery(&record.first_name, &first_name) {
            let (recovered_first, recovered_last) = self.extract_names_from_email(&email);

            if recovered_first.is_empty() {
                debug!(email = %email, "no name recoverable from email");
                self.report.flagged_for_review += 1;
                first_name.clear();
            } else {
                first_name = normalize_case(&recovered_first);
                if !recovered_last.is_empty() {
                    last_name = normalize_case(&recovered_last);
                } else if !self.config.keep_last_name_on_partial_recovery {
                    last_name.clear();
                }
                debug!(email = %email, first = %first_name, last = %last_name, "filled names from email");
                self.report.names_filled += 1;
            }
        }

        // Step 4
        if first_name.is_empty() || last_name.is_empty() {
            debug!(email = %email, "deleting row with incomplete name");
            self.report.entries_deleted += 1;
            return None;
        }

        // Step 5
        Some(Record {
            first_name,
            last_name,
            email,
        })
    }

    /// Run the whole pass and hand back the surviving rows with the report
    pub fn repair(mut self, records: &[Record]) -> (RecordCollection, RepairReport) {
        // Rows with no email cell at all go before any field is touched
        let present: Vec<&Record> = records.iter().filter(|r| r.has_email()).collect();
        self.report.entries_deleted += records.len() - present.len();

        let repaired: RecordCollection = present
            .into_iter()
            .filter_map(|record| self.repair_record(record))
            .collect();

        info!(
            input = records.len(),
            kept = repaired.len(),
            deleted = self.report.entries_deleted,
            names_filled = self.report.names_filled,
            "repair pass complete"
        );

        (repaired, self.report)
    }
}

/// Repair with the default policy
pub fn repair(records: &[Record]) -> (RecordCollection, RepairReport) {
    RecordRepairer::new().repair(records)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(first: &str, last: &str, email: &str) -> Record {
        Record::new(first, last, email)
    }

    #[test]
    fn test_strip_non_alphabetic_counts_removed() {
        let mut repairer = RecordRepairer::new();

        assert_eq!(repairer.strip_non_alphabetic("O'Brien-Smith 3rd"), "OBrien-Smithrd");
        assert_eq!(repairer.report().non_alpha_removed, 3);
    }

    #[test]
    fn test_strip_spaces_counts_removed() {
        let mut repairer = RecordRepairer::new();

        assert_eq!(repairer.strip_spaces("  Ada \t"), "Ada");
        assert_eq!(repairer.report().spaces_removed, 4);
    }

    #[test]
    fn test_normalize_case() {
        assert_eq!(normalize_case("jOHN"), "John");
        assert_eq!(normalize_case("mary ann"), "Mary Ann");
        assert_eq!(normalize_case("mary-jane"), "Mary-Jane");
        assert_eq!(normalize_case(""), "");
    }

    #[test]
    fn test_extract_names_from_email() {
        let mut repairer = RecordRepairer::new();

        assert_eq!(
            repairer.extract_names_from_email("john.doe@x.com"),
            ("john".to_string(), "doe".to_string())
        );
        assert_eq!(
            repairer.extract_names_from_email("johndoe@x.com"),
            ("johndoe".to_string(), String::new())
        );
        // Split at the first dot only; the rest loses its dots
        assert_eq!(
            repairer.extract_names_from_email("anne.marie.lee42@x.com"),
            ("anne".to_string(), "marielee".to_string())
        );
        assert_eq!(repairer.report().non_alpha_removed, 3);
    }

    #[test]
    fn test_repair_cleans_fields() {
        let records = vec![create_test_record("  jOHN3 ", "o'neil", "  John.ONeil@X.com ")];
        let (repaired, report) = repair(&records);

        assert_eq!(repaired, vec![create_test_record("John", "Oneil", "john.oneil@x.com")]);
        assert_eq!(report.non_alpha_removed, 2);
        assert_eq!(report.spaces_removed, 6);
        assert_eq!(report.entries_deleted, 0);
        assert_eq!(report.names_filled, 0);
    }

    #[test]
    fn test_repair_fills_names_from_email() {
        let records = vec![create_test_record("", "", "john.doe@x.com")];
        let (repaired, report) = repair(&records);

        assert_eq!(repaired, vec![create_test_record("John", "Doe", "john.doe@x.com")]);
        assert_eq!(report.names_filled, 1);
    }

    #[test]
    fn test_repair_rejects_when_last_name_unrecoverable() {
        let records = vec![create_test_record("", "", "johndoe@x.com")];
        let (repaired, report) = repair(&records);

        assert!(repaired.is_empty());
        assert_eq!(report.names_filled, 1);
        assert_eq!(report.entries_deleted, 1);
    }

    #[test]
    fn test_placeholder_routed_through_email() {
        let records = vec![create_test_record("Legal Name", "Smith", "jane.roe@x.com")];
        let (repaired, report) = repair(&records);

        assert_eq!(repaired, vec![create_test_record("Jane", "Roe", "jane.roe@x.com")]);
        assert_eq!(report.names_filled, 1);

        let records = vec![create_test_record("LEGAL NAME", "Smith", "janeroe@x.com")];
        let (repaired, _) = repair(&records);

        // Existing last name kept when the email only yields a first name
        assert_eq!(repaired, vec![create_test_record("Janeroe", "Smith", "janeroe@x.com")]);
    }

    #[test]
    fn test_partial_recovery_can_clear_last_name() {
        let config = RepairConfig {
            keep_last_name_on_partial_recovery: false,
            ..RepairConfig::default()
        };
        let records = vec![create_test_record("Legal Name", "Smith", "janeroe@x.com")];
        let (repaired, report) = RecordRepairer::with_config(config).repair(&records);

        assert!(repaired.is_empty());
        assert_eq!(report.entries_deleted, 1);
    }

    #[test]
    fn test_email_in_first_name_triggers_recovery() {
        let records = vec![create_test_record("ann.lee@x.com", "", "ann.lee@x.com")];
        let (repaired, report) = repair(&records);

        assert_eq!(repaired, vec![create_test_record("Ann", "Lee", "ann.lee@x.com")]);
        assert_eq!(report.names_filled, 1);
    }

    #[test]
    fn test_unrecoverable_name_is_flagged_and_deleted() {
        let records = vec![create_test_record("Legal Name", "Smith", "12345@x.com")];
        let (repaired, report) = repair(&records);

        assert!(repaired.is_empty());
        assert_eq!(report.flagged_for_review, 1);
        assert_eq!(report.entries_deleted, 1);
        assert_eq!(report.names_filled, 0);
    }

    #[test]
    fn test_missing_and_blank_emails_deleted() {
        let records = vec![
            create_test_record("Ada", "Lovelace", ""),
            create_test_record("Alan", "Turing", "   "),
            create_test_record("Grace", "Hopper", "grace@x.com"),
        ];
        let (repaired, report) = repair(&records);

        assert_eq!(repaired.len(), 1);
        assert_eq!(repaired[0].first_name, "Grace");
        assert_eq!(report.entries_deleted, 2);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let records = vec![
            create_test_record(" jOHN ", "DOE!", "John.Doe@X.com"),
            create_test_record("Legal Name", "", "mary-jane.watson@y.com"),
            create_test_record("", "", "nodots@z.com"),
            create_test_record("Ada", "Lovelace", ""),
        ];
        let (first_pass, first_report) = repair(&records);
        assert!(!first_report.is_clean());

        let (second_pass, second_report) = repair(&first_pass);

        assert_eq!(second_pass, first_pass);
        assert!(second_report.is_clean(), "{}", second_report.summary());
    }

    #[test]
    fn test_report_summary_labels() {
        let report = RepairReport {
            entries_deleted: 2,
            ..RepairReport::default()
        };
        let summary = report.summary();

        println!("{}", summary);

        assert!(summary.contains("Entries Deleted: 2"));
        assert!(summary.contains("Flagged for Manual Review: 0"));
        assert_eq!(report.entries().len(), 5);
    }
}
