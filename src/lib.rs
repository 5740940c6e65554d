// Contact Merge - Core Library
// Parses, repairs, merges and subtracts contact lists (First Name, Last Name, Email)

pub mod config;
pub mod error;
pub mod parser;
pub mod reconciliation;
pub mod record;
pub mod repair;
pub mod table;

// Re-export commonly used types
pub use config::{PipelineConfig, RepairConfig, SubtractConfig};
pub use error::{ContactError, Result};
pub use parser::{parse_quoted_pairs, parse_semicolon_list};
pub use reconciliation::{
    dedupe_records, dedupe_records_raw, dedupe_union, remove_all_duplicates, subtract_asymmetric,
    subtract_asymmetric_with, subtract_records, subtract_symmetric, EmailMatch,
    ReconciliationResult,
};
pub use record::{Record, RecordCollection, HEADERS};
pub use repair::{normalize_case, repair, RecordRepairer, RepairReport};
pub use table::{
    load_raw_text, load_table, load_tables, write_records, write_records_to, Layout, Table,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
