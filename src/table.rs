// 📂 Table I/O - load CSV sources, write CSV results
// Two layouts: header-less positional (columns 0,1,2) and header-named (mandatory Email).

use crate::error::{ContactError, Result};
use crate::record::{Record, RecordCollection, EMAIL, FIRST_NAME, HEADERS, LAST_NAME};
use std::fs::Permissions;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// LAYOUT
// ============================================================================

/// How the columns of a source file are identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// No header row; first, last and email at columns 0, 1, 2
    Positional,

    /// Header row naming the columns; `Email` is required
    Named,
}

/// Column index that holds the email in positional files
pub const POSITIONAL_EMAIL_COLUMN: usize = 2;

// ============================================================================
// TABLE
// ============================================================================

/// A loaded CSV source, cells kept verbatim
#[derive(Debug, Clone)]
pub struct Table {
    /// Where the table came from (file path or a caller-supplied label)
    pub source: String,
    pub layout: Layout,
    /// Header row; empty for positional tables
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV from any reader
    pub fn from_reader<R: Read>(reader: R, layout: Layout, source: &str) -> Result<Table> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(layout == Layout::Named)
            .flexible(true)
            .from_reader(reader);

        let headers = match layout {
            Layout::Named => rdr
                .headers()
                .map_err(|e| ContactError::file_read(source, e))?
                .iter()
                .map(str::to_string)
                .collect(),
            Layout::Positional => Vec::new(),
        };

        let mut rows = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| ContactError::file_read(source, e))?;
            rows.push(row.iter().map(str::to_string).collect());
        }

        Ok(Table {
            source: source.to_string(),
            layout,
            headers,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if the header row has it
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Convert rows into records
    ///
    /// Fails with `MissingColumn` when the email column cannot be located.
    /// Name columns are optional; absent ones produce empty names.
    pub fn records(&self) -> Result<RecordCollection> {
        let (first_idx, last_idx, email_idx) = match self.layout {
            Layout::Named => {
                let email_idx = self
                    .column_index(EMAIL)
                    .ok_or_else(|| ContactError::missing_column(&self.source, EMAIL))?;
                (
                    self.column_index(FIRST_NAME),
                    self.column_index(LAST_NAME),
                    email_idx,
                )
            }
            Layout::Positional => {
                let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
                if !self.rows.is_empty() && width <= POSITIONAL_EMAIL_COLUMN {
                    return Err(ContactError::missing_column(
                        &self.source,
                        POSITIONAL_EMAIL_COLUMN.to_string(),
                    ));
                }
                (Some(0), Some(1), POSITIONAL_EMAIL_COLUMN)
            }
        };

        let cell = |row: &[String], idx: Option<usize>| -> String {
            idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
        };

        Ok(self
            .rows
            .iter()
            .map(|row| Record {
                first_name: cell(row, first_idx),
                last_name: cell(row, last_idx),
                email: cell(row, Some(email_idx)),
            })
            .collect())
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Load a whole CSV file into memory
pub fn load_table(path: &Path, layout: Layout) -> Result<Table> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| ContactError::file_read(&source, e))?;
    let table = Table::from_reader(file, layout, &source)?;

    info!(source = %source, rows = table.len(), ?layout, "loaded table");
    Ok(table)
}

/// Load several files, failing on the first unreadable one
pub fn load_tables(paths: &[impl AsRef<Path>], layout: Layout) -> Result<Vec<Table>> {
    if paths.is_empty() {
        return Err(ContactError::NoInput("no files selected".to_string()));
    }
    paths
        .iter()
        .map(|p| load_table(p.as_ref(), layout))
        .collect()
}

/// Read pasted-text content from a file
pub fn load_raw_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ContactError::file_read(path.display().to_string(), e))
}

// ============================================================================
// WRITING
// ============================================================================

/// Serialize records as CSV into any writer
pub fn write_records_to<W: Write>(records: &[Record], writer: W, with_header: bool) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    if with_header {
        wtr.write_record(HEADERS)?;
    }
    for record in records {
        wtr.write_record(record.as_row())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Mode for newly created output files; the temp file itself starts owner-only
#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

/// Write records to `path`
///
/// Output goes to a temporary file in the destination directory and is
/// renamed into place only after every row was written, so a failure never
/// leaves a partial file behind. An overwritten file keeps its permissions.
pub fn write_records(records: &[Record], path: &Path, with_header: bool) -> Result<()> {
    let target = path.display().to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ContactError::write(&target, e))?;
    write_records_to(records, &mut tmp, with_header).map_err(|e| ContactError::write(&target, e))?;

    let permissions = match std::fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| ContactError::write(&target, e))?;
    }
    tmp.persist(path)
        .map_err(|e| ContactError::write(&target, e.error))?;

    debug!(path = %target, with_header, "persisted output file");
    info!(path = %target, rows = records.len(), "wrote records");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
