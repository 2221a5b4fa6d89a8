use crate::error::{ReportError, Result};
use crate::storage::Storage;
use crate::types::{LoadReport, NewCallLog, User, USER_HEADER};
use crate::util::{format_int, parse_int_field};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::num::ParseIntError;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

const CALL_LOG_COLUMNS: usize = 5;

/// Why a single row was left out of the load.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowRejection {
    #[error("incorrect column count: expected {expected}, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("empty {0}")]
    EmptyField(&'static str),

    #[error("invalid {field}: {source}")]
    InvalidInteger {
        field: &'static str,
        #[source]
        source: ParseIntError,
    },
}

/// Load `users.csv` into the `users` table.
///
/// The header must be exactly `firstName,lastName`; otherwise the file is
/// rejected before the table is touched. A valid header clears the table and
/// every clean row is inserted with the next id, starting at 1. Rows with the
/// wrong column count or an empty name are skipped.
///
/// All changes go through one batch: an I/O or decode error part way through
/// leaves the table exactly as it was before the call.
pub fn load_and_clean_users(storage: &mut Storage, path: impl AsRef<Path>) -> Result<LoadReport> {
    let path = path.as_ref();
    let mut rdr = open_reader(path)?;
    let bom = starts_with_bom(path)?;
    let mut records = rdr.records();

    let header = match records.next() {
        Some(header) => header?,
        None => return Err(ReportError::MissingHeader(path.to_path_buf())),
    };
    debug!("Users header: {:?}", header);
    if bom || !header.iter().eq(USER_HEADER) {
        let mut found: Vec<String> = header.iter().map(str::to_string).collect();
        // The csv reader drops a leading BOM; put it back so the mismatch
        // shows what was actually in the file.
        if let (true, Some(first)) = (bom, found.first_mut()) {
            first.insert(0, '\u{feff}');
        }
        return Err(ReportError::HeaderMismatch {
            expected: USER_HEADER.iter().map(|s| s.to_string()).collect(),
            found,
        });
    }

    let batch = storage.batch()?;
    let cleared = batch.clear_users()?;
    debug!("Cleared {} existing users", cleared);

    let mut report = LoadReport::default();
    let mut next_id = 1i64;
    for result in records {
        let record = result?;
        match clean_user_row(&record, next_id) {
            Ok(user) => {
                batch.insert_user(&user)?;
                next_id += 1;
                report.inserted += 1;
            }
            Err(reason) => {
                warn!("Skipping user row {}: {} {:?}", line_of(&record), reason, record);
                report.skipped += 1;
            }
        }
    }
    batch.commit()?;

    info!(
        "Users data loaded from {}. Inserted {} records, skipped {}.",
        path.display(),
        format_int(report.inserted),
        format_int(report.skipped)
    );
    Ok(report)
}

/// Append `callLogs.csv` to the `callLogs` table.
///
/// The first record is taken as a header and not inspected. The table is not
/// cleared, so loading the same file twice stores every call twice.
pub fn load_and_clean_call_logs(
    storage: &mut Storage,
    path: impl AsRef<Path>,
) -> Result<LoadReport> {
    let path = path.as_ref();
    let mut rdr = open_reader(path)?;
    let mut records = rdr.records();

    match records.next() {
        Some(header) => debug!("Call logs header (ignored): {:?}", header?),
        None => return Err(ReportError::MissingHeader(path.to_path_buf())),
    }

    let batch = storage.batch()?;
    let mut report = LoadReport::default();
    for result in records {
        let record = result?;
        match clean_call_log_row(&record) {
            Ok(call) => {
                let call_id = batch.insert_call_log(&call)?;
                debug!("Inserted call {} for user {}", call_id, call.user_id);
                report.inserted += 1;
            }
            Err(reason) => {
                warn!(
                    "Skipping call log row {}: {} {:?}",
                    line_of(&record),
                    reason,
                    record
                );
                report.skipped += 1;
            }
        }
    }
    batch.commit()?;

    info!(
        "Call logs loaded from {}. Inserted {} records, skipped {}.",
        path.display(),
        format_int(report.inserted),
        format_int(report.skipped)
    );
    Ok(report)
}

/// Validate one data row of the users file. Fields are trimmed before any
/// check, so a row of blanks counts as empty.
pub fn clean_user_row(
    record: &StringRecord,
    user_id: i64,
) -> std::result::Result<User, RowRejection> {
    let fields: Vec<&str> = record.iter().map(str::trim).collect();
    if fields.len() != USER_HEADER.len() {
        return Err(RowRejection::ColumnCount {
            expected: USER_HEADER.len(),
            found: fields.len(),
        });
    }
    if fields[0].is_empty() {
        return Err(RowRejection::EmptyField("firstName"));
    }
    if fields[1].is_empty() {
        return Err(RowRejection::EmptyField("lastName"));
    }
    Ok(User {
        user_id,
        first_name: fields[0].to_string(),
        last_name: fields[1].to_string(),
    })
}

/// Validate one data row of the call logs file:
/// `phoneNumber,startTime,endTime,direction,userId`.
///
/// The phone number is kept verbatim; only `direction` is trimmed.
pub fn clean_call_log_row(record: &StringRecord) -> std::result::Result<NewCallLog, RowRejection> {
    if record.len() != CALL_LOG_COLUMNS {
        return Err(RowRejection::ColumnCount {
            expected: CALL_LOG_COLUMNS,
            found: record.len(),
        });
    }
    let int_field = |idx: usize, field: &'static str| {
        parse_int_field(&record[idx]).map_err(|source| RowRejection::InvalidInteger { field, source })
    };
    let start_time = int_field(1, "startTime")?;
    let end_time = int_field(2, "endTime")?;
    let user_id = int_field(4, "userId")?;

    let phone_number = &record[0];
    let direction = record[3].trim();
    if phone_number.is_empty() {
        return Err(RowRejection::EmptyField("phoneNumber"));
    }
    if direction.is_empty() {
        return Err(RowRejection::EmptyField("direction"));
    }
    Ok(NewCallLog {
        phone_number: phone_number.to_string(),
        start_time,
        end_time,
        direction: direction.to_string(),
        user_id,
    })
}

fn open_reader(path: &Path) -> Result<Reader<File>> {
    // Headers are read by hand so the users header can be checked verbatim and
    // ragged rows reach the column-count check instead of failing the reader.
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| ReportError::FileOpen {
            path: path.to_path_buf(),
            source,
        })
}

/// The header check is byte-exact, so a UTF-8 byte order mark counts as part
/// of the first column name.
fn starts_with_bom(path: &Path) -> Result<bool> {
    let mut prefix = Vec::with_capacity(3);
    File::open(path)?.take(3).read_to_end(&mut prefix)?;
    Ok(prefix == b"\xEF\xBB\xBF")
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
