use crate::error::Result;
use crate::output::write_csv;
use crate::storage::Storage;
use crate::types::{CallLogRow, UserAnalyticsRow, CALL_LOG_HEADER, USER_ANALYTICS_HEADER};
use std::path::Path;
use tracing::info;

/// Write `userId,avgDuration,numCalls` for every user with at least one call,
/// ordered by `userId`. Users without calls do not appear.
///
/// The query runs before the file is created, so a storage failure never
/// clobbers an existing report.
pub fn write_user_analytics(
    storage: &Storage,
    path: impl AsRef<Path>,
) -> Result<Vec<UserAnalyticsRow>> {
    let path = path.as_ref();
    let rows = storage.user_analytics()?;
    write_csv(path, &USER_ANALYTICS_HEADER, &rows)?;
    info!("User analytics written to {}.", path.display());
    Ok(rows)
}

/// Write every call log ordered by `userId`, then `startTime`.
pub fn write_ordered_calls(storage: &Storage, path: impl AsRef<Path>) -> Result<Vec<CallLogRow>> {
    let path = path.as_ref();
    let rows = storage.ordered_calls()?;
    write_csv(path, &CALL_LOG_HEADER, &rows)?;
    info!("Ordered calls written to {}.", path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewCallLog;
    use tempfile::TempDir;

    fn storage_with(calls: &[(&str, i64, i64, &str, i64)]) -> Storage {
        let mut storage = Storage::open_in_memory().unwrap();
        let batch = storage.batch().unwrap();
        for (phone, start, end, direction, user) in calls {
            batch
                .insert_call_log(&NewCallLog {
                    phone_number: phone.to_string(),
                    start_time: *start,
                    end_time: *end,
                    direction: direction.to_string(),
                    user_id: *user,
                })
                .unwrap();
        }
        batch.commit().unwrap();
        storage
    }

    #[test]
    fn test_user_analytics_average_and_count() {
        let storage = storage_with(&[
            ("555-0100", 0, 100, "outbound", 1),
            ("555-0101", 0, 50, "inbound", 2),
            ("555-0102", 1000, 1110, "inbound", 1),
        ]);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("userAnalytics.csv");

        let rows = write_user_analytics(&storage, &path).unwrap();

        assert_eq!(rows.len(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "userId,avgDuration,numCalls\n1,105.0,2\n2,50.0,1\n");
    }

    #[test]
    fn test_user_analytics_with_no_calls_is_header_only() {
        let storage = Storage::open_in_memory().unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("userAnalytics.csv");

        let rows = write_user_analytics(&storage, &path).unwrap();

        assert!(rows.is_empty());
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "userId,avgDuration,numCalls\n");
    }

    #[test]
    fn test_ordered_calls_by_user_then_start_time() {
        let storage = storage_with(&[
            ("555-0100", 500, 600, "outbound", 2),
            ("555-0101", 300, 400, "inbound", 1),
            ("555-0102", 100, 200, "inbound", 1),
        ]);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orderedCalls.csv");

        write_ordered_calls(&storage, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "callId,phoneNumber,startTime,endTime,direction,userId\n\
             3,555-0102,100,200,inbound,1\n\
             2,555-0101,300,400,inbound,1\n\
             1,555-0100,500,600,outbound,2\n"
        );
    }

    #[test]
    fn test_query_failure_keeps_existing_reports() {
        let storage = storage_with(&[("555-0100", 0, 60, "inbound", 1)]);
        storage.drop_call_logs().unwrap();
        let dir = TempDir::new().unwrap();
        let ordered = dir.path().join("orderedCalls.csv");
        let analytics = dir.path().join("userAnalytics.csv");
        std::fs::write(&ordered, "old\n").unwrap();
        std::fs::write(&analytics, "old\n").unwrap();

        assert!(write_ordered_calls(&storage, &ordered).is_err());
        assert!(write_user_analytics(&storage, &analytics).is_err());

        assert_eq!(std::fs::read_to_string(&ordered).unwrap(), "old\n");
        assert_eq!(std::fs::read_to_string(&analytics).unwrap(), "old\n");
    }

    #[test]
    fn test_ordered_calls_quote_fields_with_commas() {
        let storage = storage_with(&[("555,0100", 1, 2, "out, then in", 1)]);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orderedCalls.csv");

        write_ordered_calls(&storage, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("1,\"555,0100\",1,2,\"out, then in\",1\n"));
    }
}
