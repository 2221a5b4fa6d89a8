use serde::Serialize;
use tabled::Tabled;

/// A validated user ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// A validated call log; `callId` is assigned by storage on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCallLog {
    pub phone_number: String,
    pub start_time: i64,
    pub end_time: i64,
    pub direction: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    #[tabled(rename = "userId")]
    pub user_id: i64,
    #[tabled(rename = "firstName")]
    pub first_name: String,
    #[tabled(rename = "lastName")]
    pub last_name: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalyticsRow {
    #[tabled(rename = "userId")]
    pub user_id: i64,
    #[tabled(rename = "avgDuration")]
    pub avg_duration: f64,
    #[tabled(rename = "numCalls")]
    pub num_calls: i64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallLogRow {
    #[tabled(rename = "callId")]
    pub call_id: i64,
    #[tabled(rename = "phoneNumber")]
    pub phone_number: String,
    #[tabled(rename = "startTime")]
    pub start_time: i64,
    #[tabled(rename = "endTime")]
    pub end_time: i64,
    #[tabled(rename = "direction")]
    pub direction: String,
    #[tabled(rename = "userId")]
    pub user_id: i64,
}

pub const USER_HEADER: [&str; 2] = ["firstName", "lastName"];
pub const USER_ANALYTICS_HEADER: [&str; 3] = ["userId", "avgDuration", "numCalls"];
pub const CALL_LOG_HEADER: [&str; 6] = [
    "callId",
    "phoneNumber",
    "startTime",
    "endTime",
    "direction",
    "userId",
];

/// Outcome of one loader run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Counts for a whole run, written to `--summary` when requested.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub users_loaded: usize,
    pub users_skipped: usize,
    pub call_logs_loaded: usize,
    pub call_logs_skipped: usize,
    pub analytics_rows: usize,
    pub ordered_rows: usize,
    pub failed_steps: Vec<String>,
}
