use clap::Parser;
use std::path::PathBuf;

/// Load users and call logs, then write per-user call analytics and an
/// ordered call export.
#[derive(Parser, Debug, Clone)]
#[command(name = "call_report", version)]
pub struct Settings {
    /// Users CSV (header `firstName,lastName`)
    #[arg(long, default_value = "resources/users.csv")]
    pub users: PathBuf,

    /// Call logs CSV (`phoneNumber,startTime,endTime,direction,userId`)
    #[arg(long, default_value = "resources/callLogs.csv")]
    pub call_logs: PathBuf,

    /// Destination for the per-user analytics report
    #[arg(long, default_value = "resources/userAnalytics.csv")]
    pub analytics_out: PathBuf,

    /// Destination for the ordered call export
    #[arg(long, default_value = "resources/orderedCalls.csv")]
    pub ordered_out: PathBuf,

    /// Also write a JSON summary of the run
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Print the users and callLogs tables after loading
    #[arg(long)]
    pub dump: bool,

    /// Report rows previewed on the console (0 disables)
    #[arg(long, default_value_t = 2)]
    pub preview_rows: usize,

    /// Logging level
    #[arg(long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_resource_layout() {
        let settings = Settings::try_parse_from(["call_report"]).unwrap();
        assert_eq!(settings.users, PathBuf::from("resources/users.csv"));
        assert_eq!(settings.call_logs, PathBuf::from("resources/callLogs.csv"));
        assert_eq!(settings.analytics_out, PathBuf::from("resources/userAnalytics.csv"));
        assert_eq!(settings.ordered_out, PathBuf::from("resources/orderedCalls.csv"));
        assert!(settings.summary.is_none());
        assert!(!settings.dump);
        assert_eq!(settings.preview_rows, 2);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::try_parse_from([
            "call_report",
            "--users",
            "/tmp/u.csv",
            "--summary",
            "/tmp/run.json",
            "--dump",
            "--preview-rows",
            "0",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(settings.users, PathBuf::from("/tmp/u.csv"));
        assert_eq!(settings.summary, Some(PathBuf::from("/tmp/run.json")));
        assert!(settings.dump);
        assert_eq!(settings.preview_rows, 0);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Settings::try_parse_from(["call_report", "--log-level", "loud"]).is_err());
    }
}
