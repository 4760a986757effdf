//! Output generation for the collected bundle.
//!
//! # Submodules
//!
//! - [`markdown`]: renders the briefing report
//! - [`json`]: dumps the raw bundle for other tools
//!
//! # Output Structure
//!
//! ```text
//! reports/daily_briefings/
//! ├── Morning_Report_2026-10-17.md       # daily run
//! ├── Weekly_Report_7Days_2026-10-17.md  # run --days 7
//! └── Morning_Report_TEST.md             # run --test
//! ```

pub mod json;
pub mod markdown;

/// Directory the report lands in when `--output` is not given.
pub const DEFAULT_REPORT_DIR: &str = "reports/daily_briefings";

/// File name of a run's report.
pub fn report_file_name(date: &str, days: u32, test: bool) -> String {
    if test {
        "Morning_Report_TEST.md".to_string()
    } else if days > 1 {
        format!("Weekly_Report_{days}Days_{date}.md")
    } else {
        format!("Morning_Report_{date}.md")
    }
}
