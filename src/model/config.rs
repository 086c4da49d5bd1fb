use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// BenchConfig
// ---------------------------------------------------------------------------

/// Bench metadata captured by the surrounding tool when the run was
/// launched. All values are carried as strings, exactly as recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct BenchConfig {
    /// Launch timestamp, ISO-8601-like (`2026-08-30T14:02:11.123`).
    pub time: String,
    pub class_description: String,
    pub class: String,
    pub method: String,
    pub description: String,
    pub module: String,
    pub server_url: String,
    /// Cycle definition list, e.g. `[10, 20, 50]`.
    pub cycles: String,
    /// Cycle duration in seconds.
    pub duration: String,
    pub sleep_time_min: String,
    pub sleep_time_max: String,
    pub sleep_time: String,
    pub startup_delay: String,
    /// Version of the tool that produced the statistics.
    pub version: String,
    /// Descriptions for monitored hosts, addressable by host identifier.
    #[serde(default)]
    pub host_descriptions: BTreeMap<String, String>,
}

impl BenchConfig {
    /// Launch date formatted as `YYYY-MM-DD HH:MM:SS`.
    ///
    /// Falls back to the raw timestamp (seconds precision, `T` replaced by
    /// a space) when the value does not parse.
    pub fn launch_date(&self) -> String {
        let head: String = self.time.chars().take(19).collect();
        match NaiveDateTime::parse_from_str(&head, "%Y-%m-%dT%H:%M:%S") {
            Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Err(_) => head.replace('T', " "),
        }
    }

    /// Description recorded for a monitored host, empty when unknown.
    pub fn host_description(&self, host: &str) -> &str {
        self.host_descriptions
            .get(host)
            .map(String::as_str)
            .unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// MonitorData
// ---------------------------------------------------------------------------

/// Monitored hosts: host identifier to descriptive label. An empty map
/// disables the monitored-hosts section.
pub type MonitorData = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// RenderOptions
// ---------------------------------------------------------------------------

/// Rendering flags, threaded explicitly through renderer construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RenderOptions {
    /// Append P10/MED/P90/P95 columns to the duration tables.
    #[serde(default)]
    pub with_percentiles: bool,
    /// Embed chart image references (the surrounding tool generates the
    /// images when building an HTML report).
    #[serde(default)]
    pub html: bool,
    /// Number of entries in the slowest-requests ranking.
    #[serde(default = "default_slowest_items")]
    pub slowest_items: usize,
}

fn default_slowest_items() -> usize {
    5
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            with_percentiles: false,
            html: false,
            slowest_items: default_slowest_items(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
