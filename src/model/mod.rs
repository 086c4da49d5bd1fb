pub mod config;
pub mod errors;
pub mod stats;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

pub use config::{BenchConfig, MonitorData, RenderOptions};
pub use errors::{BenchErrors, ErrorKind, ErrorRecord, ExceptionInfo};
pub use stats::{AggregatedStat, BenchStats, CycleStats, Percentiles, StepStat, TestStat};

// ---------------------------------------------------------------------------
// BenchData
// ---------------------------------------------------------------------------

/// The complete renderer input: configuration, per-cycle statistics, error
/// records and monitored-host labels, as produced by the statistics engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BenchData {
    pub config: BenchConfig,
    #[serde(default)]
    pub stats: BenchStats,
    #[serde(default)]
    pub errors: BenchErrors,
    #[serde(default)]
    pub monitor: MonitorData,
}

impl BenchData {
    /// Deserialize a bench-data dump produced by the statistics engine.
    pub fn from_json(content: &str) -> Result<Self, ReportError> {
        let data: BenchData = serde_json::from_str(content)?;
        Ok(data)
    }

    /// Serialize as pretty-printed JSON for human readability.
    pub fn to_json(&self) -> Result<String, ReportError> {
        let content = serde_json::to_string_pretty(self)?;
        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_data() -> BenchData {
        let mut data = BenchData::default();
        data.config.class = "Simple".to_string();
        data.config.method = "test_simple".to_string();
        let mut cycle = CycleStats::default();
        cycle.page = Some(AggregatedStat {
            cvus: 10,
            count: 200,
            success: 198,
            error: 2,
            min: 0.012,
            avg: 0.094,
            max: 0.894,
            duration: 60.0,
            rate_max: 5.1,
            ..Default::default()
        });
        data.stats.0.insert(0, cycle);
        data
    }

    #[test]
    fn json_round_trip_preserves_stats() {
        let data = make_data();
        let json = data.to_json().expect("to_json should succeed");
        let back = BenchData::from_json(&json).expect("from_json should succeed");
        assert_eq!(back.config.class, "Simple");
        let page = back.stats.0[&0].page.as_ref().expect("page stat");
        assert_eq!(page.count, 200);
        assert_eq!(page.error, 2);
        assert!((page.rate_max - 5.1).abs() < 1e-9);
    }

    #[test]
    fn from_json_rejects_invalid_document() {
        let err = BenchData::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn from_json_fills_missing_sections_with_defaults() {
        let data = BenchData::from_json("{\"config\": {\"class\": \"Simple\"}}")
            .expect("from_json should succeed");
        assert_eq!(data.config.class, "Simple");
        assert!(data.stats.is_empty());
        assert!(data.errors.is_empty());
        assert!(data.monitor.is_empty());
    }
}
