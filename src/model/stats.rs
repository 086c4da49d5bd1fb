use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Percentiles
// ---------------------------------------------------------------------------

/// Duration percentiles for one cycle/category, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Percentiles {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
}

// ---------------------------------------------------------------------------
// AggregatedStat
// ---------------------------------------------------------------------------

/// One aggregated statistic record for a category within one cycle.
///
/// Raw counters and durations are produced by the external statistics
/// engine; [`AggregatedStat::finalize`] derives throughput and error
/// percentage from them before rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AggregatedStat {
    /// Concurrent users driving load during the owning cycle.
    pub cvus: u64,
    pub count: u64,
    pub success: u64,
    pub error: u64,
    /// Minimum response time in seconds.
    pub min: f64,
    /// Average response time in seconds.
    pub avg: f64,
    /// Maximum response time in seconds.
    pub max: f64,
    /// Cycle wall-clock duration in seconds; throughput denominator.
    pub duration: f64,
    /// Peak per-second throughput observed within the cycle.
    #[serde(default)]
    pub rate_max: f64,
    /// Throughput over the cycle duration; derived by `finalize` (all
    /// samples) or `finalize_successful` (successful samples only).
    #[serde(default)]
    pub rate: f64,
    /// Percentage of errored samples; derived by `finalize`.
    #[serde(default)]
    pub error_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<Percentiles>,
}

impl AggregatedStat {
    /// Derive `rate` and `error_percent` from the raw counters, counting
    /// every sample. This is the RPS definition: requests per second,
    /// successful or not.
    ///
    /// The derivation is a pure function of the raw fields, so calling this
    /// any number of times yields the same result. A zero-duration cycle is
    /// the statistics engine's defect; the division is performed as-is.
    pub fn finalize(&mut self) {
        self.derive(self.count);
    }

    /// Derive `rate` from successful samples only. STPS and SPPS count
    /// successful tests and pages per second.
    pub fn finalize_successful(&mut self) {
        self.derive(self.success);
    }

    fn derive(&mut self, samples: u64) {
        self.rate = samples as f64 / self.duration;
        self.error_percent = if self.count > 0 {
            self.error as f64 * 100.0 / self.count as f64
        } else {
            0.0
        };
    }
}

// ---------------------------------------------------------------------------
// TestStat
// ---------------------------------------------------------------------------

/// The `test` category record: aggregate plus static test composition.
///
/// `stat.rate` is STPS once derived through `finalize_successful`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TestStat {
    pub stat: AggregatedStat,
    pub pages: u64,
    pub redirects: u64,
    pub links: u64,
    pub images: u64,
    pub xmlrpc: u64,
}

// ---------------------------------------------------------------------------
// StepStat
// ---------------------------------------------------------------------------

/// The `response_step` record: aggregate plus the identity of the request
/// it measures, referenced across all cycles for per-step comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StepStat {
    /// Owning page index within the test script.
    pub step: u32,
    /// Request sequence number within the page.
    pub number: u32,
    pub request_type: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub stat: AggregatedStat,
}

impl StepStat {
    /// Human label for the step: its description, or the URL when none.
    pub fn label(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => &self.url,
        }
    }
}

// ---------------------------------------------------------------------------
// CycleStats / BenchStats
// ---------------------------------------------------------------------------

/// Per-cycle statistics, one slot per category.
///
/// The category set is closed; an absent slot means no sample of that
/// category finished during the cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CycleStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TestStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<AggregatedStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AggregatedStat>,
    /// Keyed by step identifier (e.g. `"001.003"`); keys sort ascending.
    #[serde(default)]
    pub response_step: BTreeMap<String, StepStat>,
}

/// All cycles of a bench run, keyed by cycle index.
///
/// Cycle indices ascend with the concurrent-user count; every rendered
/// table iterates them in ascending order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchStats(pub BTreeMap<u32, CycleStats>);

impl BenchStats {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cycle indices in ascending order.
    pub fn cycles(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
