use crate::model::AggregatedStat;

use super::{fmt_float, fmt_int, fmt_percent, FMT_DECO};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Statistic category of a rendered table. The set is closed; each variant
/// carries its own column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Test,
    Page,
    Response,
    ResponseStep,
}

impl Category {
    /// Key used in placeholder sentences and data dumps.
    pub fn key(self) -> &'static str {
        match self {
            Category::Test => "test",
            Category::Page => "page",
            Category::Response => "response",
            Category::ResponseStep => "response_step",
        }
    }

    fn headers(self) -> &'static [&'static str] {
        match self {
            Category::Test => &["CUs", "STPS", "TOTAL", "SUCCESS", "ERROR"],
            Category::Page => &[
                "CUs", "SPPS", "maxSPPS", "TOTAL", "SUCCESS", "ERROR", "MIN", "AVG", "MAX",
            ],
            Category::Response => &[
                "CUs", "RPS", "maxRPS", "TOTAL", "SUCCESS", "ERROR", "MIN", "AVG", "MAX",
            ],
            Category::ResponseStep => {
                &["CUs", "TOTAL", "SUCCESS", "ERROR", "MIN", "AVG", "MAX"]
            }
        }
    }

    /// Per-step tables are indented to nest visually under their page.
    fn indent(self) -> usize {
        match self {
            Category::ResponseStep => 4,
            _ => 0,
        }
    }

    /// Test records carry no duration distribution, so they never get
    /// percentile columns.
    fn supports_percentiles(self) -> bool {
        self != Category::Test
    }

    fn image_names(self) -> &'static [&'static str] {
        match self {
            Category::Test => &["tests"],
            Category::Page => &["pages_spps", "pages"],
            Category::Response => &["requests_rps", "requests"],
            Category::ResponseStep => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// TableRenderer
// ---------------------------------------------------------------------------

/// Renders one fixed-width table for a category: chart references, header,
/// one row per cycle, footer.
pub struct TableRenderer {
    category: Category,
    with_percentiles: bool,
    images: Vec<String>,
}

impl TableRenderer {
    pub fn for_category(category: Category, with_percentiles: bool) -> Self {
        Self {
            category,
            with_percentiles,
            images: category
                .image_names()
                .iter()
                .map(|n| n.to_string())
                .collect(),
        }
    }

    /// Per-step variant. Chart names carry the step and request sequence
    /// number to avoid collisions across pages.
    pub fn for_step(step: u32, number: u32, with_percentiles: bool) -> Self {
        Self {
            category: Category::ResponseStep,
            with_percentiles,
            images: vec![format!("request_{step}.{number}")],
        }
    }

    fn percentile_mode(&self) -> bool {
        self.with_percentiles && self.category.supports_percentiles()
    }

    fn header_cells(&self) -> Vec<&'static str> {
        let mut cells = self.category.headers().to_vec();
        if self.percentile_mode() {
            cells.extend(["P10", "MED", "P90", "P95"]);
        }
        cells
    }

    fn deco_line(&self) -> String {
        vec![FMT_DECO; self.header_cells().len()].join(" ")
    }

    fn render_images(&self) -> String {
        let indent = " ".repeat(self.category.indent());
        let mut rst: Vec<String> = self
            .images
            .iter()
            .map(|name| format!("{indent} .. image:: {name}.png"))
            .collect();
        rst.push(String::new());
        rst.join("\n")
    }

    pub fn render_header(&self, with_chart: bool) -> String {
        let indent = " ".repeat(self.category.indent());
        let deco = format!(" {}", self.deco_line());
        let header = format!(
            " {}",
            self.header_cells()
                .iter()
                .map(|h| format!("{h:>7}"))
                .collect::<Vec<_>>()
                .join(" ")
        );
        let mut ret = Vec::new();
        if with_chart {
            ret.push(self.render_images());
        }
        ret.push(format!("{indent}{deco}"));
        ret.push(format!("{indent}{header}"));
        ret.push(format!("{indent}{deco}"));
        ret.join("\n")
    }

    /// Render one data row. Finalizes the stat first, so derived fields are
    /// always in place. STPS and SPPS count successful samples only; RPS
    /// counts all.
    pub fn render_row(&self, stat: &mut AggregatedStat) -> String {
        match self.category {
            Category::Test | Category::Page => stat.finalize_successful(),
            Category::Response | Category::ResponseStep => stat.finalize(),
        }
        let mut ret = vec![" ".repeat(self.category.indent())];
        ret.push(fmt_int(stat.cvus));
        match self.category {
            Category::Test => {
                ret.push(fmt_float(stat.rate));
                ret.push(fmt_int(stat.count));
                ret.push(fmt_int(stat.success));
                ret.push(fmt_percent(stat.error_percent));
            }
            Category::Page | Category::Response => {
                ret.push(fmt_float(stat.rate));
                ret.push(fmt_float(stat.rate_max));
                ret.push(fmt_int(stat.count));
                ret.push(fmt_int(stat.success));
                ret.push(fmt_percent(stat.error_percent));
                ret.push(fmt_float(stat.min));
                ret.push(fmt_float(stat.avg));
                ret.push(fmt_float(stat.max));
            }
            Category::ResponseStep => {
                ret.push(fmt_int(stat.count));
                ret.push(fmt_int(stat.success));
                ret.push(fmt_percent(stat.error_percent));
                ret.push(fmt_float(stat.min));
                ret.push(fmt_float(stat.avg));
                ret.push(fmt_float(stat.max));
            }
        }
        if self.percentile_mode() {
            let percentiles = stat.percentiles.unwrap_or_default();
            ret.push(fmt_float(percentiles.p10));
            ret.push(fmt_float(percentiles.p50));
            ret.push(fmt_float(percentiles.p90));
            ret.push(fmt_float(percentiles.p95));
        }
        ret.join(" ")
    }

    pub fn render_footer(&self) -> String {
        format!(
            "{}{}",
            " ".repeat(self.category.indent() + 1),
            self.deco_line()
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
