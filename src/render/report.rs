use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{
    AggregatedStat, BenchData, CycleStats, ErrorKind, ErrorRecord, RenderOptions, TestStat,
};

use super::rst_title;
use super::table::{Category, TableRenderer};

// ---------------------------------------------------------------------------
// RstRenderer
// ---------------------------------------------------------------------------

/// Assembles the full bench report from pre-aggregated statistics.
///
/// The renderer consumes its input and produces a single ReST text blob;
/// it performs no I/O. Missing per-cycle data is skipped silently; the only
/// short-circuit is a run with no cycles at all.
pub struct RstRenderer {
    data: BenchData,
    options: RenderOptions,
    lines: Vec<String>,
}

impl RstRenderer {
    pub fn new(data: BenchData, options: RenderOptions) -> Self {
        Self {
            data,
            options,
            lines: Vec::new(),
        }
    }

    /// Render the complete report.
    pub fn render(mut self) -> String {
        self.render_config();
        let representative = match self.representative_cycle() {
            Some(cycle) => cycle,
            None => {
                tracing::warn!("no cycle recorded, emitting placeholder report");
                self.append("No cycle found");
                return self.lines.join("\n");
            }
        };

        if let Some(test) = representative.test.clone() {
            self.render_test_content(&test);
        }
        self.render_cycles_stat(
            Category::Test,
            "Test stats",
            "The number of Successful **Test** Per Second (STPS) over Concurrent Users (CUs).",
        );
        self.render_cycles_stat(
            Category::Page,
            "Page stats",
            "The number of Successful **Page** Per Second (SPPS) over Concurrent Users (CUs).\n\
             Note that an XML RPC call count like a page.",
        );
        self.render_cycles_stat(
            Category::Response,
            "Request stats",
            "The number of **Request** Per Second (RPS) successful or not over Concurrent Users (CUs).",
        );
        self.render_slowest_requests();
        self.render_monitors();
        self.render_page_detail(&representative);
        self.render_errors();
        self.render_definitions();
        self.lines.join("\n")
    }

    fn append(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    // -----------------------------------------------------------------------
    // Cycle selection
    // -----------------------------------------------------------------------

    /// The cycle with the maximum number of distinct steps; ties keep the
    /// first cycle in ascending order. `None` when no cycles exist.
    fn representative_cycle(&self) -> Option<CycleStats> {
        let mut chosen: Option<(u32, &CycleStats)> = None;
        let mut max_steps = 0;
        for (&cycle, stats) in &self.data.stats.0 {
            if chosen.is_none() {
                chosen = Some((cycle, stats));
            }
            let steps = stats.response_step.len();
            if steps > max_steps {
                max_steps = steps;
                chosen = Some((cycle, stats));
            }
        }
        if let Some((cycle, _)) = chosen {
            tracing::debug!(cycle, steps = max_steps, "selected representative cycle");
        }
        chosen.map(|(_, stats)| stats.clone())
    }

    /// The cycle with the maximum successful-tests-per-second value, or the
    /// first cycle when no cycle has a `test` record.
    fn best_stps_cycle(&mut self) -> Option<u32> {
        let mut best: Option<(u32, f64)> = None;
        for (&cycle, stats) in self.data.stats.0.iter_mut() {
            let test = match stats.test.as_mut() {
                Some(test) => test,
                None => continue,
            };
            test.stat.finalize_successful();
            let stps = test.stat.rate;
            let better = match best {
                Some((_, max_stps)) => stps > max_stps,
                None => true,
            };
            if better {
                best = Some((cycle, stps));
            }
        }
        best.map(|(cycle, _)| cycle)
            .or_else(|| self.data.stats.cycles().next())
    }

    // -----------------------------------------------------------------------
    // Configuration summary
    // -----------------------------------------------------------------------

    fn render_config(&mut self) {
        let config = self.data.config.clone();
        self.append(&rst_title("Bench report", 0));
        self.append("");
        let date = config.launch_date();
        self.append(&format!(":date: {date}"));
        let description = [
            config.class_description.clone(),
            format!("Bench result of ``{}.{}``: ", config.class, config.method),
            config.description.clone(),
        ];
        self.append(&format!(":abstract: {}", description.join("\n           ")));
        self.append("");
        self.append(".. sectnum::    :depth: 2");
        self.append(".. contents:: Table of contents");

        self.append(&rst_title("Bench configuration", 2));
        self.append(&format!("* Launched: {date}"));
        self.append(&format!(
            "* Test: ``{} {}.{}``",
            config.module, config.class, config.method
        ));
        self.append(&format!("* Server: {}", config.server_url));
        self.append(&format!(
            "* Cycles of concurrent users: {}",
            config.cycles
        ));
        self.append(&format!("* Cycle duration: {}s", config.duration));
        self.append(&format!(
            "* Sleeptime between request: from {}s to {}s",
            config.sleep_time_min, config.sleep_time_max
        ));
        self.append(&format!(
            "* Sleeptime between test case: {}s",
            config.sleep_time
        ));
        self.append(&format!(
            "* Startup delay between thread: {}s",
            config.startup_delay
        ));
        self.append(&format!("* Bench tool version: {}", config.version));
        self.append("");
    }

    // -----------------------------------------------------------------------
    // Content summary
    // -----------------------------------------------------------------------

    fn render_test_content(&mut self, test: &TestStat) {
        let config = self.data.config.clone();
        self.append(&rst_title("Bench content", 2));
        self.append(&format!(
            "The test ``{}.{}`` contains: ",
            config.class, config.method
        ));
        self.append("");
        self.append(&format!("* {} page(s)", test.pages));
        self.append(&format!("* {} redirect(s)", test.redirects));
        self.append(&format!("* {} link(s)", test.links));
        self.append(&format!("* {} image(s)", test.images));
        self.append(&format!("* {} XML RPC call(s)", test.xmlrpc));
        self.append("");

        self.append("The bench contains:");
        let mut total_tests = 0u64;
        let mut total_tests_error = 0u64;
        let mut total_pages = 0u64;
        let mut total_pages_error = 0u64;
        let mut total_responses = 0u64;
        let mut total_responses_error = 0u64;
        for stats in self.data.stats.0.values() {
            if let Some(test) = &stats.test {
                total_tests += test.stat.count;
                total_tests_error += test.stat.error;
            }
            if let Some(page) = &stats.page {
                total_pages += page.count;
                total_pages_error += page.error;
            }
            if let Some(response) = &stats.response {
                total_responses += response.count;
                total_responses_error += response.error;
            }
        }
        self.append("");
        self.append(&format!(
            "* {} tests{}",
            total_tests,
            error_suffix(total_tests_error)
        ));
        self.append(&format!(
            "* {} pages{}",
            total_pages,
            error_suffix(total_pages_error)
        ));
        self.append(&format!(
            "* {} requests{}",
            total_responses,
            error_suffix(total_responses_error)
        ));
        self.append("");
    }

    // -----------------------------------------------------------------------
    // Per-category tables
    // -----------------------------------------------------------------------

    /// Render one category's table across all cycles: header on the first
    /// cycle with data, one row per cycle with data, footer after the loop.
    ///
    /// Whole-cycle categories only; per-step tables are keyed by step and
    /// go through [`Self::render_cycles_step_stat`].
    fn render_cycles_stat(&mut self, category: Category, title: &str, description: &str) {
        debug_assert!(category != Category::ResponseStep);
        self.append(&rst_title(title, 2));
        if !description.is_empty() {
            self.append(description);
            self.append("");
        }
        let renderer = TableRenderer::for_category(category, self.options.with_percentiles);
        let with_chart = self.options.html;
        let mut body: Vec<String> = Vec::new();
        for stats in self.data.stats.0.values_mut() {
            let stat: Option<&mut AggregatedStat> = match category {
                Category::Test => stats.test.as_mut().map(|t| &mut t.stat),
                Category::Page => stats.page.as_mut(),
                Category::Response => stats.response.as_mut(),
                Category::ResponseStep => None,
            };
            let stat = match stat {
                Some(stat) => stat,
                None => continue,
            };
            if body.is_empty() {
                body.push(renderer.render_header(with_chart));
            }
            body.push(renderer.render_row(stat));
        }
        if body.is_empty() {
            self.append(&format!(
                "Sorry no {} have finished during a cycle, the cycle duration is too short.\n",
                category.key()
            ));
        } else {
            body.push(renderer.render_footer());
            self.lines.extend(body);
        }
    }

    /// Render one step's table across all cycles, scoped to a single step
    /// identifier.
    fn render_cycles_step_stat(&mut self, step_key: &str) {
        let with_percentiles = self.options.with_percentiles;
        let with_chart = self.options.html;
        let mut body: Vec<String> = Vec::new();
        let mut renderer: Option<TableRenderer> = None;
        for stats in self.data.stats.0.values_mut() {
            let step = match stats.response_step.get_mut(step_key) {
                Some(step) => step,
                None => continue,
            };
            let table = TableRenderer::for_step(step.step, step.number, with_percentiles);
            if renderer.is_none() {
                body.push(table.render_header(with_chart));
            }
            body.push(table.render_row(&mut step.stat));
            renderer = Some(table);
        }
        if let Some(table) = renderer {
            body.push(table.render_footer());
            self.lines.extend(body);
        }
    }

    // -----------------------------------------------------------------------
    // Slowest requests
    // -----------------------------------------------------------------------

    fn render_slowest_requests(&mut self) {
        let number = self.options.slowest_items;
        self.append(&rst_title(&format!("{number} Slowest requests"), 2));
        let cycle = match self.best_stps_cycle() {
            Some(cycle) => cycle,
            None => return,
        };
        let mut items: Vec<(f64, u32, String, String, String)> = Vec::new();
        let mut cycle_cvus = 0;
        if let Some(stats) = self.data.stats.0.get_mut(&cycle) {
            for step in stats.response_step.values_mut() {
                step.stat.finalize();
                items.push((
                    step.stat.avg,
                    step.step,
                    step.request_type.clone(),
                    step.url.clone(),
                    step.label().to_string(),
                ));
                if cycle_cvus == 0 {
                    cycle_cvus = step.stat.cvus;
                }
            }
        }
        if items.is_empty() {
            return;
        }
        // Natural tuple ordering, descending: ties on the average duration
        // fall back to the step index, then the remaining fields.
        items.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        self.append(&format!(
            "Slowest average response time during the best cycle with **{cycle_cvus}** CUs:\n"
        ));
        for (avg, step, request_type, url, description) in items.into_iter().take(number) {
            self.append(&format!(
                "* In page {step} {request_type}: {url} took **{avg:.3}s**\n  `{description}`"
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Monitored hosts
    // -----------------------------------------------------------------------

    fn render_monitors(&mut self) {
        if self.data.monitor.is_empty() || !self.options.html {
            return;
        }
        self.append(&rst_title("Monitored hosts", 2));
        let hosts: Vec<String> = self.data.monitor.keys().cloned().collect();
        for host in hosts {
            let description = {
                let recorded = self.data.config.host_description(&host);
                if recorded.is_empty() {
                    self.data.monitor.get(&host).cloned().unwrap_or_default()
                } else {
                    recorded.to_string()
                }
            };
            self.append(&rst_title(&format!("{host}: {description}"), 3));
            self.append(&format!("**Load average**\n\n.. image:: {host}_load.png\n"));
            self.append(&format!("**Memory usage**\n\n.. image:: {host}_mem.png\n"));
            self.append(&format!(
                "**Network traffic**\n\n.. image:: {host}_net.png\n"
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Page detail
    // -----------------------------------------------------------------------

    fn render_page_detail(&mut self, representative: &CycleStats) {
        self.append(&rst_title("Page detail stats", 2));
        let mut current_page: Option<u32> = None;
        for (step_key, step) in &representative.response_step {
            if current_page != Some(step.step) {
                current_page = Some(step.step);
                let title = format!("PAGE {}: {}", step.step, step.label());
                self.lines.push(rst_title(&title, 3));
            }
            self.lines.push(format!(
                "* Req: {}, {}, url {}",
                step.number, step.request_type, step.url
            ));
            self.lines.push(String::new());
            self.render_cycles_step_stat(step_key);
        }
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    fn render_errors(&mut self) {
        if self.data.errors.is_empty() {
            return;
        }
        self.append(&rst_title("Failures and Errors", 2));
        let mut out: Vec<String> = Vec::new();
        for kind in [ErrorKind::Failure, ErrorKind::Error] {
            let records = self.data.errors.records(kind);
            if records.is_empty() {
                continue;
            }
            out.push(rst_title(&format!("{kind}s"), 3));
            for (key, group) in group_errors(records) {
                let first = group[0];
                match &first.exception {
                    Some(exception) => {
                        out.push(format!(
                            "* {} time(s), code: {}, {}\n  in {}, line {}: {}",
                            group.len(),
                            key.0,
                            exception.kind,
                            exception.file,
                            exception.line,
                            exception.value
                        ));
                    }
                    None => {
                        let traceback = first
                            .traceback
                            .as_deref()
                            .map(indent_traceback)
                            .unwrap_or_else(|| "No traceback.".to_string());
                        out.push(format!(
                            "* {} time(s), code: {}::\n\n    {}\n",
                            group.len(),
                            key.0,
                            traceback
                        ));
                    }
                }
            }
        }
        self.lines.extend(out);
    }

    // -----------------------------------------------------------------------
    // Definitions
    // -----------------------------------------------------------------------

    fn render_definitions(&mut self) {
        self.append(&rst_title("Definitions", 2));
        self.append(
            "* CUs: Concurrent users or number of concurrent threads executing tests.",
        );
        self.append("* Request: a single GET/POST/redirect/xmlrpc request.");
        self.append(
            "* Page: a request with redirects and resource links (image, css, js) for an html page.",
        );
        self.append("* STPS: Successful tests per second.");
        self.append("* SPPS: Successful pages per second.");
        self.append("* RPS: Requests per second successful or not.");
        self.append("* maxSPPS: Maximum SPPS during the cycle.");
        self.append("* maxRPS: Maximum RPS during the cycle.");
        self.append("* MIN: Minimum response time for a page or request.");
        self.append("* AVG: Average response time for a page or request.");
        self.append("* MAX: Maximum response time for a page or request.");
        self.append(
            "* P10: Percentile 10 or response time where 10 percent of pages or requests are delivered.",
        );
        self.append(
            "* MED: Median or Percentile 50, response time where half of pages or requests are delivered.",
        );
        self.append(
            "* P90: Percentile 90 or response time where 90 percent of pages or requests are delivered.",
        );
        self.append(
            "* P95: Percentile 95 or response time where 95 percent of pages or requests are delivered.",
        );
        self.append("");
        self.append(&format!(
            "Report generated with loadrst {}.",
            env!("CARGO_PKG_VERSION")
        ));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn error_suffix(count: u64) -> String {
    if count > 0 {
        format!(", {count} error(s)")
    } else {
        String::new()
    }
}

type ErrorGroupKey = (u16, Option<String>, Option<String>);

/// Group error records by (status code, exception file, exception line);
/// iteration order is ascending by key.
fn group_errors(records: &[ErrorRecord]) -> BTreeMap<ErrorGroupKey, Vec<&ErrorRecord>> {
    let mut groups: BTreeMap<ErrorGroupKey, Vec<&ErrorRecord>> = BTreeMap::new();
    for record in records {
        let key = (
            record.code,
            record.exception.as_ref().map(|e| e.file.clone()),
            record.exception.as_ref().map(|e| e.line.clone()),
        );
        groups.entry(key).or_default().push(record);
    }
    groups
}

/// Push every traceback frame onto its own indented line for the literal
/// block rendering.
fn indent_traceback(traceback: &str) -> String {
    traceback.replace("File ", "\n    File ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
