//! Run report generation.
//!
//! Collects per-case reports into a summary with Markdown and JSON
//! renderings. Rows are kept sorted by test name so report output is
//! reproducible regardless of execution order.

use serde::Serialize;

/// Reported result of one case, after suppression has been applied.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// Derived test name.
    pub name: String,
    /// Final reported assertion (suppression inversion already applied).
    pub passed: bool,
    /// Whether the case was in the suppression set.
    pub suppressed: bool,
    /// Reproduction context: raw verdict reasoning, ciphertext, key.
    pub diagnostic: String,
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Suppressed cases that failed raw and therefore report as expected
    /// failures.
    pub known_failures: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_reports(reports: &[CaseReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.total += 1;
            if report.passed {
                summary.passed += 1;
                if report.suppressed {
                    summary.known_failures += 1;
                }
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Complete run report.
#[derive(Debug, Clone, Serialize)]
pub struct ConformanceReport {
    pub title: String,
    pub timestamp: String,
    pub summary: RunSummary,
    pub cases: Vec<CaseReport>,
}

impl ConformanceReport {
    #[must_use]
    pub fn new(title: impl Into<String>, timestamp: impl Into<String>, mut cases: Vec<CaseReport>) -> Self {
        cases.sort_by(|a, b| a.name.cmp(&b.name));
        let summary = RunSummary::from_reports(&cases);
        Self {
            title: title.into(),
            timestamp: timestamp.into(),
            summary,
            cases,
        }
    }

    /// Render a human-readable Markdown report. Failing cases carry their
    /// full diagnostic; passing cases are summarized by count.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("Generated: {}\n\n", self.timestamp));
        out.push_str(&format!(
            "Summary: total={}, passed={}, failed={}, known failures={}\n\n",
            self.summary.total, self.summary.passed, self.summary.failed, self.summary.known_failures
        ));

        if self.summary.all_passed() {
            out.push_str("All cases passed.\n");
        } else {
            out.push_str("## Failing cases\n\n");
            for case in self.cases.iter().filter(|c| !c.passed) {
                out.push_str(&format!("### {}\n\n", case.name));
                if case.suppressed {
                    out.push_str("(suppressed)\n\n");
                }
                out.push_str(&format!("```\n{}\n```\n\n", case.diagnostic));
            }
        }
        out
    }

    /// Render the machine-readable JSON report.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, passed: bool, suppressed: bool) -> CaseReport {
        CaseReport {
            name: name.to_string(),
            passed,
            suppressed,
            diagnostic: format!("diagnostic for {name}"),
        }
    }

    #[test]
    fn summary_counts_pass_fail_and_known_failures() {
        let reports = vec![
            case("a", true, false),
            case("b", false, false),
            case("c", true, true),
            case("d", true, false),
        ];
        let summary = RunSummary::from_reports(&reports);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.known_failures, 1);
        assert!(!summary.all_passed());
    }

    #[test]
    fn report_rows_are_sorted_by_name() {
        let report = ConformanceReport::new(
            "t",
            "2026-01-01T00:00:00Z",
            vec![case("zeta", true, false), case("alpha", true, false)],
        );
        assert_eq!(report.cases[0].name, "alpha");
        assert_eq!(report.cases[1].name, "zeta");
    }

    #[test]
    fn markdown_surfaces_failing_diagnostics_only() {
        let report = ConformanceReport::new(
            "JWE Conformance",
            "2026-01-01T00:00:00Z",
            vec![case("ok case", true, false), case("bad case", false, false)],
        );
        let md = report.to_markdown();
        assert!(md.contains("# JWE Conformance"));
        assert!(md.contains("failed=1"));
        assert!(md.contains("### bad case"));
        assert!(md.contains("diagnostic for bad case"));
        assert!(!md.contains("diagnostic for ok case"));
    }

    #[test]
    fn json_report_round_trips() {
        let report = ConformanceReport::new("t", "ts", vec![case("a", true, false)]);
        let json = report.to_json().expect("serializes");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed["summary"]["total"], 1);
        assert_eq!(parsed["cases"][0]["name"], "a");
    }
}
