//! Suppression ledger.
//!
//! A configured set of test names known to fail. Suppressed cases have
//! their assertion inverted: a raw FAIL reports as an expected failure, and
//! a raw PASS reports as a failure labeled needlessly suppressed, so stale
//! suppressions surface as soon as the underlying bug is fixed.
//!
//! The ledger self-checks at load time: every suppressed name must exist in
//! the corpus-derived name set, and a dangling entry aborts the run before
//! any case executes.

use std::collections::BTreeSet;

use crate::classify::Verdict;
use crate::error::HarnessError;
use crate::report::CaseReport;

#[derive(Debug, Clone, Default)]
pub struct SuppressionSet {
    names: BTreeSet<String>,
}

impl SuppressionSet {
    /// An empty set: no suppressions configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an iterator of test names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Load from a JSON array of strings.
    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::from_names(names))
    }

    /// Load from a file containing a JSON array of strings.
    pub fn from_file(path: &std::path::Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Load-time self-check: every suppressed name must correspond to a
    /// test name the corpus actually produces.
    pub fn validate(&self, all_names: &BTreeSet<String>) -> Result<(), HarnessError> {
        for name in &self.names {
            if !all_names.contains(name) {
                return Err(HarnessError::StaleSuppression { name: name.clone() });
            }
        }
        Ok(())
    }

    /// Turn a raw verdict into the reported case result, inverting the
    /// assertion for suppressed names.
    #[must_use]
    pub fn apply(&self, name: &str, raw: Verdict) -> CaseReport {
        if !self.contains(name) {
            return CaseReport {
                name: name.to_string(),
                passed: raw.passed,
                suppressed: false,
                diagnostic: raw.diagnostic,
            };
        }

        if raw.passed {
            CaseReport {
                name: name.to_string(),
                passed: false,
                suppressed: true,
                diagnostic: format!(
                    "this test appears to be needlessly suppressed: raw verdict was a pass \
                     ({}); remove it from the suppression set",
                    raw.diagnostic
                ),
            }
        } else {
            CaseReport {
                name: name.to_string(),
                passed: true,
                suppressed: true,
                diagnostic: format!("known failure (suppressed): {}", raw.diagnostic),
            }
        }
    }
}
