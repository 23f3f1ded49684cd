//! Vector corpus loading.
//!
//! Parses Wycheproof-style JWE vector files (`testGroups` → `tests`) into
//! typed groups and cases, deriving the globally unique test name
//! `{group comment}_{case comment}_tcId{tcId}` for each case at load time.
//!
//! Loading follows an explicit two-phase protocol: [`VectorFile::from_json`]
//! produces the corpus, [`VectorFile::case_names`] produces the complete
//! name set used to validate the suppression configuration before any case
//! executes. There is no global mutable state.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::classify::ExpectedOutcome;
use crate::error::HarnessError;

/// A parsed vector file: one or more test groups plus optional metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorFile {
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default, rename = "numberOfTests")]
    pub number_of_tests: Option<usize>,
    #[serde(rename = "testGroups")]
    pub test_groups: Vec<TestGroup>,
}

/// A named collection of cases sharing key material.
#[derive(Debug, Clone, Deserialize)]
pub struct TestGroup {
    /// Human-readable group label.
    pub comment: String,
    /// Private-key JWK (or JWK pair) used by every case in the group.
    pub private: serde_json::Value,
    pub tests: Vec<TestCase>,
}

/// One concrete trial.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    /// Numeric id, unique within the group.
    #[serde(rename = "tcId")]
    pub tc_id: u32,
    /// Human-readable case label.
    pub comment: String,
    pub result: ExpectedResult,
    /// The JWE under test: compact string or structured JSON serialization.
    pub jwe: serde_json::Value,
    /// Expected plaintext as lowercase hex; present when `result` is valid.
    #[serde(default)]
    pub pt: Option<String>,
}

/// Expected result tag for a case.
///
/// Only the literal string `"valid"` counts as valid; every other label
/// (including `"invalid"` and `"acceptable"`) collapses to invalid. The
/// corpus authors use finer labels to flag vectors implementations may
/// accept with legacy behavior, and this suite deliberately requires them
/// to be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedResult {
    Valid,
    Invalid,
}

impl<'de> Deserialize<'de> for ExpectedResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "valid" {
            Self::Valid
        } else {
            Self::Invalid
        })
    }
}

/// A borrowed (group, case) pair with its derived test name.
#[derive(Debug, Clone)]
pub struct CaseRef<'a> {
    pub group: &'a TestGroup,
    pub case: &'a TestCase,
    pub name: String,
}

impl VectorFile {
    /// Load a vector file from a JSON string and validate its shape.
    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        let file: Self = serde_json::from_str(json)?;
        file.validate()?;
        Ok(file)
    }

    /// Load a vector file from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Iterate all (group, case, name) triples in corpus order.
    pub fn cases(&self) -> impl Iterator<Item = CaseRef<'_>> {
        self.test_groups.iter().flat_map(|group| {
            group.tests.iter().map(move |case| CaseRef {
                group,
                case,
                name: test_name(group, case),
            })
        })
    }

    /// The complete set of derived test names, for suppression validation.
    #[must_use]
    pub fn case_names(&self) -> BTreeSet<String> {
        self.cases().map(|c| c.name).collect()
    }

    fn validate(&self) -> Result<(), HarnessError> {
        let mut seen = BTreeSet::new();
        for case_ref in self.cases() {
            if case_ref.case.result == ExpectedResult::Valid && case_ref.case.pt.is_none() {
                return Err(HarnessError::CorpusDefect(format!(
                    "valid case '{}' has no expected plaintext",
                    case_ref.name
                )));
            }
            // Derived names must be globally unique: suppression entries
            // and report rows are keyed by them.
            if !seen.insert(case_ref.name.clone()) {
                return Err(HarnessError::CorpusDefect(format!(
                    "duplicate derived test name '{}'",
                    case_ref.name
                )));
            }
        }
        Ok(())
    }
}

impl TestCase {
    /// The outcome this case requires from the implementation under test.
    pub fn expected_outcome(&self) -> Result<ExpectedOutcome, HarnessError> {
        match self.result {
            ExpectedResult::Valid => {
                let pt = self.pt.clone().ok_or_else(|| {
                    HarnessError::CorpusDefect(format!(
                        "valid case tcId {} has no expected plaintext",
                        self.tc_id
                    ))
                })?;
                Ok(ExpectedOutcome::Valid { plaintext_hex: pt })
            }
            ExpectedResult::Invalid => Ok(ExpectedOutcome::Invalid),
        }
    }
}

/// Derived, globally unique test identifier.
fn test_name(group: &TestGroup, case: &TestCase) -> String {
    format!("{}_{}_tcId{}", group.comment, case.comment, case.tc_id)
}
