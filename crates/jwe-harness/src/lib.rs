//! Conformance harness for JWE (RFC 7516) decryption implementations.
//!
//! This crate provides:
//! - Corpus loading: parse Wycheproof-style JWE vector files into typed
//!   groups and cases with derived test names
//! - Attempt running: normalize ciphertext, resolve the group key, invoke
//!   the implementation under test, classify the outcome
//! - Verdict classification: the decision table separating correct accepts,
//!   correct rejects, silent corruption, and crashes
//! - Suppression ledger: known-failing test names with inverted assertions
//!   and a load-time staleness self-check
//! - Report generation: human-readable + machine-readable run reports

#![forbid(unsafe_code)]

pub mod classify;
pub mod corpus;
pub mod error;
pub mod keys;
pub mod normalize;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod suppress;

pub use classify::{AttemptOutcome, ExpectedOutcome, Verdict, classify};
pub use corpus::{ExpectedResult, TestCase, TestGroup, VectorFile};
pub use error::HarnessError;
pub use report::{CaseReport, ConformanceReport, RunSummary};
pub use runner::CaseRunner;
pub use suppress::SuppressionSet;
