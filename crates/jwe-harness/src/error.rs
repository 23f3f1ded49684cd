//! Run-fatal harness errors.
//!
//! Everything here indicates the harness or its configuration is broken, not
//! the implementation under test. Per-case outcomes never appear as errors;
//! they are verdicts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("corpus is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed corpus content: a group JWK that fails to parse, a valid
    /// case without expected plaintext, and the like.
    #[error("corpus defect: {0}")]
    CorpusDefect(String),
    /// A suppressed test name that no case in the corpus produces. Stale
    /// entries usually mean the corpus was edited after the suppression was
    /// recorded; they must fail loudly before any case runs.
    #[error("suppressed test '{name}' does not exist in the corpus")]
    StaleSuppression { name: String },
}
