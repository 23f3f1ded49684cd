//! Outcome classification.
//!
//! Maps (expected result, attempt outcome) to a verdict. This table is the
//! entire security contract of the harness:
//!
//! | expected | outcome             | verdict |
//! |----------|---------------------|---------|
//! | valid    | Decrypted, hex ==   | PASS    |
//! | valid    | Decrypted, hex !=   | FAIL (silent corruption) |
//! | valid    | Rejected            | FAIL (false rejection) |
//! | valid    | UnexpectedFailure   | FAIL (crash on good input) |
//! | invalid  | Rejected            | PASS    |
//! | invalid  | Decrypted           | FAIL (accepted forged/confused input) |
//! | invalid  | UnexpectedFailure   | FAIL (crash instead of clean reject) |
//!
//! The `invalid + Decrypted` row catches authentication-bypass and
//! algorithm-confusion vulnerabilities and must never be relaxed.

/// Terminal state of one decryption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The implementation returned plaintext bytes.
    Decrypted(Vec<u8>),
    /// The implementation raised its designated invalid-input condition.
    Rejected(String),
    /// The implementation failed in any other way (panic, internal error).
    UnexpectedFailure(String),
}

/// What the corpus requires of the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedOutcome {
    /// Decryption must succeed and produce exactly this lowercase-hex
    /// plaintext.
    Valid { plaintext_hex: String },
    /// Decryption must cleanly reject the input.
    Invalid,
}

/// Pass/fail plus a human-readable diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub diagnostic: String,
}

impl Verdict {
    fn pass(diagnostic: impl Into<String>) -> Self {
        Self {
            passed: true,
            diagnostic: diagnostic.into(),
        }
    }

    fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            passed: false,
            diagnostic: diagnostic.into(),
        }
    }
}

/// Apply the decision table.
///
/// Plaintext comparison is exact string equality on lowercase hex; no case
/// folding or whitespace normalization is applied to the expected value.
#[must_use]
pub fn classify(expected: &ExpectedOutcome, outcome: &AttemptOutcome) -> Verdict {
    match (expected, outcome) {
        (ExpectedOutcome::Valid { plaintext_hex }, AttemptOutcome::Decrypted(pt)) => {
            let actual_hex = hex::encode(pt);
            if actual_hex == *plaintext_hex {
                Verdict::pass(format!("decrypted to expected plaintext {actual_hex}"))
            } else {
                Verdict::fail(format!(
                    "silent corruption: decryption returned wrong plaintext \
                     (expected: {plaintext_hex}, got: {actual_hex})"
                ))
            }
        }
        (ExpectedOutcome::Valid { .. }, AttemptOutcome::Rejected(reason)) => Verdict::fail(
            format!("false rejection of a legitimate ciphertext: {reason}"),
        ),
        (ExpectedOutcome::Valid { .. }, AttemptOutcome::UnexpectedFailure(reason)) => {
            Verdict::fail(format!(
                "unexpected failure on legitimate input: {reason}"
            ))
        }
        (ExpectedOutcome::Invalid, AttemptOutcome::Rejected(reason)) => {
            Verdict::pass(format!("correctly rejected: {reason}"))
        }
        (ExpectedOutcome::Invalid, AttemptOutcome::Decrypted(pt)) => Verdict::fail(format!(
            "accepted input that must be rejected (decrypted to {})",
            hex::encode(pt)
        )),
        (ExpectedOutcome::Invalid, AttemptOutcome::UnexpectedFailure(reason)) => Verdict::fail(
            format!("crashed instead of cleanly rejecting bad input: {reason}"),
        ),
    }
}
