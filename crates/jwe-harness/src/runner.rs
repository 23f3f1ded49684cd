//! Decryption attempt execution.
//!
//! Drives each case through the attempt state machine: normalize the
//! ciphertext, resolve the group key, invoke the implementation under test,
//! classify the outcome, apply suppression. Key-resolution failures are
//! corpus defects and abort the run; everything the implementation does is
//! captured as an [`AttemptOutcome`] and becomes that case's verdict.
//!
//! Each case is attempted exactly once. Decryption is deterministic for a
//! fixed key and ciphertext, so a retry could only mask nondeterminism bugs.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use jwe_exec::{DecryptError, DecryptionKey, JweDecrypter, JwkParser};

use crate::classify::{AttemptOutcome, Verdict, classify};
use crate::corpus::{CaseRef, TestCase, TestGroup, VectorFile};
use crate::error::HarnessError;
use crate::keys::resolve_decryption_key;
use crate::normalize::flatten_jwe;
use crate::report::CaseReport;
use crate::suppress::SuppressionSet;

/// Runs corpus cases against one implementation under test.
pub struct CaseRunner<'a, P, D> {
    parser: &'a P,
    decrypter: &'a D,
}

impl<'a, P: JwkParser, D: JweDecrypter> CaseRunner<'a, P, D> {
    #[must_use]
    pub fn new(parser: &'a P, decrypter: &'a D) -> Self {
        Self { parser, decrypter }
    }

    /// Execute one attempt: normalize → resolve key → invoke.
    ///
    /// Returns `Err` only for corpus defects (a group JWK that fails to
    /// parse); the implementation's behavior always lands in the
    /// [`AttemptOutcome`].
    pub fn attempt(
        &self,
        group: &TestGroup,
        case: &TestCase,
    ) -> Result<AttemptOutcome, HarnessError> {
        let serialized = flatten_jwe(&case.jwe);
        let key = resolve_decryption_key(self.parser, &group.private.to_string())?;
        Ok(invoke(self.decrypter, &serialized, &key))
    }

    /// Run every case sequentially. Validates the suppression set against
    /// the corpus before any case executes.
    pub fn run(
        &self,
        file: &VectorFile,
        suppressions: &SuppressionSet,
    ) -> Result<Vec<CaseReport>, HarnessError> {
        suppressions.validate(&file.case_names())?;
        let mut reports = Vec::new();
        for case_ref in file.cases() {
            reports.push(self.run_case(&case_ref, suppressions)?);
        }
        reports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(reports)
    }

    fn run_case(
        &self,
        case_ref: &CaseRef<'_>,
        suppressions: &SuppressionSet,
    ) -> Result<CaseReport, HarnessError> {
        let serialized = flatten_jwe(&case_ref.case.jwe);
        let key = resolve_decryption_key(self.parser, &case_ref.group.private.to_string())?;
        let expected = case_ref.case.expected_outcome()?;

        let outcome = invoke(self.decrypter, &serialized, &key);
        let raw = classify(&expected, &outcome);

        // Keep enough context to reproduce the case without rerunning the
        // harness.
        let diagnostic = format!("{}\njwe: {serialized}\njwk: {}", raw.diagnostic, key.jwk);
        Ok(suppressions.apply(
            &case_ref.name,
            Verdict {
                passed: raw.passed,
                diagnostic,
            },
        ))
    }
}

impl<'a, P: JwkParser + Sync, D: JweDecrypter + Sync> CaseRunner<'a, P, D> {
    /// Run every case across available execution units.
    ///
    /// Cases share only the read-only corpus and suppression set, so they
    /// partition freely; execution order is unspecified and the returned
    /// reports are sorted by name.
    pub fn run_parallel(
        &self,
        file: &VectorFile,
        suppressions: &SuppressionSet,
    ) -> Result<Vec<CaseReport>, HarnessError> {
        suppressions.validate(&file.case_names())?;
        let case_refs: Vec<CaseRef<'_>> = file.cases().collect();
        if case_refs.is_empty() {
            return Ok(Vec::new());
        }

        let workers = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        let chunk_size = case_refs.len().div_ceil(workers);

        let mut reports = Vec::with_capacity(case_refs.len());
        std::thread::scope(|scope| -> Result<(), HarnessError> {
            let handles: Vec<_> = case_refs
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|case_ref| self.run_case(case_ref, suppressions))
                            .collect::<Result<Vec<_>, _>>()
                    })
                })
                .collect();
            for handle in handles {
                match handle.join() {
                    Ok(result) => reports.extend(result?),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            Ok(())
        })?;

        reports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(reports)
    }
}

/// Invoke the implementation under test and map its behavior to a terminal
/// attempt state. A panic counts as an unexpected failure: an
/// implementation that crashes instead of cleanly rejecting bad input has a
/// robustness bug, and it must not tear down the harness.
fn invoke<D: JweDecrypter>(
    decrypter: &D,
    serialized: &str,
    key: &DecryptionKey,
) -> AttemptOutcome {
    match catch_unwind(AssertUnwindSafe(|| decrypter.decrypt(serialized, key))) {
        Ok(Ok(plaintext)) => AttemptOutcome::Decrypted(plaintext),
        Ok(Err(DecryptError::InvalidInput(reason))) => AttemptOutcome::Rejected(reason),
        Ok(Err(DecryptError::Backend(reason))) => AttemptOutcome::UnexpectedFailure(reason),
        Err(panic) => AttemptOutcome::UnexpectedFailure(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jwe_exec::StandardJwkParser;

    /// Scripted implementation under test.
    enum Scripted {
        Succeed(Vec<u8>),
        Reject,
        Fail,
        Panic,
    }

    impl JweDecrypter for Scripted {
        fn decrypt(
            &self,
            _serialized_jwe: &str,
            _key: &DecryptionKey,
        ) -> Result<Vec<u8>, DecryptError> {
            match self {
                Self::Succeed(pt) => Ok(pt.clone()),
                Self::Reject => Err(DecryptError::InvalidInput("scripted rejection".to_string())),
                Self::Fail => Err(DecryptError::Backend("scripted backend failure".to_string())),
                Self::Panic => panic!("scripted panic"),
            }
        }
    }

    fn corpus(result: &str, pt: Option<&str>) -> VectorFile {
        let mut case = serde_json::json!({
            "tcId": 1,
            "comment": "case",
            "result": result,
            "jwe": "a.b.c.d.e"
        });
        if let Some(pt) = pt {
            case["pt"] = serde_json::Value::String(pt.to_string());
        }
        let file = serde_json::json!({
            "testGroups": [{
                "comment": "group",
                "private": {"kty": "oct", "k": "MDEyMzQ1Njc4OWFiY2RlZg"},
                "tests": [case]
            }]
        });
        VectorFile::from_json(&file.to_string()).expect("well-formed corpus")
    }

    #[test]
    fn rejection_is_classified_as_rejected() {
        let file = corpus("invalid", None);
        let runner = CaseRunner::new(&StandardJwkParser, &Scripted::Reject);
        let reports = runner.run(&file, &SuppressionSet::new()).expect("runs");
        assert_eq!(reports.len(), 1);
        assert!(reports[0].passed);
    }

    #[test]
    fn panic_is_classified_as_unexpected_failure_and_fails() {
        let file = corpus("invalid", None);
        let runner = CaseRunner::new(&StandardJwkParser, &Scripted::Panic);
        let outcome = runner
            .attempt(&file.test_groups[0], &file.test_groups[0].tests[0])
            .expect("attempt completes despite the panic");
        assert!(
            matches!(outcome, AttemptOutcome::UnexpectedFailure(ref m) if m.contains("scripted panic")),
            "{outcome:?}"
        );

        let reports = runner.run(&file, &SuppressionSet::new()).expect("runs");
        assert!(!reports[0].passed, "a crash is never a pass");
    }

    #[test]
    fn backend_error_is_unexpected_failure() {
        let file = corpus("invalid", None);
        let runner = CaseRunner::new(&StandardJwkParser, &Scripted::Fail);
        let reports = runner.run(&file, &SuppressionSet::new()).expect("runs");
        assert!(!reports[0].passed);
        assert!(reports[0].diagnostic.contains("scripted backend failure"));
    }

    #[test]
    fn successful_decrypt_with_matching_plaintext_passes() {
        let file = corpus("valid", Some("48656c6c6f"));
        let decrypter = Scripted::Succeed(b"Hello".to_vec());
        let runner = CaseRunner::new(&StandardJwkParser, &decrypter);
        let reports = runner.run(&file, &SuppressionSet::new()).expect("runs");
        assert!(reports[0].passed);
    }

    #[test]
    fn diagnostic_carries_ciphertext_and_key() {
        let file = corpus("valid", Some("48656c6c6f"));
        let runner = CaseRunner::new(&StandardJwkParser, &Scripted::Reject);
        let reports = runner.run(&file, &SuppressionSet::new()).expect("runs");
        assert!(!reports[0].passed);
        assert!(reports[0].diagnostic.contains("jwe: a.b.c.d.e"));
        assert!(reports[0].diagnostic.contains("\"kty\":\"oct\""));
    }

    #[test]
    fn stale_suppression_aborts_before_any_case_runs() {
        let file = corpus("invalid", None);
        // A panicking decrypter would surface as an UnexpectedFailure
        // verdict if any case executed; the run must error out first.
        let runner = CaseRunner::new(&StandardJwkParser, &Scripted::Panic);
        let suppressions = SuppressionSet::from_names(["no such test"]);
        let err = runner.run(&file, &suppressions).expect_err("stale entry");
        assert!(matches!(err, HarnessError::StaleSuppression { .. }), "{err}");
    }

    #[test]
    fn unparseable_group_jwk_aborts_the_run() {
        let file = serde_json::json!({
            "testGroups": [{
                "comment": "group",
                "private": {"kty": "mystery"},
                "tests": [{
                    "tcId": 1, "comment": "case", "result": "invalid", "jwe": "x"
                }]
            }]
        });
        let file = VectorFile::from_json(&file.to_string()).expect("loads");
        let runner = CaseRunner::new(&StandardJwkParser, &Scripted::Reject);
        let err = runner
            .run(&file, &SuppressionSet::new())
            .expect_err("corpus defect");
        assert!(matches!(err, HarnessError::CorpusDefect(_)), "{err}");
    }

    #[test]
    fn parallel_run_matches_sequential_run() {
        let file = serde_json::json!({
            "testGroups": [{
                "comment": "group",
                "private": {"kty": "oct", "k": "MDEyMzQ1Njc4OWFiY2RlZg"},
                "tests": (1..=16).map(|i| serde_json::json!({
                    "tcId": i, "comment": format!("case {i}"),
                    "result": "invalid", "jwe": "a.b"
                })).collect::<Vec<_>>()
            }]
        });
        let file = VectorFile::from_json(&file.to_string()).expect("loads");
        let runner = CaseRunner::new(&StandardJwkParser, &Scripted::Reject);
        let suppressions = SuppressionSet::new();

        let sequential = runner.run(&file, &suppressions).expect("sequential");
        let parallel = runner.run_parallel(&file, &suppressions).expect("parallel");

        assert_eq!(sequential.len(), parallel.len());
        for (a, b) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.passed, b.passed);
        }
    }
}
