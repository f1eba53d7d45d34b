//! Runs the registered checks over a candidate submission and stores it if none rejects it
use super::checks::{Check, CheckMessage};
use super::directory::CheckConfiguration;
use super::error::StorageError;
use super::storage::VersionedFileStore;
use super::submission::{Submission, SubmissionTarget};
use super::version::Version;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

struct RegisteredCheck {
    check: Box<dyn Check>,
    rejecting: bool, // a failing rejecting check stops the pipeline and blocks storage
}

pub struct CheckPipeline {
    checks: Vec<RegisteredCheck>,
    store: Arc<VersionedFileStore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub accepted: bool,
    pub messages: Vec<CheckMessage>,
    /// The version that was stored, if the submission was accepted.
    #[serde(skip)]
    pub version: Option<Version>,
}

impl CheckPipeline {
    pub fn new(store: Arc<VersionedFileStore>) -> Self {
        Self {
            checks: vec![],
            store,
        }
    }

    pub fn add_check(&mut self, check: Box<dyn Check>) -> &mut Self {
        self.checks.push(RegisteredCheck {
            check,
            rejecting: true,
        });
        self
    }

    /// Registers a check whose failure is reported but does not reject the submission.
    pub fn add_non_rejecting_check(&mut self, check: Box<dyn Check>) -> &mut Self {
        self.checks.push(RegisteredCheck {
            check,
            rejecting: false,
        });
        self
    }

    /// Registers the check built by `build` from the configuration's properties, as rejecting or
    /// non-rejecting according to the configuration.
    pub fn add_configured_check<F>(
        &mut self,
        configuration: &CheckConfiguration,
        build: F,
    ) -> &mut Self
    where
        F: FnOnce(&BTreeMap<String, String>) -> Box<dyn Check>,
    {
        let check = build(&configuration.properties);
        debug!(
            check = %configuration.check_name,
            rejecting = configuration.rejecting,
            "registering configured check"
        );
        if configuration.rejecting {
            self.add_check(check)
        } else {
            self.add_non_rejecting_check(check)
        }
    }

    pub fn num_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn store(&self) -> &Arc<VersionedFileStore> {
        &self.store
    }

    /// Runs checks in registration order, stopping at the first failing rejecting check.
    ///
    /// Messages keep the order they were produced in. Storage is only touched when no rejecting
    /// check failed; storage faults are returned as errors, never folded into the result.
    pub fn submit(
        &self,
        target: &SubmissionTarget,
        submission: &Submission,
    ) -> Result<SubmissionResult, StorageError> {
        let mut messages = vec![];
        let mut accepted = true;

        if !self.checks.is_empty() {
            let candidate = tempfile::tempdir()?;
            submission.write_to_directory(candidate.path())?;

            for registered in &self.checks {
                let outcome = registered.check.run(candidate.path());
                debug!(
                    check = registered.check.name(),
                    passed = outcome.passed,
                    messages = outcome.messages.len(),
                    "check finished"
                );
                messages.extend(outcome.messages.into_iter().map(CheckMessage::from));

                if !outcome.passed && registered.rejecting {
                    accepted = false;
                    break;
                }
            }
        }

        let version = if accepted {
            Some(self.store.submit_new_version(target, submission)?)
        } else {
            info!(%target, author = submission.author(), "submission rejected by checks");
            None
        };

        Ok(SubmissionResult {
            accepted,
            messages,
            version,
        })
    }
}
