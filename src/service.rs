//! Service layer API combining access checks, the check pipeline and the versioned store
use super::auth::AuthManager;
use super::config::ServiceConfig;
use super::directory::{Collaboration, InMemoryDirectory, Role, StudentManagement};
use super::directory_cache::CourseCache;
use super::error::{ServiceError, StorageError};
use super::pipeline::{CheckPipeline, SubmissionResult};
use super::storage::VersionedFileStore;
use super::submission::{Submission, SubmissionTarget};
use super::version::Version;
use anyhow::Context;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

pub struct SubmissionService {
    directory: Arc<dyn StudentManagement>,
    auth: AuthManager,
    pipeline: CheckPipeline,
}

impl SubmissionService {
    pub fn new(directory: Arc<dyn StudentManagement>, pipeline: CheckPipeline) -> Self {
        Self {
            auth: AuthManager::new(directory.clone()),
            directory,
            pipeline,
        }
    }

    /// Opens the store under the configured root, creating the root if needed.
    ///
    /// The directory is the configured sled course cache, or an empty in-memory directory when
    /// none is configured. Use [`SubmissionService::new`] to supply any other directory.
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let root = config.ensure_storage_root()?;
        let store = VersionedFileStore::open(root)?;

        let directory: Arc<dyn StudentManagement> = match &config.directory_cache {
            Some(path) => {
                let cache = CourseCache::open(path)
                    .with_context(|| format!("failed to open course cache at {}", path.display()))?;
                info!(path = %path.display(), courses = cache.len(), "using course cache");
                Arc::new(cache)
            }
            None => Arc::new(InMemoryDirectory::new()),
        };

        Ok(Self::new(directory, CheckPipeline::new(Arc::new(store))))
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Used at start-up to register checks.
    pub fn pipeline_mut(&mut self) -> &mut CheckPipeline {
        &mut self.pipeline
    }

    pub fn store(&self) -> &VersionedFileStore {
        self.pipeline.store()
    }

    pub fn can_submit(&self, target: &SubmissionTarget, username: &str) -> bool {
        self.auth.can_submit(target, username)
    }

    pub fn can_replay(&self, target: &SubmissionTarget, username: &str) -> bool {
        self.auth.can_replay(target, username)
    }

    pub fn create_or_update_assignment(
        &self,
        course: &str,
        assignment_name: &str,
        group_names: &[&str],
    ) -> Result<(), StorageError> {
        self.store()
            .create_or_update_assignment(course, assignment_name, group_names)
    }

    /// Creates storage for every assignment of a course as the directory currently describes it.
    ///
    /// Groups come from the assignment's group list; for assignments that may be done alone every
    /// student additionally gets a group named after them. Returns false if the course is unknown.
    pub fn prepare_course_storage(&self, course_id: &str) -> Result<bool, StorageError> {
        let Some(course) = self.directory.course(course_id) else {
            return Ok(false);
        };

        for assignment in course.assignments_by_name.values() {
            let mut groups: BTreeSet<&str> =
                assignment.groups_by_name.keys().map(String::as_str).collect();

            if matches!(
                assignment.collaboration,
                Collaboration::Single | Collaboration::GroupOrSingle
            ) {
                groups.extend(
                    course
                        .participants_by_name
                        .values()
                        .filter(|p| p.role == Role::Student)
                        .map(|p| p.name.as_str()),
                );
            }

            self.store()
                .create_or_update_assignment(&course.id, &assignment.name, groups)?;
        }
        Ok(true)
    }

    /// Checks and stores a submission on behalf of `username`.
    ///
    /// Denied requests fail before anything is written, even to a temporary directory.
    pub fn submit(
        &self,
        target: &SubmissionTarget,
        username: &str,
        submission: &Submission,
    ) -> Result<SubmissionResult, ServiceError> {
        if !self.auth.can_submit(target, username) {
            return Err(unauthorized(target, username));
        }

        let result = self.pipeline.submit(target, submission)?;
        info!(%target, username, accepted = result.accepted, "handled submission");
        Ok(result)
    }

    /// Versions of the target group, latest first.
    pub fn list_versions(
        &self,
        target: &SubmissionTarget,
        username: &str,
    ) -> Result<Vec<Version>, ServiceError> {
        self.check_replay(target, username)?;
        Ok(self.store().get_versions(target)?)
    }

    pub fn submission(
        &self,
        target: &SubmissionTarget,
        username: &str,
        version: &Version,
    ) -> Result<Submission, ServiceError> {
        self.check_replay(target, username)?;
        Ok(self.store().get_submission(target, version)?)
    }

    /// The newest version and its files, or `None` if nothing was submitted yet.
    pub fn latest_submission(
        &self,
        target: &SubmissionTarget,
        username: &str,
    ) -> Result<Option<(Version, Submission)>, ServiceError> {
        self.check_replay(target, username)?;

        let Some(version) = self.store().latest_version(target)? else {
            return Ok(None);
        };
        let submission = self.store().get_submission(target, &version)?;
        Ok(Some((version, submission)))
    }

    fn check_replay(&self, target: &SubmissionTarget, username: &str) -> Result<(), ServiceError> {
        if !self.auth.can_replay(target, username) {
            return Err(unauthorized(target, username));
        }
        Ok(())
    }
}

fn unauthorized(target: &SubmissionTarget, username: &str) -> ServiceError {
    ServiceError::Unauthorized {
        username: username.to_owned(),
        target: target.clone(),
    }
}
