//! Append-only, versioned storage of submissions on a directory tree
//!
//! Layout: `<base>/<course>/<assignment>/<group>/<epochSeconds>_<author>/<files>`.
//! A version unit is claimed with a single directory creation, which is the only tie-breaker
//! between concurrent writers. Readers are not synchronised with writers and may observe the
//! newest unit before all of its files are written.
use super::clock::{Clock, SystemClock};
use super::error::{InvalidVersionName, StorageError};
use super::fs::{Filesystem, OsFilesystem};
use super::submission::{Submission, SubmissionBuilder, SubmissionTarget};
use super::version::Version;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct VersionedFileStore {
    base_directory: PathBuf,
    fs: Arc<dyn Filesystem>,
    clock: Arc<dyn Clock>,
}

impl VersionedFileStore {
    /// Opens a store rooted at an existing directory.
    pub fn open(base_directory: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::with_parts(base_directory, Arc::new(OsFilesystem), Arc::new(SystemClock))
    }

    pub fn with_parts(
        base_directory: impl Into<PathBuf>,
        fs: Arc<dyn Filesystem>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StorageError> {
        let base_directory = base_directory.into();
        if !fs.is_dir(&base_directory) {
            return Err(StorageError::NotADirectory(base_directory));
        }
        Ok(Self {
            base_directory,
            fs,
            clock,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Ensures the assignment directory and the given group directories exist.
    ///
    /// Groups already present but not listed are left untouched.
    pub fn create_or_update_assignment<I, S>(
        &self,
        course: &str,
        assignment_name: &str,
        group_names: I,
    ) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in [course, assignment_name] {
            if !is_single_segment(name) {
                return Err(invalid_name(name));
            }
        }
        let assignment_dir = self.base_directory.join(course).join(assignment_name);
        self.fs.create_dir_all(&assignment_dir)?;

        for group_name in group_names {
            let group_name = group_name.as_ref();
            if !is_single_segment(group_name) {
                return Err(invalid_name(group_name));
            }
            let group_dir = assignment_dir.join(group_name);
            if !self.fs.is_dir(&group_dir) {
                self.fs.create_dir_all(&group_dir)?;
                debug!(course, assignment_name, group_name, "created group directory");
            }
        }
        Ok(())
    }

    /// Stores `submission` as a new version created now.
    ///
    /// Fails with [`StorageError::VersionAlreadyExists`] if any version of the group, by any
    /// author, was created within the same second.
    pub fn submit_new_version(
        &self,
        target: &SubmissionTarget,
        submission: &Submission,
    ) -> Result<Version, StorageError> {
        let group_dir = self.existing_group_path(target)?;

        if submission.author().is_empty() {
            return Err(InvalidVersionName::NoAuthor(String::new()).into());
        }
        if !is_single_segment(submission.author()) {
            return Err(InvalidVersionName::UnsafeAuthor(submission.author().to_owned()).into());
        }

        let version = Version::new(submission.author(), self.clock.now());
        let prefix = version.unit_name_prefix();

        let version_already_exists = self
            .fs
            .list_names(&group_dir)?
            .iter()
            .any(|name| name.starts_with(&prefix));
        if version_already_exists {
            warn!(%target, second = version.epoch_seconds(), "version collision");
            return Err(StorageError::VersionAlreadyExists);
        }

        let version_dir = group_dir.join(version.to_unit_name());
        match self.fs.create_dir(&version_dir) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                warn!(%target, %version, "lost race creating version");
                return Err(StorageError::VersionAlreadyExists);
            }
            Err(error) => return Err(error.into()),
        }

        if let Err(error) = self.write_files(&version_dir, submission) {
            if let Err(cleanup) = self.fs.remove_dir_all(&version_dir) {
                warn!(%target, %version, %cleanup, "could not remove partially written version");
            }
            return Err(error.into());
        }

        info!(%target, %version, files = submission.num_files(), "stored new version");
        Ok(version)
    }

    /// All versions of the target group, latest first.
    pub fn get_versions(&self, target: &SubmissionTarget) -> Result<Vec<Version>, StorageError> {
        let group_dir = self.existing_group_path(target)?;

        let mut versions = self
            .fs
            .list_names(&group_dir)?
            .iter()
            .map(|name| Version::from_unit_name(name))
            .collect::<Result<Vec<_>, _>>()?;

        versions.sort_by(|a, b| {
            b.creation_time()
                .cmp(&a.creation_time())
                .then_with(|| a.author().cmp(b.author()))
        });
        Ok(versions)
    }

    pub fn latest_version(&self, target: &SubmissionTarget) -> Result<Option<Version>, StorageError> {
        Ok(self.get_versions(target)?.into_iter().next())
    }

    /// Reads back the files of one version, keyed by their path inside the version unit.
    pub fn get_submission(
        &self,
        target: &SubmissionTarget,
        version: &Version,
    ) -> Result<Submission, StorageError> {
        let group_dir = self.existing_group_path(target)?;

        let no_such_version = || StorageError::NoSuchVersion {
            target: target.clone(),
            version: version.clone(),
        };
        if !is_single_segment(version.author()) {
            return Err(no_such_version());
        }
        let version_dir = group_dir.join(version.to_unit_name());
        if !self.fs.is_dir(&version_dir) {
            return Err(no_such_version());
        }

        let mut builder = SubmissionBuilder::new(version.author());
        for file in self.fs.walk_files(&version_dir)? {
            let relative = file
                .strip_prefix(&version_dir)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let content = self.fs.read(&file)?;
            builder
                .add_file(relative, content)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        }

        let submission = builder
            .build()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(submission)
    }

    fn existing_group_path(&self, target: &SubmissionTarget) -> Result<PathBuf, StorageError> {
        let segments = [&target.course, &target.assignment_name, &target.group_name];
        if !segments.iter().all(|s| is_single_segment(s)) {
            return Err(StorageError::no_such_target(target));
        }

        let path = self
            .base_directory
            .join(&target.course)
            .join(&target.assignment_name)
            .join(&target.group_name);
        if !self.fs.is_dir(&path) {
            return Err(StorageError::no_such_target(target));
        }
        Ok(path)
    }

    fn write_files(&self, version_dir: &Path, submission: &Submission) -> io::Result<()> {
        for (path, content) in submission.files() {
            let destination = version_dir.join(path);
            if let Some(parent) = destination.parent() {
                self.fs.create_dir_all(parent)?;
            }
            self.fs.write(&destination, content)?;
        }
        Ok(())
    }
}

// a name usable as exactly one directory level
fn is_single_segment(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn invalid_name(name: &str) -> StorageError {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{name:?} is not a valid directory name"),
    )
    .into()
}
