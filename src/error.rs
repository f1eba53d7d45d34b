use std::path::PathBuf;

use crate::submission::SubmissionTarget;
use crate::version::Version;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("{0} is not a valid relative submission path")]
    InvalidPath(String),
    #[error("build() was already called")]
    AlreadyBuilt,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidVersionName {
    #[error("Missing _ in version {0:?}")]
    MissingSeparator(String),
    #[error("No author in version {0:?}")]
    NoAuthor(String),
    #[error("Invalid timestamp in version {0:?}")]
    InvalidTimestamp(String),
    #[error("Author {0:?} cannot be used in a version name")]
    UnsafeAuthor(String),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("The group {group} for assignment {assignment} in course {course} does not exist")]
    NoSuchTarget {
        course: String,
        assignment: String,
        group: String,
    },
    #[error("The version {} does not exist for {target}", .version.epoch_seconds())]
    NoSuchVersion {
        target: SubmissionTarget,
        version: Version,
    },
    #[error("Version already exists")]
    VersionAlreadyExists,
    #[error(transparent)]
    InvalidVersionName(#[from] InvalidVersionName),
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn no_such_target(target: &SubmissionTarget) -> Self {
        StorageError::NoSuchTarget {
            course: target.course.clone(),
            assignment: target.assignment_name.clone(),
            group: target.group_name.clone(),
        }
    }

    /// True for both a missing group directory and a missing version unit.
    pub fn is_no_such_target(&self) -> bool {
        matches!(
            self,
            StorageError::NoSuchTarget { .. } | StorageError::NoSuchVersion { .. }
        )
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("{username} is not allowed to access {target}")]
    Unauthorized {
        username: String,
        target: SubmissionTarget,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),
    #[error("Storage root {0} could not be prepared: {1}")]
    StorageRoot(PathBuf, std::io::Error),
    #[error("Failed to load .env file: {0}")]
    Dotenv(dotenvy::Error),
}
