//! Smoke screen unit tests for the submission components
//!
//! These span the public API of each module in isolation from the service layer and mostly
//! cover the happy path.

use exercise_submission::{
    auth::{participant_can_access_group, role_can_replay_assignment_state, role_can_submit_to_assignment_state},
    checks::{CheckMessage, MessageType, ResultMessage},
    directory::{Assignment, AssignmentState, Collaboration, Group, Participant, Role},
    error::{BuildError, StorageError},
    storage::VersionedFileStore,
    submission::{SubmissionBuilder, SubmissionTarget},
    version::{TimeStamp, Version},
};
use tempfile::tempdir;

// SUBMISSION MODULE TESTS
#[cfg(test)]
mod submission_tests {
    use super::*;

    /// Files added to the builder are all present in the built submission
    #[test]
    fn builder_collects_files() {
        let mut builder = SubmissionBuilder::new("student1");
        builder
            .add_utf8_file("Main.java", "class Main {}")
            .unwrap()
            .add_file("dir/Util.java", b"class Util {}".to_vec())
            .unwrap();

        let submission = builder.build().unwrap();

        assert_eq!(submission.author(), "student1");
        assert_eq!(submission.num_files(), 2);
        assert!(submission.contains_file("dir/Util.java"));
        assert_eq!(submission.file_content("Main.java"), Some("class Main {}".as_bytes()));
        assert_eq!(submission.file_content("Missing.java"), None);
    }

    /// Absolute paths are rejected before they reach the file map
    #[test]
    fn builder_rejects_absolute_path() {
        let mut builder = SubmissionBuilder::new("student1");

        let result = builder.add_utf8_file("/etc/passwd", "x");

        assert!(matches!(result, Err(BuildError::InvalidPath(_))));
        assert_eq!(builder.build().unwrap().num_files(), 0);
    }

    /// Any `..` segment is rejected, wherever it appears
    #[test]
    fn builder_rejects_parent_segments() {
        let mut builder = SubmissionBuilder::new("student1");

        for path in ["../Main.java", "dir/../Main.java", "dir/.."] {
            assert!(matches!(
                builder.add_utf8_file(path, "x"),
                Err(BuildError::InvalidPath(_))
            ));
        }
        assert!(builder.add_utf8_file("dir/..file", "x").is_ok());
    }

    /// The builder can only be built once and refuses files afterwards
    #[test]
    fn builder_is_single_use() {
        let mut builder = SubmissionBuilder::new("student1");
        builder.build().unwrap();

        assert_eq!(builder.build().unwrap_err(), BuildError::AlreadyBuilt);
        assert_eq!(
            builder.add_utf8_file("Main.java", "x").unwrap_err(),
            BuildError::AlreadyBuilt
        );
    }

    /// Submissions compare by author and exact bytes
    #[test]
    fn submissions_compare_by_value() {
        let build = |content: &str| {
            let mut builder = SubmissionBuilder::new("student1");
            builder.add_utf8_file("Main.java", content).unwrap();
            builder.build().unwrap()
        };

        assert_eq!(build("a"), build("a"));
        assert_ne!(build("a"), build("b"));
    }

    /// Writing to a directory recreates nested sub directories
    #[test]
    fn write_to_directory_creates_parents() {
        let temp_dir = tempdir().unwrap();
        let mut builder = SubmissionBuilder::new("student1");
        builder.add_utf8_file("a/b/c/Deep.java", "deep").unwrap();

        builder.build().unwrap().write_to_directory(temp_dir.path()).unwrap();

        let written = std::fs::read_to_string(temp_dir.path().join("a/b/c/Deep.java")).unwrap();
        assert_eq!(written, "deep");
    }

    /// Target display names every part
    #[test]
    fn target_display() {
        let target = SubmissionTarget::new("java", "exercise01", "Group01");
        assert_eq!(
            target.to_string(),
            "group Group01 of assignment exercise01 in course java"
        );
    }
}

// VERSION MODULE TESTS
#[cfg(test)]
mod version_tests {
    use super::*;

    /// TimeStamp::new() is close to the current time and has whole seconds
    #[test]
    fn timestamp_new_is_now() {
        let ts = TimeStamp::new();
        let diff = (chrono::Utc::now() - ts.to_datetime_utc()).num_seconds().abs();

        assert!(diff <= 1);
        assert_eq!(ts.to_datetime_utc().timestamp_subsec_nanos(), 0);
    }

    /// Specific calendar times map to the expected epoch seconds
    #[test]
    fn timestamp_new_with() {
        let ts = TimeStamp::new_with(2021, 10, 20, 14, 3, 21).unwrap();
        assert_eq!(ts.epoch_seconds(), 1634738601);
        assert!(TimeStamp::new_with(2021, 2, 30, 0, 0, 0).is_none());
    }

    /// The unit name is `<seconds>_<author>` and parses back
    #[test]
    fn unit_name_roundtrip() {
        let version = Version::new("student1", TimeStamp::from_epoch_seconds(1634738601).unwrap());

        assert_eq!(version.to_string(), "1634738601_student1");
        assert_eq!("1634738601_student1".parse::<Version>().unwrap(), version);
    }
}

// CHECKS MODULE TESTS
#[cfg(test)]
mod checks_tests {
    use super::*;

    /// Sorting messages orders by check name, then file, line and column
    #[test]
    fn messages_sort_totally() {
        let mut messages = vec![
            ResultMessage::new("javac", MessageType::Error, "b").with_file("B.java").with_line(1),
            ResultMessage::new("javac", MessageType::Error, "a").with_file("A.java"),
            ResultMessage::new("checkstyle", MessageType::Warning, "c"),
            ResultMessage::new("javac", MessageType::Error, "none"),
        ];
        messages.sort();

        let order: Vec<_> = messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(order, vec!["c", "none", "a", "b"]);
    }

    /// The public message keeps every field
    #[test]
    fn public_message_conversion() {
        let message = ResultMessage::new("javac", MessageType::Warning, "unused")
            .with_file("dir/Main.java")
            .with_line(3)
            .with_column(7);

        let public: CheckMessage = message.into();

        assert_eq!(public.check_name, "javac");
        assert_eq!(public.message_type, MessageType::Warning);
        assert_eq!(public.file.as_deref(), Some("dir/Main.java"));
        assert_eq!((public.line, public.column), (Some(3), Some(7)));
    }
}

// AUTH MODULE TESTS
#[cfg(test)]
mod auth_tests {
    use super::*;

    /// Students may only submit while the assignment is in progress
    #[test]
    fn student_submission_states() {
        assert!(role_can_submit_to_assignment_state(AssignmentState::InProgress, Role::Student));
        assert!(!role_can_submit_to_assignment_state(AssignmentState::Evaluated, Role::Student));
        assert!(role_can_submit_to_assignment_state(AssignmentState::Invisible, Role::Lecturer));
    }

    /// Students may replay while in progress and once evaluated
    #[test]
    fn student_replay_states() {
        assert!(role_can_replay_assignment_state(AssignmentState::Evaluated, Role::Student));
        assert!(!role_can_replay_assignment_state(AssignmentState::InReview, Role::Student));
        assert!(role_can_replay_assignment_state(AssignmentState::InReview, Role::Tutor));
    }

    /// Group membership decides access for group assignments
    #[test]
    fn group_membership() {
        let student = Participant::new("student1", Role::Student);
        let assignment = Assignment::new("ex", AssignmentState::InProgress, Collaboration::Group)
            .add_group(Group::new("Group01").add_participant(student.clone()));

        assert!(participant_can_access_group(&student, &assignment, "Group01"));
        assert!(!participant_can_access_group(&student, &assignment, "Group02"));
    }
}

// STORAGE MODULE TESTS
#[cfg(test)]
mod storage_tests {
    use super::*;

    /// A freshly created group has no versions
    #[test]
    fn fresh_group_is_empty() {
        let temp_dir = tempdir().unwrap();
        let store = VersionedFileStore::open(temp_dir.path()).unwrap();
        store.create_or_update_assignment("java", "exercise01", ["Group01"]).unwrap();

        let target = SubmissionTarget::new("java", "exercise01", "Group01");
        assert!(store.get_versions(&target).unwrap().is_empty());
        assert_eq!(store.latest_version(&target).unwrap(), None);
    }

    /// Unknown targets are reported as such for every operation
    #[test]
    fn unknown_target() {
        let temp_dir = tempdir().unwrap();
        let store = VersionedFileStore::open(temp_dir.path()).unwrap();
        let target = SubmissionTarget::new("java", "exercise01", "Group01");
        let version = Version::from_unit_name("1634738601_student1").unwrap();

        assert!(matches!(
            store.get_versions(&target),
            Err(StorageError::NoSuchTarget { .. })
        ));
        assert!(matches!(
            store.get_submission(&target, &version),
            Err(StorageError::NoSuchTarget { .. })
        ));
    }

    /// Submitting with the system clock stores a readable version
    #[test]
    fn submit_with_system_clock() {
        let temp_dir = tempdir().unwrap();
        let store = VersionedFileStore::open(temp_dir.path()).unwrap();
        store.create_or_update_assignment("java", "exercise01", ["Group01"]).unwrap();
        let target = SubmissionTarget::new("java", "exercise01", "Group01");

        let mut builder = SubmissionBuilder::new("student1");
        builder.add_utf8_file("Main.java", "class Main {}").unwrap();
        let submission = builder.build().unwrap();

        let version = store.submit_new_version(&target, &submission).unwrap();

        assert_eq!(store.get_submission(&target, &version).unwrap(), submission);
    }
}
