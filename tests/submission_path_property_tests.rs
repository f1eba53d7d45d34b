//! Property-based tests for submission path validation
//!
//! Files can only ever land inside the version unit they are stored in, so the builder must
//! refuse anything that could climb out of it.

use exercise_submission::{
    error::BuildError,
    submission::{SubmissionBuilder, path_to_slash},
};
use proptest::prelude::*;
use std::path::Path;
use tempfile::tempdir;

// PROPERTY TEST STRATEGIES

/// Strategy to generate a plain file or directory name
fn segment_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,10}(\\.[a-z]{1,4})?"
}

/// Strategy to generate a relative path of one to four plain segments
fn relative_path_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment_strategy(), 1..=4)
}

// PROPERTY TESTS
proptest! {
    /// Property: absolute paths are always rejected
    #[test]
    fn prop_absolute_paths_rejected(segments in relative_path_strategy()) {
        let path = format!("/{}", segments.join("/"));
        let mut builder = SubmissionBuilder::new("student1");

        prop_assert!(matches!(
            builder.add_utf8_file(&path, "x"),
            Err(BuildError::InvalidPath(_))
        ));
    }

    /// Property: a `..` segment anywhere in the path is always rejected
    #[test]
    fn prop_parent_segments_rejected(
        segments in relative_path_strategy(),
        position in 0usize..=4,
    ) {
        let mut segments = segments;
        let position = position.min(segments.len());
        segments.insert(position, "..".to_owned());
        let path = segments.join("/");
        let mut builder = SubmissionBuilder::new("student1");

        prop_assert!(matches!(
            builder.add_utf8_file(&path, "x"),
            Err(BuildError::InvalidPath(_))
        ));
        prop_assert_eq!(builder.build().unwrap().num_files(), 0);
    }

    /// Property: plain relative paths are kept and read back as `/`-separated strings
    #[test]
    fn prop_relative_paths_kept(segments in relative_path_strategy(), content in ".{0,64}") {
        let path = segments.join("/");
        let mut builder = SubmissionBuilder::new("student1");
        builder.add_utf8_file(&path, &content).unwrap();

        let submission = builder.build().unwrap();

        let paths: Vec<String> = submission.filepaths().map(path_to_slash).collect();
        prop_assert_eq!(paths, vec![path.clone()]);
        prop_assert_eq!(submission.file_content(&path), Some(content.as_bytes()));
    }

    /// Property: a builder refuses both another build and further files once built
    #[test]
    fn prop_builder_single_use(segments in relative_path_strategy()) {
        let mut builder = SubmissionBuilder::new("student1");
        builder.add_utf8_file(segments.join("/"), "x").unwrap();
        builder.build().unwrap();

        prop_assert_eq!(builder.build().unwrap_err(), BuildError::AlreadyBuilt);
        prop_assert_eq!(
            builder.add_utf8_file(segments.join("/"), "y").unwrap_err(),
            BuildError::AlreadyBuilt
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: written files stay inside the target directory with their exact bytes
    #[test]
    fn prop_written_files_stay_inside(
        files in prop::collection::btree_map(relative_path_strategy(), prop::collection::vec(any::<u8>(), 0..128), 1..5),
    ) {
        let temp_dir = tempdir().unwrap();
        let mut builder = SubmissionBuilder::new("student1");
        for (segments, content) in &files {
            builder.add_file(segments.join("/"), content.clone()).unwrap();
        }
        let submission = builder.build().unwrap();

        // a path may be both a file and a parent directory of another generated path
        if submission.write_to_directory(temp_dir.path()).is_err() {
            return Ok(());
        }

        for (path, content) in submission.files() {
            let written = std::fs::read(temp_dir.path().join(path)).unwrap();
            prop_assert_eq!(written.as_slice(), content);
            prop_assert!(temp_dir.path().join(path).starts_with(temp_dir.path()));
            prop_assert!(!Path::new(path).is_absolute());
        }
    }
}
