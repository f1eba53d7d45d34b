//! Submitted file sets and the builder that validates them
use super::error::BuildError;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// The (course, assignment, group) triple a submission is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionTarget {
    pub course: String,
    pub assignment_name: String,
    pub group_name: String,
}

/// An immutable set of files keyed by their path relative to the submission root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    author: String,
    files: BTreeMap<PathBuf, Vec<u8>>,
}

/// Accumulates files for exactly one [`Submission`].
#[derive(Debug)]
pub struct SubmissionBuilder {
    author: String,
    files: BTreeMap<PathBuf, Vec<u8>>,
    built: bool,
}

impl SubmissionTarget {
    pub fn new(
        course: impl Into<String>,
        assignment_name: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            course: course.into(),
            assignment_name: assignment_name.into(),
            group_name: group_name.into(),
        }
    }
}

impl fmt::Display for SubmissionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "group {} of assignment {} in course {}",
            self.group_name, self.assignment_name, self.course
        )
    }
}

impl Submission {
    pub fn author(&self) -> &str {
        &self.author
    }
    /// Relative paths of all files, in sorted order.
    pub fn filepaths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
    pub fn files(&self) -> impl Iterator<Item = (&Path, &[u8])> {
        self.files
            .iter()
            .map(|(path, content)| (path.as_path(), content.as_slice()))
    }
    pub fn num_files(&self) -> usize {
        self.files.len()
    }
    pub fn contains_file(&self, filepath: impl AsRef<Path>) -> bool {
        self.files.contains_key(filepath.as_ref())
    }
    pub fn file_content(&self, filepath: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(filepath.as_ref()).map(Vec::as_slice)
    }

    /// Writes every file below `directory`, creating intermediate directories as needed.
    pub fn write_to_directory(&self, directory: &Path) -> io::Result<()> {
        if !directory.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", directory.display()),
            ));
        }

        for (path, content) in &self.files {
            let destination = directory.join(path);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(destination, content)?;
        }
        Ok(())
    }
}

impl SubmissionBuilder {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            files: BTreeMap::new(),
            built: false,
        }
    }

    /// Adds a file, replacing any earlier content for the same path.
    ///
    /// Absolute paths and paths containing a `..` segment are rejected.
    pub fn add_file(
        &mut self,
        filepath: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
    ) -> Result<&mut Self, BuildError> {
        self.check_not_built()?;
        let filepath = normalise_relative(filepath.as_ref())?;
        self.files.insert(filepath, content.into());
        Ok(self)
    }

    pub fn add_utf8_file(
        &mut self,
        filepath: impl AsRef<Path>,
        content: &str,
    ) -> Result<&mut Self, BuildError> {
        self.add_file(filepath, content.as_bytes())
    }

    pub fn build(&mut self) -> Result<Submission, BuildError> {
        self.check_not_built()?;
        self.built = true;

        Ok(Submission {
            author: std::mem::take(&mut self.author),
            files: std::mem::take(&mut self.files),
        })
    }

    fn check_not_built(&self) -> Result<(), BuildError> {
        if self.built {
            return Err(BuildError::AlreadyBuilt);
        }
        Ok(())
    }
}

// `a/./b` becomes `a/b`; root, prefix and `..` components are refused
fn normalise_relative(path: &Path) -> Result<PathBuf, BuildError> {
    let invalid = || BuildError::InvalidPath(path.display().to_string());

    let mut normalised = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalised.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid());
            }
        }
    }

    if normalised.as_os_str().is_empty() {
        return Err(invalid());
    }
    Ok(normalised)
}

/// Renders a relative path with `/` separators regardless of platform.
pub fn path_to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
