//! Sled backed cache of course snapshots pulled from the student management system
use super::directory::{Course, StudentManagement};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CourseCache {
    instance: Arc<sled::Db>,
}

impl CourseCache {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }

    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let db = sled::open(path)?;
        Ok(Self::new(Arc::new(db)))
    }

    /// Stores the snapshot of a course, replacing any earlier one.
    pub fn put(&self, course: &Course) -> anyhow::Result<()> {
        let encoded = minicbor::to_vec(course)?;
        self.instance.insert(course.id.as_bytes(), encoded)?;
        self.instance.flush()?;
        debug!(course = %course.id, "cached course snapshot");
        Ok(())
    }

    /// Returns whether a snapshot was present.
    pub fn remove(&self, course_id: &str) -> anyhow::Result<bool> {
        let removed = self.instance.remove(course_id.as_bytes())?;
        Ok(removed.is_some())
    }

    pub fn len(&self) -> usize {
        self.instance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instance.is_empty()
    }
}

impl StudentManagement for CourseCache {
    // unreadable entries count as missing so that access checks deny
    fn course(&self, course_id: &str) -> Option<Course> {
        let bytes = match self.instance.get(course_id.as_bytes()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(error) => {
                warn!(course = course_id, %error, "course cache lookup failed");
                return None;
            }
        };

        match minicbor::decode::<Course>(&bytes) {
            Ok(course) => Some(course),
            Err(error) => {
                warn!(course = course_id, %error, "cached course snapshot is corrupt");
                None
            }
        }
    }
}
