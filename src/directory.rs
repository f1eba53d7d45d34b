//! Read-only view of the student management system: courses, participants, assignments and groups
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    #[n(0)]
    Lecturer,
    #[n(1)]
    Tutor,
    #[n(2)]
    Student,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentState {
    #[n(0)]
    Invisible,
    #[n(1)]
    Closed,
    #[n(2)]
    InProgress,
    #[n(3)]
    InReview,
    #[n(4)]
    Evaluated,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaboration {
    #[n(0)]
    Group,
    #[n(1)]
    Single,
    #[n(2)]
    GroupOrSingle,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    #[n(0)]
    pub mgmt_id: String,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub role: Role,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Group {
    #[n(0)]
    pub mgmt_id: String,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub participants_by_name: BTreeMap<String, Participant>,
}

/// Configuration of an automatic check for one assignment.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct CheckConfiguration {
    #[n(0)]
    pub check_name: String,
    #[n(1)]
    pub rejecting: bool, // failing rejecting checks block the submission
    #[n(2)]
    pub properties: BTreeMap<String, String>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    #[n(0)]
    pub mgmt_id: String,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub state: AssignmentState,
    #[n(3)]
    pub collaboration: Collaboration,
    #[n(4)]
    pub groups_by_name: BTreeMap<String, Group>,
    #[n(5)]
    pub check_configurations: Vec<CheckConfiguration>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Course {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub participants_by_name: BTreeMap<String, Participant>,
    #[n(2)]
    pub assignments_by_name: BTreeMap<String, Assignment>,
}

/// Lookup of course snapshots. Absence is a normal answer, not an error.
pub trait StudentManagement: Send + Sync {
    fn course(&self, course_id: &str) -> Option<Course>;
}

impl Role {
    /// Lecturers and tutors bypass group and state restrictions.
    pub fn is_tutor(self) -> bool {
        matches!(self, Role::Lecturer | Role::Tutor)
    }
}

impl Participant {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        let name = name.into();
        Self {
            mgmt_id: name.clone(),
            name,
            role,
        }
    }
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            mgmt_id: name.clone(),
            name,
            participants_by_name: BTreeMap::new(),
        }
    }
    pub fn add_participant(mut self, participant: Participant) -> Self {
        self.participants_by_name
            .insert(participant.name.clone(), participant);
        self
    }
    pub fn contains(&self, participant_name: &str) -> bool {
        self.participants_by_name.contains_key(participant_name)
    }
}

impl CheckConfiguration {
    pub fn new(check_name: impl Into<String>, rejecting: bool) -> Self {
        Self {
            check_name: check_name.into(),
            rejecting,
            properties: BTreeMap::new(),
        }
    }
    pub fn set_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl Assignment {
    pub fn new(name: impl Into<String>, state: AssignmentState, collaboration: Collaboration) -> Self {
        let name = name.into();
        Self {
            mgmt_id: name.clone(),
            name,
            state,
            collaboration,
            groups_by_name: BTreeMap::new(),
            check_configurations: vec![],
        }
    }
    pub fn add_group(mut self, group: Group) -> Self {
        self.groups_by_name.insert(group.name.clone(), group);
        self
    }
    pub fn add_check_configuration(mut self, configuration: CheckConfiguration) -> Self {
        self.check_configurations.push(configuration);
        self
    }
    pub fn set_state(mut self, state: AssignmentState) -> Self {
        self.state = state;
        self
    }
}

impl Course {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            participants_by_name: BTreeMap::new(),
            assignments_by_name: BTreeMap::new(),
        }
    }
    pub fn add_participant(mut self, participant: Participant) -> Self {
        self.participants_by_name
            .insert(participant.name.clone(), participant);
        self
    }
    pub fn add_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments_by_name
            .insert(assignment.name.clone(), assignment);
        self
    }
    pub fn participant(&self, name: &str) -> Option<&Participant> {
        self.participants_by_name.get(name)
    }
    pub fn assignment(&self, name: &str) -> Option<&Assignment> {
        self.assignments_by_name.get(name)
    }
}

/// A directory kept entirely in memory, replaced wholesale per course.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    courses: RwLock<HashMap<String, Course>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let directory = Self::new();
        for course in courses {
            directory.insert(course);
        }
        directory
    }
    pub fn insert(&self, course: Course) {
        // a poisoned lock still holds a consistent map, every write is a single insert
        let mut courses = self.courses.write().unwrap_or_else(|e| e.into_inner());
        courses.insert(course.id.clone(), course);
    }
}

impl StudentManagement for InMemoryDirectory {
    fn course(&self, course_id: &str) -> Option<Course> {
        let courses = self.courses.read().unwrap_or_else(|e| e.into_inner());
        courses.get(course_id).cloned()
    }
}
