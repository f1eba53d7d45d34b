//! Access decisions for submitting to and replaying from a submission target
//!
//! A decision is the conjunction of two independent policies: whether the participant may touch the
//! target group at all, and whether the assignment's current state permits the operation for the
//! participant's role. Missing course, participant or assignment data always denies.
use super::directory::{Assignment, AssignmentState, Collaboration, Participant, Role, StudentManagement};
use super::submission::SubmissionTarget;
use std::sync::Arc;
use tracing::info;

type StateGate = fn(AssignmentState, Role) -> bool;

pub struct AuthManager {
    directory: Arc<dyn StudentManagement>,
}

pub fn role_can_submit_to_assignment_state(state: AssignmentState, role: Role) -> bool {
    role.is_tutor() || state == AssignmentState::InProgress
}

pub fn role_can_replay_assignment_state(state: AssignmentState, role: Role) -> bool {
    role.is_tutor() || matches!(state, AssignmentState::InProgress | AssignmentState::Evaluated)
}

pub fn participant_can_access_group(
    participant: &Participant,
    assignment: &Assignment,
    target_group_name: &str,
) -> bool {
    if participant.role.is_tutor() {
        return true;
    }

    let own_group = || target_group_name == participant.name;
    let member_of_group = || {
        assignment
            .groups_by_name
            .get(target_group_name)
            .is_some_and(|group| group.contains(&participant.name))
    };

    match assignment.collaboration {
        Collaboration::Single => own_group(),
        Collaboration::Group => member_of_group(),
        Collaboration::GroupOrSingle => own_group() || member_of_group(),
    }
}

impl AuthManager {
    pub fn new(directory: Arc<dyn StudentManagement>) -> Self {
        Self { directory }
    }

    pub fn can_submit(&self, target: &SubmissionTarget, username: &str) -> bool {
        self.is_allowed(target, username, "submission", role_can_submit_to_assignment_state)
    }

    pub fn can_replay(&self, target: &SubmissionTarget, username: &str) -> bool {
        self.is_allowed(target, username, "replay", role_can_replay_assignment_state)
    }

    fn is_allowed(
        &self,
        target: &SubmissionTarget,
        username: &str,
        operation: &str,
        state_gate: StateGate,
    ) -> bool {
        let Some(course) = self.directory.course(&target.course) else {
            info!("Course {} does not exist", target.course);
            return false;
        };
        let Some(participant) = course.participant(username) else {
            info!("Participant {username} does not exist in course {}", course.id);
            return false;
        };
        let Some(assignment) = course.assignment(&target.assignment_name) else {
            info!("Assignment {} does not exist", target.assignment_name);
            return false;
        };

        if !participant_can_access_group(participant, assignment, &target.group_name) {
            info!(
                "Participant {username} is not allowed to access group {}",
                target.group_name
            );
            return false;
        }
        if !state_gate(assignment.state, participant.role) {
            info!(
                "Assignment state {:?} does not allow {operation} by role {:?}",
                assignment.state, participant.role
            );
            return false;
        }

        true
    }
}
