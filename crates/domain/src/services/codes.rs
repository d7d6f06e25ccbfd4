//! Human-readable identifier generation.
//!
//! Users get a global code (`USR-0001`) from a database sequence and a
//! state-scoped code (`TE-EMP-003`) counted per state and role. Tasks get
//! a code derived from their row id (`T100001`).

use crate::models::user::UserRole;

/// Offset added to a task id to form its code.
const TASK_CODE_OFFSET: i64 = 100_000;

/// Formats the global user code for a sequence number.
pub fn global_user_code(seq: i64) -> String {
    format!("USR-{:04}", seq)
}

/// Two-letter state prefix: the first two characters, uppercased.
pub fn state_prefix(state: &str) -> String {
    state.trim().chars().take(2).flat_map(|c| c.to_uppercase()).collect()
}

/// Formats a state-scoped user code for the given counter value.
pub fn state_user_code(state: &str, role: UserRole, counter: i64) -> String {
    format!("{}-{}-{:03}", state_prefix(state), role.code(), counter)
}

/// Formats the task code for a task row id.
pub fn task_code(task_id: i64) -> String {
    format!("T{}", task_id + TASK_CODE_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_user_code_padding() {
        assert_eq!(global_user_code(1), "USR-0001");
        assert_eq!(global_user_code(42), "USR-0042");
        assert_eq!(global_user_code(9999), "USR-9999");
        // Sequences past four digits widen rather than wrap
        assert_eq!(global_user_code(10001), "USR-10001");
    }

    #[test]
    fn test_state_prefix() {
        assert_eq!(state_prefix("Telangana"), "TE");
        assert_eq!(state_prefix("Andhra Pradesh"), "AN");
        assert_eq!(state_prefix("Hyderabad"), "HY");
        assert_eq!(state_prefix("Odisha"), "OD");
        assert_eq!(state_prefix(" odisha "), "OD");
    }

    #[test]
    fn test_state_user_code() {
        assert_eq!(
            state_user_code("Telangana", UserRole::Employee, 3),
            "TE-EMP-003"
        );
        assert_eq!(
            state_user_code("Andhra Pradesh", UserRole::Admin, 12),
            "AN-ADM-012"
        );
        assert_eq!(
            state_user_code("Odisha", UserRole::Superadmin, 1),
            "OD-SUP-001"
        );
    }

    #[test]
    fn test_task_code_offset() {
        assert_eq!(task_code(1), "T100001");
        assert_eq!(task_code(250), "T100250");
    }
}
