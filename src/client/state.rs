// Client session phases and the transitions allowed between them

use crate::auth::models::UserResponse;
use std::fmt;

/// Phase of the client-side session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Expired,
    LoggedOut,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Anonymous => "anonymous",
            SessionPhase::Authenticating => "authenticating",
            SessionPhase::Authenticated => "authenticated",
            SessionPhase::Expired => "expired",
            SessionPhase::LoggedOut => "logged_out",
        };
        f.write_str(name)
    }
}

/// Transition rules for [`SessionPhase`]
pub struct PhaseMachine;

impl PhaseMachine {
    /// Check if a phase transition is valid
    ///
    /// # Valid Transitions
    /// - Anonymous → Authenticating, LoggedOut
    /// - Authenticating → Authenticated (success), Anonymous (failure), LoggedOut
    /// - Authenticated → Authenticating (login again), Expired, LoggedOut
    /// - Expired → Anonymous
    /// - LoggedOut → Anonymous
    /// - Any phase → Same phase (idempotent)
    pub fn is_valid_transition(from: SessionPhase, to: SessionPhase) -> bool {
        use SessionPhase::*;

        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (Anonymous, Authenticating)
                | (Anonymous, LoggedOut)
                | (Authenticating, Authenticated)
                | (Authenticating, Anonymous)
                | (Authenticating, LoggedOut)
                | (Authenticated, Authenticating)
                | (Authenticated, Expired)
                | (Authenticated, LoggedOut)
                | (Expired, Anonymous)
                | (LoggedOut, Anonymous)
        )
    }

    pub fn transition(from: SessionPhase, to: SessionPhase) -> Result<SessionPhase, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid session transition from {} to {}", from, to))
        }
    }
}

/// What the client knows about its session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAuthState {
    pub phase: SessionPhase,
    pub user: Option<UserResponse>,
    pub token: Option<String>,
    /// Last user-visible status message
    pub message: String,
}

impl Default for ClientAuthState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Anonymous,
            user: None,
            token: None,
            message: String::new(),
        }
    }
}

impl ClientAuthState {
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    /// Move to `to`, refusing transitions the phase machine does not allow
    pub fn advance(&mut self, to: SessionPhase) -> Result<(), String> {
        self.phase = PhaseMachine::transition(self.phase, to)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionPhase::*;

    const ALL: [SessionPhase; 5] = [Anonymous, Authenticating, Authenticated, Expired, LoggedOut];

    #[test]
    fn test_login_path() {
        assert!(PhaseMachine::is_valid_transition(Anonymous, Authenticating));
        assert!(PhaseMachine::is_valid_transition(Authenticating, Authenticated));
        assert!(PhaseMachine::is_valid_transition(Authenticating, Anonymous));
    }

    #[test]
    fn test_exit_paths_return_to_anonymous() {
        assert!(PhaseMachine::is_valid_transition(Authenticated, Expired));
        assert!(PhaseMachine::is_valid_transition(Expired, Anonymous));
        assert!(PhaseMachine::is_valid_transition(Authenticated, LoggedOut));
        assert!(PhaseMachine::is_valid_transition(LoggedOut, Anonymous));
    }

    #[test]
    fn test_only_authenticated_can_expire() {
        for from in ALL {
            let expected = from == Authenticated || from == Expired;
            assert_eq!(PhaseMachine::is_valid_transition(from, Expired), expected, "{}", from);
        }
    }

    #[test]
    fn test_cannot_skip_authenticating() {
        assert!(!PhaseMachine::is_valid_transition(Anonymous, Authenticated));
        assert!(!PhaseMachine::is_valid_transition(Expired, Authenticated));
        assert!(!PhaseMachine::is_valid_transition(LoggedOut, Authenticated));
    }

    #[test]
    fn test_same_phase_is_idempotent() {
        for phase in ALL {
            assert!(PhaseMachine::is_valid_transition(phase, phase));
        }
    }

    #[test]
    fn test_advance_rejects_invalid_transition() {
        let mut state = ClientAuthState::default();
        let err = state.advance(Authenticated).unwrap_err();
        assert!(err.contains("anonymous to authenticated"));
        assert_eq!(state.phase, Anonymous);

        state.advance(Authenticating).unwrap();
        state.advance(Authenticated).unwrap();
        assert!(state.is_authenticated());
    }
}
