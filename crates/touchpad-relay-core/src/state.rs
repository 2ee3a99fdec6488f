//! Relay loop state machine.

/// State of the relay loop.
///
/// Moves strictly forward: `Idle → Running → Stopping → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoopState {
    /// Constructed, source not yet grabbed.
    Idle,
    /// Source grabbed, waiting on the source and the cancellation channel.
    Running,
    /// Cancelled or failed; releasing the source.
    Stopping,
    /// Source released, loop finished.
    Stopped,
}

impl LoopState {
    /// Whether the loop may move from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running | Self::Stopping)
                | (Self::Running, Self::Stopping)
                | (Self::Stopping, Self::Stopped)
        )
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Stopping => write!(f, "Stopping"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_only() {
        assert!(LoopState::Idle.can_transition_to(LoopState::Running));
        assert!(LoopState::Running.can_transition_to(LoopState::Stopping));
        assert!(LoopState::Stopping.can_transition_to(LoopState::Stopped));
        // Grab failure skips Running.
        assert!(LoopState::Idle.can_transition_to(LoopState::Stopping));

        assert!(!LoopState::Stopped.can_transition_to(LoopState::Running));
        assert!(!LoopState::Stopping.can_transition_to(LoopState::Running));
        assert!(!LoopState::Running.can_transition_to(LoopState::Idle));
        assert!(!LoopState::Running.can_transition_to(LoopState::Stopped));
    }

    #[test]
    fn display() {
        assert_eq!(LoopState::Running.to_string(), "Running");
    }
}
