use crate::CrawlError;
use std::fmt;

/// Lifecycle of a single crawl
///
/// `Idle → Running → {Completed, Failed}`. Both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlState {
    /// Crawl not yet started
    #[default]
    Idle,
    /// Frontier being drained
    Running,
    /// Report produced
    Completed,
    /// Crawl-fatal error, no report
    Failed,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if moving from `self` to `to` is a legal transition
    pub fn can_transition_to(&self, to: CrawlState) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Failed)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    /// Moves to `to`, or reports the illegal transition
    pub fn transition(&mut self, to: CrawlState) -> Result<(), CrawlError> {
        if !self.can_transition_to(to) {
            return Err(CrawlError::InvalidTransition { from: *self, to });
        }
        tracing::trace!("Crawl state {} -> {}", self, to);
        *self = to;
        Ok(())
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = CrawlState::default();
        assert_eq!(state, CrawlState::Idle);

        state.transition(CrawlState::Running).unwrap();
        state.transition(CrawlState::Completed).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_seed_rejected_before_running() {
        let mut state = CrawlState::Idle;
        state.transition(CrawlState::Failed).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [CrawlState::Completed, CrawlState::Failed] {
            for to in [
                CrawlState::Idle,
                CrawlState::Running,
                CrawlState::Completed,
                CrawlState::Failed,
            ] {
                let mut state = terminal;
                assert!(matches!(
                    state.transition(to),
                    Err(CrawlError::InvalidTransition { .. })
                ));
                assert_eq!(state, terminal);
            }
        }
    }

    #[test]
    fn test_cannot_complete_without_running() {
        let mut state = CrawlState::Idle;
        assert!(state.transition(CrawlState::Completed).is_err());
    }
}
