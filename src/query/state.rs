use crate::core::FetchError;

/// Observable state of one polling coordinator.
///
/// Once a fetch has succeeded, every later state keeps that value reachable
/// through [`QueryState::latest_value`], so consumers never fall back to a
/// blank view while a refetch is in flight or after a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Idle,
    Loading { previous: Option<T> },
    Success { value: T, fetched_at_ms: i64 },
    Failed { error: FetchError, previous: Option<T> },
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> QueryState<T> {
    /// The last successfully fetched value, if any fetch has ever succeeded.
    pub fn latest_value(&self) -> Option<&T> {
        match self {
            QueryState::Idle => None,
            QueryState::Loading { previous } => previous.as_ref(),
            QueryState::Success { value, .. } => Some(value),
            QueryState::Failed { previous, .. } => previous.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            QueryState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn fetched_at_ms(&self) -> Option<i64> {
        match self {
            QueryState::Success { fetched_at_ms, .. } => Some(*fetched_at_ms),
            _ => None,
        }
    }

    pub fn has_loaded(&self) -> bool {
        self.latest_value().is_some()
    }

    /// Nothing to show yet: the full loading indicator applies.
    pub fn is_initial_loading(&self) -> bool {
        matches!(self, QueryState::Idle | QueryState::Loading { previous: None })
    }

    /// A refetch is in flight over a value that is still displayed.
    pub fn is_refreshing(&self) -> bool {
        matches!(self, QueryState::Loading { previous: Some(_) })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueryState::Failed { .. })
    }
}

impl<T: Clone> QueryState<T> {
    fn begin_loading(&self) -> Self {
        QueryState::Loading {
            previous: self.latest_value().cloned(),
        }
    }

    fn fail(&self, error: FetchError) -> Self {
        QueryState::Failed {
            error,
            previous: self.latest_value().cloned(),
        }
    }
}

/// Outcome of feeding a completed response into the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued after this one; its result was dropped.
    Superseded { latest: u64 },
}

/// State machine plus the monotonically increasing request counter.
///
/// Only the response to the most recently issued request may update the
/// state; anything older is discarded on arrival.
#[derive(Debug, Clone)]
pub struct RequestSequencer<T> {
    state: QueryState<T>,
    latest_issued: u64,
}

impl<T: Clone> RequestSequencer<T> {
    pub fn new() -> Self {
        Self::with_state(QueryState::Idle)
    }

    pub fn with_state(state: QueryState<T>) -> Self {
        Self {
            state,
            latest_issued: 0,
        }
    }

    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    pub fn latest_issued(&self) -> u64 {
        self.latest_issued
    }

    /// Record a new request issuance and return its sequence number.
    pub fn issue(&mut self) -> u64 {
        self.latest_issued += 1;
        self.state = self.state.begin_loading();
        self.latest_issued
    }

    pub fn complete(
        &mut self,
        seq: u64,
        result: Result<T, FetchError>,
        now_ms: i64,
    ) -> Completion {
        if seq != self.latest_issued {
            return Completion::Superseded {
                latest: self.latest_issued,
            };
        }

        self.state = match result {
            Ok(value) => QueryState::Success {
                value,
                fetched_at_ms: now_ms,
            },
            Err(error) => self.state.fail(error),
        };
        Completion::Applied
    }
}

impl<T: Clone> Default for RequestSequencer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_down() -> FetchError {
        FetchError::transport("connection refused")
    }

    #[test]
    fn test_first_issue_loads_without_previous() {
        let mut seq = RequestSequencer::<u32>::new();
        assert_eq!(*seq.state(), QueryState::Idle);
        assert!(seq.state().is_initial_loading());

        seq.issue();
        assert_eq!(*seq.state(), QueryState::Loading { previous: None });
        assert!(seq.state().is_initial_loading());
        assert!(!seq.state().is_refreshing());
    }

    #[test]
    fn test_refetch_keeps_previous_value_visible() {
        let mut seq = RequestSequencer::new();
        let first = seq.issue();
        assert_eq!(seq.complete(first, Ok(7u32), 100), Completion::Applied);
        assert_eq!(seq.state().fetched_at_ms(), Some(100));

        seq.issue();
        assert_eq!(*seq.state(), QueryState::Loading { previous: Some(7) });
        assert!(seq.state().is_refreshing());
        assert_eq!(seq.state().latest_value(), Some(&7));
    }

    #[test]
    fn test_failure_retains_last_good_value() {
        let mut seq = RequestSequencer::new();
        let first = seq.issue();
        seq.complete(first, Ok("head-1".to_string()), 10);

        let second = seq.issue();
        seq.complete(second, Err(transport_down()), 20);
        assert_eq!(
            *seq.state(),
            QueryState::Failed {
                error: transport_down(),
                previous: Some("head-1".to_string()),
            }
        );

        // the next cycle goes back to loading over the same value
        seq.issue();
        assert_eq!(seq.state().latest_value().map(String::as_str), Some("head-1"));
        assert!(seq.state().error().is_none());
    }

    #[test]
    fn test_failure_before_any_success_has_no_previous() {
        let mut seq = RequestSequencer::<u32>::new();
        let first = seq.issue();
        seq.complete(first, Err(transport_down()), 5);
        assert!(seq.state().is_failed());
        assert!(!seq.state().has_loaded());
        assert!(!seq.state().is_initial_loading());
    }

    #[test]
    fn test_superseded_response_is_discarded_in_either_order() {
        // A issued at t0, B at t1; B finishes first, then A.
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert_eq!(seq.complete(b, Ok("B"), 3), Completion::Applied);
        assert_eq!(seq.complete(a, Ok("A"), 4), Completion::Superseded { latest: b });
        assert_eq!(seq.state().latest_value(), Some(&"B"));

        // A finishes first, then B.
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert_eq!(seq.complete(a, Ok("A"), 2), Completion::Superseded { latest: b });
        assert_eq!(*seq.state(), QueryState::Loading { previous: None });
        assert_eq!(seq.complete(b, Ok("B"), 3), Completion::Applied);
        assert_eq!(seq.state().latest_value(), Some(&"B"));
    }

    #[test]
    fn test_stale_failure_cannot_clobber_newer_success() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        seq.complete(b, Ok(2u8), 1);
        seq.complete(a, Err(transport_down()), 2);
        assert_eq!(
            *seq.state(),
            QueryState::Success {
                value: 2,
                fetched_at_ms: 1
            }
        );
    }

    #[test]
    fn test_sequence_numbers_increase_monotonically() {
        let mut seq = RequestSequencer::<()>::new();
        let issued: Vec<u64> = (0..5).map(|_| seq.issue()).collect();
        assert_eq!(issued, vec![1, 2, 3, 4, 5]);
        assert_eq!(seq.latest_issued(), 5);
    }
}
