use super::Classification;

/// Decision returned by the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Close the current source and reopen at the last delivered offset.
    Reopen,
    /// Retryable failure, but no attempts left.
    Exhausted,
    /// The blob is gone; stop regardless of budget.
    NotFound,
    /// Caller or internal misuse; stop without retrying.
    Misuse,
}

/// Fixed retry budget of one read session.
///
/// `max_retries` is the transport's own attempt count plus one and never
/// changes after the session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    max_retries: u32,
}

impl RetryBudget {
    pub fn from_transport_attempts(max_transport_attempts: u32) -> Self {
        Self {
            max_retries: max_transport_attempts.saturating_add(1),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Decide what to do about a failure seen on `attempt` (1-based).
    pub fn decide(&self, attempt: u32, kind: Classification) -> RetryDecision {
        match kind {
            Classification::NotFound => RetryDecision::NotFound,
            Classification::Misuse => RetryDecision::Misuse,
            Classification::Retryable if attempt >= self.max_retries => RetryDecision::Exhausted,
            Classification::Retryable => RetryDecision::Reopen,
        }
    }
}
