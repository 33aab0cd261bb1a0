use crate::guard::{Generation, GuardState};
use thiserror::Error;

/// Why an input was turned away. These are ordinary outcomes of racing
/// input, logged and otherwise ignored; state is left exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("index {index} out of range for ring of {len}")]
    InvalidIndex { index: usize, len: usize },
    #[error("guard busy ({0})")]
    Busy(GuardState),
    #[error("stale completion from {0}")]
    StaleCallback(Generation),
    #[error("ring is empty")]
    EmptyRing,
    #[error("drag delta is not a finite angle")]
    NonFiniteDelta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Accepted => None,
            Self::Rejected(r) => Some(*r),
        }
    }

    /// Logs a rejection at the level it deserves and passes the outcome on.
    pub(crate) fn logged(self, what: &str) -> Self {
        match self {
            Self::Rejected(r @ Rejection::StaleCallback(_)) => log::trace!("{what}: {r}"),
            Self::Rejected(r) => log::debug!("{what} rejected: {r}"),
            Self::Accepted => {}
        }
        self
    }
}

impl From<Result<(), Rejection>> for Outcome {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Self::Accepted,
            Err(r) => Self::Rejected(r),
        }
    }
}
