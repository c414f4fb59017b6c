//! Completion events and loop identifiers.

use crate::error::ValidationError;
use crate::state::{Timestamp, UserId};

/// Identifier of a loop in the content catalog.
///
/// The stats core never resolves it; it is carried through to the audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LoopId(pub u32);

impl LoopId {
    /// Parses a textual loop id, as received from a request.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        input
            .trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ValidationError::MalformedLoopId {
                input: input.to_string(),
            })
    }
}

impl std::fmt::Display for LoopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LoopId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One attempt at a loop, timestamped when the service processed it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompletionEvent {
    pub user_id: UserId,
    pub loop_id: LoopId,
    pub success: bool,
    pub timestamp: Timestamp,
}

impl CompletionEvent {
    pub fn new(user_id: UserId, loop_id: LoopId, success: bool, timestamp: Timestamp) -> Self {
        Self {
            user_id,
            loop_id,
            success,
            timestamp,
        }
    }
}
