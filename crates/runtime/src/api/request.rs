//! Request payloads accepted by the service.

use escape_core::{LoopId, ValidationError};

/// Body of a completion report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub loop_id: LoopId,
    pub success: bool,
}

impl CompletionRequest {
    pub fn new(loop_id: LoopId, success: bool) -> Self {
        Self { loop_id, success }
    }

    /// Parse the textual form a transport receives.
    ///
    /// `success` accepts `true`/`false`/`1`/`0`, case-insensitively.
    pub fn from_raw(loop_id: &str, success: &str) -> Result<Self, ValidationError> {
        let loop_id = LoopId::parse(loop_id)?;
        let success = match success.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => {
                return Err(ValidationError::MalformedSuccess {
                    input: success.to_string(),
                });
            }
        };
        Ok(Self { loop_id, success })
    }
}
