use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// Upstream draw source unreachable, timed out or refused the request.
    DrawFetchFailed(String),
    /// Draw payload arrived but does not have the expected shape.
    DrawParseFailed(String),
    /// Ticket id unknown to the store, or not owned by the user.
    InvalidTicketReference(i64),
    Store(anyhow::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::DrawFetchFailed(msg) => write!(f, "Draw fetch failed: {}", msg),
            EngineError::DrawParseFailed(msg) => write!(f, "Draw parse failed: {}", msg),
            EngineError::InvalidTicketReference(id) => write!(f, "Invalid ticket reference: {}", id),
            EngineError::Store(e) => write!(f, "Store error: {:#}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::DrawFetchFailed(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::DrawParseFailed(err.to_string())
    }
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Store(err)
    }
}
