//! Failure taxonomy for the advisory gateway.
//!
//! Every fallible seam in the crate reports one of these variants:
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | [`DeviceUnavailable`](AdvisoryError::DeviceUnavailable) | audio capture start |
//! | [`NoActiveCapture`](AdvisoryError::NoActiveCapture) | audio capture stop without start |
//! | [`Decode`](AdvisoryError::Decode) | image pre-processing |
//! | [`InvalidQuery`](AdvisoryError::InvalidQuery) | query construction |
//! | [`Transport`](AdvisoryError::Transport) | remote calls (network / timeout) |
//! | [`Server`](AdvisoryError::Server) | remote calls (non-2xx status) |
//! | [`MalformedResponse`](AdvisoryError::MalformedResponse) | remote calls (2xx but unusable body) |
//!
//! Nothing here is fatal to the process; callers catch at the action boundary
//! and decide between surfacing the error and substituting fallback data.

use thiserror::Error;

/// Errors produced by capture, pre-processing, and remote advisory calls.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// No audio device exists or permission to use it was denied.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// `stop()` was called on a recorder that was never started.
    #[error("no active capture session")]
    NoActiveCapture,

    /// The image bytes could not be decoded.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// The query carried none of text, image, or audio.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The remote service answered with a non-2xx status.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// A 2xx response that could not be parsed or is missing required fields.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl AdvisoryError {
    /// True for failures where fallback data substitution is appropriate
    /// (any remote-call failure, as opposed to local capture/decode errors).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AdvisoryError::Transport(_)
                | AdvisoryError::Server { .. }
                | AdvisoryError::MalformedResponse(_)
        )
    }
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(err: reqwest::Error) -> Self {
        AdvisoryError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_classification() {
        assert!(AdvisoryError::Server {
            status: 500,
            message: "boom".into()
        }
        .is_remote());
        assert!(AdvisoryError::MalformedResponse("empty".into()).is_remote());
        assert!(!AdvisoryError::NoActiveCapture.is_remote());
        assert!(!AdvisoryError::Decode("bad magic".into()).is_remote());
    }

    #[test]
    fn display_includes_status() {
        let err = AdvisoryError::Server {
            status: 503,
            message: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "server error 503: overloaded");
    }
}
