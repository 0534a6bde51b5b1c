//! Failures of a single poll cycle

use hwstatus_client::ClientError;
use hwstatus_core::domain::StatusError;
use hwstatus_core::dto::ResponseError;
use thiserror::Error;

/// Coarse classification of a [`PollError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Decode,
    Shape,
    Content,
    Notify,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Decode => write!(f, "decode"),
            FailureKind::Shape => write!(f, "shape"),
            FailureKind::Content => write!(f, "content"),
            FailureKind::Notify => write!(f, "notify"),
        }
    }
}

/// The answer was well-formed but carries nothing to report
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Список работ пуст")]
    EmptyHomeworks,

    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Everything that can go wrong in one poll cycle
///
/// The display text is what ends up in the error notification.
#[derive(Debug, Error)]
pub enum PollError {
    /// Status API unreachable or answered with a bad status
    #[error(transparent)]
    Transport(ClientError),

    /// Status API body is not JSON
    #[error(transparent)]
    Decode(ClientError),

    /// Status API body has the wrong structure
    #[error(transparent)]
    Shape(ResponseError),

    /// Nothing usable in the body
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The status notification could not be delivered
    #[error("Не удалось отправить сообщение: {0}")]
    Notify(ClientError),
}

impl PollError {
    /// Classification of this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            PollError::Transport(_) => FailureKind::Transport,
            PollError::Decode(_) => FailureKind::Decode,
            PollError::Shape(_) => FailureKind::Shape,
            PollError::Content(_) => FailureKind::Content,
            PollError::Notify(_) => FailureKind::Notify,
        }
    }
}

/// Errors of the status API call
impl From<ClientError> for PollError {
    fn from(err: ClientError) -> Self {
        if err.is_decode() {
            PollError::Decode(err)
        } else {
            PollError::Transport(err)
        }
    }
}

impl From<ResponseError> for PollError {
    fn from(err: ResponseError) -> Self {
        if err.is_shape() {
            PollError::Shape(err)
        } else {
            ContentError::EmptyHomeworks.into()
        }
    }
}

impl From<StatusError> for PollError {
    fn from(err: StatusError) -> Self {
        ContentError::from(err).into()
    }
}
