use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
    #[error("disconnected graph: {0}")]
    DisconnectedGraph(String),
    #[error("not eulerian: {0}")]
    NotEulerian(String),
    #[error("no perfect matching: {0}")]
    NoPerfectMatching(String),
    #[error("instance too large for exact solver: n={n} threshold={threshold}")]
    InstanceTooLarge { n: usize, threshold: usize },
    #[error("cancelled before {0}")]
    Cancelled(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used by callers that decide whether to retry a job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Io,
    InvalidGraph,
    DisconnectedGraph,
    NotEulerian,
    NoPerfectMatching,
    InstanceTooLarge,
    Cancelled,
    InvalidInput,
    Other,
}

impl Error {
    pub fn invalid_graph(message: impl Into<String>) -> Self {
        Self::InvalidGraph(message.into())
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::DisconnectedGraph(message.into())
    }

    pub fn not_eulerian(message: impl Into<String>) -> Self {
        Self::NotEulerian(message.into())
    }

    pub fn no_perfect_matching(message: impl Into<String>) -> Self {
        Self::NoPerfectMatching(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidGraph(_) => ErrorKind::InvalidGraph,
            Self::DisconnectedGraph(_) => ErrorKind::DisconnectedGraph,
            Self::NotEulerian(_) => ErrorKind::NotEulerian,
            Self::NoPerfectMatching(_) => ErrorKind::NoPerfectMatching,
            Self::InstanceTooLarge { .. } => ErrorKind::InstanceTooLarge,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// `InstanceTooLarge` is a rejection, not a failure: another strategy will succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InstanceTooLarge { .. })
    }

    /// Internal-consistency failures that point at a bug upstream of the caller.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DisconnectedGraph(_) | Self::NotEulerian(_) | Self::NoPerfectMatching(_)
        )
    }
}
