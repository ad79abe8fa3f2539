use miette::Diagnostic;

use volley_sbl::SblError;

/// Errors raised while configuring or driving the dispatch loop.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    Sbl(#[from] SblError),
    #[error("Failed to read \"{path}\": {message}")]
    FileRead { path: String, message: String },
    #[error("Invalid URL \"{url}\": {message}")]
    InvalidUrl { url: String, message: String },
    #[error("Invalid form file \"{path}\": {message}")]
    FormSpec { path: String, message: String },
}

impl Diagnostic for CoreError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            CoreError::Sbl(error) => error.code(),
            CoreError::FileRead { .. } => Some(Box::new("CoreError::FileRead")),
            CoreError::InvalidUrl { .. } => Some(Box::new("CoreError::InvalidUrl")),
            CoreError::FormSpec { .. } => Some(Box::new("CoreError::FormSpec")),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match self {
            CoreError::Sbl(error) => return error.help(),
            CoreError::FileRead { .. } => "Check that the file exists and is readable.",
            CoreError::InvalidUrl { .. } => {
                "The rendered target must be an absolute URL, e.g. \"http://example.com/\"."
            }
            CoreError::FormSpec { .. } => {
                "The form file must be JSON with a top-level \"form\" object."
            }
        };

        Some(Box::new(msg))
    }
}

/// Errors raised by the in-flight request list on handle misuse.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AliveError {
    #[error("Handle belongs to another list.")]
    ForeignHandle,
    #[error("Handle was already removed.")]
    StaleHandle,
}

impl Diagnostic for AliveError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            AliveError::ForeignHandle => Some(Box::new("AliveError::ForeignHandle")),
            AliveError::StaleHandle => Some(Box::new("AliveError::StaleHandle")),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(
            "Handles are single-use and only valid against the list that issued them.",
        ))
    }
}

/// Errors raised by a transport while building a client or exchanging a
/// single request.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to build transport: {0}")]
    Build(String),
    #[error("{0}")]
    Request(String),
}

impl Diagnostic for TransportError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            TransportError::Build(_) => Some(Box::new("TransportError::Build")),
            TransportError::Request(_) => Some(Box::new("TransportError::Request")),
        }
    }
}
