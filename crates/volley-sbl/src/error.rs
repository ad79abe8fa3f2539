use miette::Diagnostic;

/// Errors raised while parsing, registering or evaluating tags.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SblError {
    #[error("Interpreter is readied. Stop load inputs.")]
    Readied,
    #[error("scope \"{0}\" existed.")]
    ScopeExists(String),
    #[error("Unknown opcode: {0}")]
    UnknownOpcode(String),
    #[error("Unknown encoder: {0}")]
    UnknownEncoder(String),
    #[error("Unknown id: \"{0}\"")]
    UnknownId(String),
    #[error("Direction \"{direction}\" not found in items. (\"{id}\" -> \"{direction}\")")]
    DirectionNotFound { id: String, direction: String },
    #[error("Cycle exist between items.")]
    CycleDetected,
    #[error("Circular references exist between tags.")]
    CircularReference,
    #[error("Invalid arguments for opcode \"{0}\"")]
    InvalidArguments(String),
    #[error("Invalid tag style: \"{0}\"")]
    InvalidTagStyle(String),
    #[error("Failed to read \"{path}\": {message}")]
    FileRead { path: String, message: String },
}

impl Diagnostic for SblError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let c = match self {
            SblError::Readied => "SblError::Readied",
            SblError::ScopeExists(_) => "SblError::ScopeExists",
            SblError::UnknownOpcode(_) => "SblError::UnknownOpcode",
            SblError::UnknownEncoder(_) => "SblError::UnknownEncoder",
            SblError::UnknownId(_) => "SblError::UnknownId",
            SblError::DirectionNotFound { .. } => "SblError::DirectionNotFound",
            SblError::CycleDetected => "SblError::CycleDetected",
            SblError::CircularReference => "SblError::CircularReference",
            SblError::InvalidArguments(_) => "SblError::InvalidArguments",
            SblError::InvalidTagStyle(_) => "SblError::InvalidTagStyle",
            SblError::FileRead { .. } => "SblError::FileRead",
        };

        Some(Box::new(c))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match self {
            SblError::Readied => {
                Some("All inputs must be loaded before the interpreter is readied.".to_string())
            }
            SblError::ScopeExists(_) => {
                Some("Each scope can only be loaded once. Use a different scope name.".to_string())
            }
            SblError::UnknownOpcode(_) => {
                Some("Check the tag against the supported generator syntaxes.".to_string())
            }
            SblError::UnknownEncoder(_) => {
                Some("Supported encoders are \"str\", \"url\" and \"urlc\".".to_string())
            }
            SblError::UnknownId(id) => Some(format!(
                "\"{id}\" is not registered. Did you forget a #id attribute?"
            )),
            SblError::DirectionNotFound { .. } => {
                Some("A ^target or #reference points at an id that was never defined.".to_string())
            }
            SblError::CycleDetected | SblError::CircularReference => {
                Some("Break the loop between ^targets and #references.".to_string())
            }
            SblError::InvalidTagStyle(_) => Some(
                "The style must contain \"...\" between the begin and end markers, e.g. \"{...}\"."
                    .to_string(),
            ),
            SblError::FileRead { .. } => {
                Some("Check that the file exists and is readable.".to_string())
            }
            SblError::InvalidArguments(_) => None,
        };

        msg.map(|m| Box::new(m) as Box<dyn std::fmt::Display>)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::readied(SblError::Readied, "Interpreter is readied. Stop load inputs.")]
    #[case::scope_exists(
        SblError::ScopeExists("url".to_string()),
        "scope \"url\" existed."
    )]
    #[case::unknown_opcode(
        SblError::UnknownOpcode("frobnicate".to_string()),
        "Unknown opcode: frobnicate"
    )]
    #[case::unknown_encoder(
        SblError::UnknownEncoder("base64".to_string()),
        "Unknown encoder: base64"
    )]
    #[case::direction_not_found(
        SblError::DirectionNotFound {
            id: "main:0".to_string(),
            direction: "main:7".to_string(),
        },
        "Direction \"main:7\" not found in items. (\"main:0\" -> \"main:7\")"
    )]
    #[case::cycle(SblError::CycleDetected, "Cycle exist between items.")]
    #[case::circular(
        SblError::CircularReference,
        "Circular references exist between tags."
    )]
    fn test_display(#[case] error: SblError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::readied(SblError::Readied, "SblError::Readied")]
    #[case::unknown_id(SblError::UnknownId("x".to_string()), "SblError::UnknownId")]
    #[case::file_read(
        SblError::FileRead {
            path: "words.txt".to_string(),
            message: "No such file or directory".to_string(),
        },
        "SblError::FileRead"
    )]
    fn test_diagnostic_code(#[case] error: SblError, #[case] expected: &str) {
        assert_eq!(error.code().map(|c| c.to_string()), Some(expected.to_string()));
    }
}
