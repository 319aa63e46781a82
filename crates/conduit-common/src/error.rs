use std::error::Error;
use std::fmt;

pub type Result<T> = std::result::Result<T, ConduitError>;

#[derive(Debug)]
pub enum ConduitError {
    IoError(std::io::Error),
    /// A source document could not be parsed.
    MalformedResource { resource: String, message: String },
    /// A distinguished block or definition was not found after a full scan.
    MissingBlock(String),
    /// A Java block state has no counterpart in a Bedrock palette.
    UnresolvedMapping { java_identifier: String, key: String },
    /// Two entries of one Bedrock palette share the same identity.
    DuplicateBlockState(String),
}

impl fmt::Display for ConduitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConduitError::IoError(err) => write!(f, "IO error: {}", err),
            ConduitError::MalformedResource { resource, message } => {
                write!(f, "Malformed resource {}: {}", resource, message)
            }
            ConduitError::MissingBlock(what) => write!(f, "Unable to find {}", what),
            ConduitError::UnresolvedMapping {
                java_identifier,
                key,
            } => write!(
                f,
                "Unable to find Bedrock block for {}; built state key: {}",
                java_identifier, key
            ),
            ConduitError::DuplicateBlockState(key) => {
                write!(f, "Duplicate block state in Bedrock palette: {}", key)
            }
        }
    }
}

impl Error for ConduitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConduitError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConduitError {
    fn from(err: std::io::Error) -> Self {
        ConduitError::IoError(err)
    }
}
