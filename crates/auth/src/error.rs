use thiserror::Error;

/// Strict parse failure for one of the closed vocabularies.
///
/// The lenient `parse`/`from_key` helpers return `Option` instead; resolution
/// code only ever uses those.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("unknown CRUD action '{0}'")]
    UnknownAction(String),

    #[error("unknown permission token '{0}'")]
    UnknownToken(String),
}
