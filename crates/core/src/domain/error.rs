use thiserror::Error;

use super::ClientId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown client id: {0}")]
    UnknownClientId(String),

    #[error("client id already issued: {0}")]
    DuplicateClientId(ClientId),
}
