use astra::Response;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, validation) or downstream layers (DB).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Missing or malformed request parameters. Never retried.
    #[error("{0}")]
    BadRequest(String),

    #[error("Database Error: {0}")]
    DbError(String),

    /// A store read ran past its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal Server Error")]
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl ServerError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::BadRequest(_) => 400,
            ServerError::NotFound => 404,
            ServerError::MethodNotAllowed => 405,
            ServerError::Timeout(_) => 504,
            ServerError::DbError(_) | ServerError::InternalError => 500,
        }
    }
}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::OperationInterrupted => {
                ServerError::Timeout("store read interrupted".into())
            }
            _ => ServerError::DbError(e.to_string()),
        }
    }
}
