use actix_web::{http::StatusCode, HttpResponse};
use derive_more::Display;

use crate::store::{backend::BackendError, credential::CredentialError};

/// Every way a note store operation can fail.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum NoteError {
    #[display(fmt = "{}", _0)]
    Validation(&'static str),
    #[display(fmt = "note could not be created: {}", _0)]
    CreationFailed(CredentialError),
    #[display(fmt = "storage backend failure")]
    PersistenceFailure,
    #[display(fmt = "stored note '{}' is corrupt", _0)]
    CorruptRecord(String),
    #[display(fmt = "note id: {} was not found", _0)]
    NotFound(String),
    #[display(fmt = "Given password does not match the note password")]
    Unauthorized,
    #[display(
        fmt = "Written note id ({}) does not match the note id ({})",
        actual,
        expected
    )]
    ConfirmationMismatch { expected: String, actual: String },
    #[display(fmt = "It is not allowed to delete this note.")]
    DeletionForbidden,
    #[display(fmt = "no free note id could be found, try again later")]
    IdentifierSpaceExhausted,
}

impl std::error::Error for NoteError {}

impl From<BackendError> for NoteError {
    fn from(e: BackendError) -> NoteError {
        log::error!("{e}");
        NoteError::PersistenceFailure
    }
}

impl actix_web::error::ResponseError for NoteError {
    fn status_code(&self) -> StatusCode {
        match self {
            NoteError::Validation(_) | NoteError::ConfirmationMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            NoteError::Unauthorized => StatusCode::UNAUTHORIZED,
            NoteError::DeletionForbidden => StatusCode::FORBIDDEN,
            NoteError::NotFound(_) => StatusCode::NOT_FOUND,
            NoteError::IdentifierSpaceExhausted => StatusCode::SERVICE_UNAVAILABLE,
            NoteError::CreationFailed(_)
            | NoteError::PersistenceFailure
            | NoteError::CorruptRecord(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            NoteError::CreationFailed(_) => HttpResponse::InternalServerError()
                .body("Library Error: Password Hashing Unsuccessful"),
            NoteError::PersistenceFailure => {
                HttpResponse::InternalServerError().body("Server Error: Storage Error.")
            }
            NoteError::CorruptRecord(_) => {
                HttpResponse::InternalServerError().body("Server Error: Stored Note Is Unreadable.")
            }
            _ => HttpResponse::build(self.status_code()).body(self.to_string()),
        }
    }
}

#[derive(Debug, Display)]
pub enum ServerError {
    #[display(fmt = "environment error: {}", _0)]
    EnvironmentError(String),
    #[display(fmt = "blocking task was cancelled")]
    BlockingError,
    #[display(fmt = "{}", _0)]
    Note(NoteError),
}

impl std::error::Error for ServerError {}

impl From<std::env::VarError> for ServerError {
    fn from(e: std::env::VarError) -> ServerError {
        ServerError::EnvironmentError(e.to_string())
    }
}

impl From<actix_web::error::BlockingError> for ServerError {
    fn from(_: actix_web::error::BlockingError) -> ServerError {
        ServerError::BlockingError
    }
}

impl From<NoteError> for ServerError {
    fn from(e: NoteError) -> ServerError {
        ServerError::Note(e)
    }
}

impl actix_web::error::ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Note(e) => e.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServerError::EnvironmentError(_) => HttpResponse::InternalServerError()
                .body("Server Error: Use of an uninitialized environment variable."),
            ServerError::BlockingError => {
                HttpResponse::InternalServerError().body("Server Error: Worker Pool Error.")
            }
            ServerError::Note(e) => e.error_response(),
        }
    }
}
