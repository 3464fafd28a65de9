use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[derive(serde::Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

/// Failure taxonomy of the chat and notification operations. Validation
/// errors are detected before any mutation; storage errors abort the
/// primary write and surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

impl ChatError {
    pub fn invalid(msg: &str) -> Self {
        Self::InvalidArgument(msg.to_string())
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::Forbidden(msg.to_string())
    }

    pub fn not_found(msg: &str) -> Self {
        Self::NotFound(msg.to_string())
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            // don't leak driver details to the client
            Self::Storage(err) => {
                tracing::error!("storage failure: {:?}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error,
        })
    }
}
