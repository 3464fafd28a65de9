use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use serde::Serialize;

/// Envelope of every endpoint: `{success, ...payload}` on the happy path,
/// `{success:false, error}` with a real status code otherwise.
#[derive(Serialize)]
pub(crate) struct JsonResponse<T: Serialize> {
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    #[serde(flatten)]
    pub(crate) payload: Option<T>,
}

pub(crate) struct JsonResponseBuilder<T: Serialize> {
    message: Option<String>,
    payload: Option<T>,
}

impl<T: Serialize> JsonResponse<T> {
    pub(crate) fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder {
            message: None,
            payload: None,
        }
    }
}

impl<T: Serialize> JsonResponseBuilder<T> {
    pub(crate) fn set_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub(crate) fn set_payload(mut self, payload: T) -> Self {
        self.payload = Some(payload);
        self
    }

    pub(crate) fn ok(self) -> web::Json<JsonResponse<T>> {
        web::Json(JsonResponse {
            success: true,
            message: self.message,
            error: None,
            payload: self.payload,
        })
    }

    fn error(self, code: StatusCode, error: &str) -> actix_web::Error {
        let error = if error.trim().is_empty() {
            "Internal server error".to_string()
        } else {
            error.to_string()
        };

        let body = JsonResponse::<T> {
            success: false,
            message: None,
            error: Some(error.clone()),
            payload: None,
        };

        InternalError::from_response(error, HttpResponse::build(code).json(body)).into()
    }

    pub(crate) fn bad_request(self, msg: &str) -> actix_web::Error {
        self.error(StatusCode::BAD_REQUEST, msg)
    }

    pub(crate) fn unauthorized(self, msg: &str) -> actix_web::Error {
        self.error(StatusCode::UNAUTHORIZED, msg)
    }
}
