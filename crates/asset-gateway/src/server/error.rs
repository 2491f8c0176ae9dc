//! [`ApiError`]: maps the [`ServiceError`] taxonomy onto HTTP responses.

use axum::{
    extract::rejection::{BytesRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorResponse, ServiceError};
use tracing::{error, warn};

use crate::crypto::CipherError;
use crate::token::TokenError;
use crate::upstream::UpstreamError;

/// Handler error: a [`ServiceError`] rendered as `{ "code", "error" }` JSON.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl From<CipherError> for ApiError {
    fn from(e: CipherError) -> Self {
        Self(match e {
            CipherError::InvalidKeyLength(_) => ServiceError::Configuration(e.to_string()),
            CipherError::Malformed(_) => ServiceError::BadRequest(e.to_string()),
            CipherError::Authentication => ServiceError::DecryptionFailed,
            CipherError::AeadFailure => ServiceError::Internal(e.to_string()),
        })
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Cipher(inner) => inner.into(),
            TokenError::InvalidEncoding => Self(ServiceError::BadRequest(e.to_string())),
            TokenError::InvalidSecret => Self(ServiceError::Configuration(e.to_string())),
            other => Self(ServiceError::Internal(other.to_string())),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        Self(ServiceError::UpstreamFetch(e.to_string()))
    }
}

impl ApiError {
    /// Extractor rejection: 413 stays 413, anything else is the caller's malformed input.
    fn rejected(status: StatusCode, detail: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self(ServiceError::PayloadTooLarge(detail))
        } else {
            Self(ServiceError::BadRequest(detail))
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        match &err {
            ServiceError::Configuration(_) | ServiceError::Internal(_) => {
                error!(error = %err, "request failed")
            }
            ServiceError::UpstreamFetch(_) | ServiceError::DecryptionFailed => {
                warn!(error = %err, "request failed")
            }
            ServiceError::BadRequest(_)
            | ServiceError::PayloadTooLarge(_)
            | ServiceError::Unauthorized => {}
        }

        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &err {
            ServiceError::Internal(_) => "internal error".to_owned(),
            ServiceError::UpstreamFetch(_) => "failed to fetch the requested asset".to_owned(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse::new(err.code(), message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: impl Into<ApiError>) -> StatusCode {
        e.into().into_response().status()
    }

    #[test]
    fn cipher_errors_map_to_taxonomy() {
        assert_eq!(status_of(CipherError::Malformed(3)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CipherError::Authentication),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CipherError::InvalidKeyLength(16)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn token_errors_map_to_taxonomy() {
        assert_eq!(status_of(TokenError::InvalidEncoding), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(TokenError::Cipher(CipherError::Malformed(0))),
            StatusCode::BAD_REQUEST
        );
        assert!(matches!(
            ApiError::from(TokenError::Cipher(CipherError::Authentication)).0,
            ServiceError::DecryptionFailed
        ));
    }

    #[test]
    fn upstream_errors_are_500() {
        assert_eq!(
            status_of(UpstreamError::Status(502)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn payload_too_large_keeps_its_status() {
        let err = ApiError::rejected(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
        assert_eq!(err.0.code(), "payload_too_large");
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn other_rejections_are_bad_requests() {
        let err = ApiError::rejected(StatusCode::UNPROCESSABLE_ENTITY, "missing field".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_is_401() {
        assert_eq!(status_of(ServiceError::Unauthorized), StatusCode::UNAUTHORIZED);
    }
}
