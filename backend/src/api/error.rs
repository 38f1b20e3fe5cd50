//! HTTP mapping for domain errors.
//!
//! Keeps the domain free of transport concerns: the [`Error`] value type is
//! translated into status codes and a JSON envelope here. Internal failures
//! are logged with their real message and redacted on the wire.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorKind};

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden | ErrorKind::OwnerRequired => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.kind, ErrorKind::Internal) {
            error!(message = %self.message, "internal error surfaced to a caller");
            let redacted = Error::internal("internal server error");
            return HttpResponse::build(self.status_code()).json(redacted);
        }
        HttpResponse::build(self.status_code()).json(self)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case(Error::validation("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no token"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("not yours"), StatusCode::FORBIDDEN)]
    #[case(Error::owner_required("owner only"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("duplicate"), StatusCode::CONFLICT)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn kinds_map_to_expected_status_codes(#[case] err: Error, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[tokio::test]
    async fn internal_errors_are_redacted_on_the_wire() {
        let response = Error::internal("connection string leaked").error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let payload: Error = serde_json::from_slice(&bytes).expect("error payload");
        assert_eq!(payload.kind, ErrorKind::Internal);
        assert!(!payload.message.contains("connection string"));
    }

    #[tokio::test]
    async fn owner_required_keeps_its_distinct_kind_on_the_wire() {
        // OwnerRequired shares the 403 status with Forbidden but must stay
        // distinguishable by kind so clients can render the owner-only
        // message.
        let response = Error::owner_required("only the workspace owner").error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let payload: Error = serde_json::from_slice(&bytes).expect("error payload");
        assert_eq!(payload.kind, ErrorKind::OwnerRequired);
    }

    #[tokio::test]
    async fn validation_errors_carry_field_errors() {
        let response = Error::validation("invalid plan")
            .with_field_error("plannedAmount", "must be finite")
            .error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let payload: Error = serde_json::from_slice(&bytes).expect("error payload");
        let fields = payload.field_errors.expect("field errors survive the wire");
        assert_eq!(fields["plannedAmount"], vec!["must be finite".to_owned()]);
    }
}
