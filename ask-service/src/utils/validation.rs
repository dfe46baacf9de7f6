use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AskError;

/// JSON body that has been parsed and validated.
///
/// Every rejection (wrong content type, malformed JSON, oversized body,
/// missing or invalid fields) becomes `AskError::MissingQuestion`, so the
/// caller always gets a 400 with the same message. The log line and the
/// error detail carry the rejection kind.
pub struct ValidatedJson<T>(pub T);

/// Stable label for why the body was refused.
pub fn rejection_kind(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "missing_content_type",
        JsonRejection::JsonSyntaxError(_) => "malformed_json",
        JsonRejection::JsonDataError(_) => "invalid_fields",
        JsonRejection::BytesRejection(_) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            "body_too_large"
        }
        JsonRejection::BytesRejection(_) => "unreadable_body",
        _ => "other",
    }
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AskError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            let kind = rejection_kind(&e);
            tracing::warn!(
                rejection = kind,
                status = e.status().as_u16(),
                detail = %e.body_text(),
                "Rejected request body"
            );
            AskError::MissingQuestion(format!("{}: {}", kind, e.body_text()))
        })?;

        value.validate().map_err(|e| {
            tracing::warn!(rejection = "validation", detail = %e, "Rejected request body");
            AskError::MissingQuestion(format!("validation: {}", e))
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AskRequest;
    use axum::body::Body;

    async fn extract(content_type: Option<&str>, body: impl Into<Body>) -> AskError {
        let mut builder = Request::builder().method("POST").uri("/api/ask");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(body.into()).unwrap();

        match ValidatedJson::<AskRequest>::from_request(request, &()).await {
            Ok(_) => panic!("body should have been rejected"),
            Err(err) => err,
        }
    }

    fn detail(err: AskError) -> String {
        match err {
            AskError::MissingQuestion(detail) => detail,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_body_is_labelled_distinctly() {
        let question = "a".repeat(3 * 1024 * 1024);
        let body = format!(r#"{{"question": "{}"}}"#, question);

        let detail = detail(extract(Some("application/json"), body).await);
        assert!(detail.starts_with("body_too_large"), "{detail}");
    }

    #[tokio::test]
    async fn blank_question_is_a_validation_rejection() {
        let detail = detail(extract(Some("application/json"), r#"{"question": "  "}"#).await);
        assert!(detail.starts_with("validation"), "{detail}");
    }

    #[tokio::test]
    async fn syntax_and_content_type_problems_are_labelled() {
        let detail_syntax = detail(extract(Some("application/json"), "{not json").await);
        assert!(detail_syntax.starts_with("malformed_json"), "{detail_syntax}");

        let detail_type = detail(extract(None, r#"{"question": "hi"}"#).await);
        assert!(detail_type.starts_with("missing_content_type"), "{detail_type}");

        let detail_fields = detail(extract(Some("application/json"), r#"{"question": 5}"#).await);
        assert!(detail_fields.starts_with("invalid_fields"), "{detail_fields}");
    }
}
