use axum::{extract::State, http::Method, Json};

use crate::{
    error::AskError,
    models::{AskRequest, AskResponse, Question},
    services::metrics,
    startup::AppState,
    utils::ValidatedJson,
};

/// `POST /api/ask`: trigger table first, then document + backend.
pub async fn ask(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AskRequest>,
) -> Result<Json<AskResponse>, AskError> {
    let answer = resolve_answer(&state, req).await?;
    Ok(Json(AskResponse { answer }))
}

async fn resolve_answer(state: &AppState, req: AskRequest) -> Result<String, AskError> {
    let question = Question::new(req.question)
        .ok_or_else(|| AskError::MissingQuestion("blank question".to_string()))?;

    tracing::info!(question_len = question.as_str().len(), "Received ask request");

    if let Some(canned) = state.triggers.lookup(question.as_str()) {
        tracing::info!("Answered from trigger table");
        metrics::record_trigger_hit();
        metrics::record_ask_outcome("triggered");
        return Ok(canned.to_string());
    }

    let document = state.documents.load().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load context document");
        metrics::record_context_load_error(e.kind());
        AskError::from(e)
    })?;

    let answer = state
        .answers
        .generate_answer(&question, &document)
        .await?;

    metrics::record_ask_outcome("answered");
    Ok(answer)
}

/// Any method other than POST on `/api/ask`. The body is never read.
pub async fn method_not_allowed(method: Method) -> AskError {
    AskError::MethodNotAllowed(method.to_string())
}
