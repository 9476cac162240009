use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use keyexpiry_core::AppError;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::dto::MessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Receives one audit log delivery and rotates the keys of the app it names.
///
/// Per-credential rotation failures are logged and still answered with
/// `complete`.
pub async fn audit_event_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let delivery_id = Uuid::new_v4();
    let span = info_span!("audit_event", %delivery_id);

    async move {
        let payload = body.map_err(|rejection| {
            AppError::Internal(format!("failed to read request body: {rejection}"))
        })?;

        let processed = state.key_expiration_service.process_event(&payload).await?;
        info!(
            operation = processed.kind.as_str(),
            app_name = %processed.app_name,
            rotated = processed.report.rotated_keys().len(),
            failures = processed.report.failure_count(),
            "audit event processed"
        );

        Ok(Json(MessageResponse::complete()))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests;
