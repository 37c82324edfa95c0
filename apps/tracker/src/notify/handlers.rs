use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::notify::history::NotificationRecord;
use crate::notify::settings::{NotificationSettings, SettingsPatch};
use crate::notify::DeliveryOutcome;
use crate::state::AppState;

const DEFAULT_TEST_MESSAGE: &str =
    "This is a test notification from the flight tracker. If you received this, notifications are working.";

#[derive(Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub notifications: Vec<NotificationRecord>,
}

#[derive(Deserialize, Default)]
pub struct TestRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// GET /api/v1/notifications/config
pub async fn handle_get_config(State(state): State<AppState>) -> Json<NotificationSettings> {
    Json(state.notifier.settings().await)
}

/// POST /api/v1/notifications/config
/// Partial update; omitted fields keep their current value.
pub async fn handle_update_config(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<NotificationSettings>, AppError> {
    if let Some(email) = patch.admin_email.as_deref().map(str::trim) {
        if !email.is_empty() && !email.contains('@') {
            return Err(AppError::Validation(format!(
                "adminEmail '{email}' is not an email address"
            )));
        }
    }
    let updated = state.notifier.update_settings(patch).await?;
    Ok(Json(updated))
}

/// GET /api/v1/notifications/history
pub async fn handle_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let notifications = state.notifier.history();
    Json(HistoryResponse {
        count: notifications.len(),
        notifications,
    })
}

/// POST /api/v1/notifications/test
/// Sends through the normal dispatch path; 500 when no channel delivered.
pub async fn handle_send_test(
    State(state): State<AppState>,
    body: Option<Json<TestRequest>>,
) -> Result<Json<DeliveryOutcome>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_MESSAGE.to_string());

    let outcome = state.notifier.send_test(&message).await;
    if !outcome.success {
        return Err(AppError::DeliveryFailed(outcome.detail));
    }
    Ok(Json(outcome))
}
