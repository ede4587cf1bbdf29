//! Registration endpoints
//!
//! `POST /api/register` appends the submitted user to the waitlist and echoes
//! it back; `GET /api/pending` lists every pending registrant in order.

use crate::api::error::ApiError;
use crate::service::AppState;
use crate::types::{User, Waitlist};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::{debug, info};

/// Register a user on the waitlist
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<User>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let metrics = state.metrics();

    let Json(user) = payload.map_err(|rejection| {
        let error = ApiError::from(rejection);
        metrics.record_request("register", error.status().as_u16());
        error
    })?;

    info!("Registration received for '{}'", user.name);

    if let Err(e) = state.waitlist().append(user.clone()).await {
        let error = ApiError::from(e);
        metrics.record_request("register", error.status().as_u16());
        return Err(error);
    }

    metrics.record_request("register", 200);
    Ok(Json(user))
}

/// List pending registrants in registration order
pub async fn pending(State(state): State<Arc<AppState>>) -> Json<Waitlist> {
    let waitlist = state.waitlist().read_all().await;
    debug!("Serving {} pending registrants", waitlist.len());

    state.metrics().record_request("pending", 200);
    Json(waitlist)
}
