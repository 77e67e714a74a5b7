use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    state::AppState,
    transactions::dto::{
        CreatedTransactionResponse, MessageResponse, TransactionListResponse,
        TransactionRequest, UpdatedTransactionResponse,
    },
    transactions::repo,
};

use super::repo::TransactionSummary;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/summary", get(transaction_summary))
        .route("/transactions/:id", put(update_transaction))
        .route("/transactions/:id", delete(delete_transaction))
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let transactions = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(TransactionListResponse {
        transactions,
        success: true,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<CreatedTransactionResponse>), ApiError> {
    let (text, amount) = payload.validate().map_err(ApiError::validation)?;
    let transaction = repo::create(&state.db, user_id, &text, amount).await?;
    info!(user_id = %user_id, id = %transaction.id, "transaction added");
    Ok((
        StatusCode::CREATED,
        Json(CreatedTransactionResponse {
            message: "Transaction added successfully",
            id: transaction.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionRequest>,
) -> Result<Json<UpdatedTransactionResponse>, ApiError> {
    let (text, amount) = payload.validate().map_err(ApiError::validation)?;
    if !repo::update(&state.db, id, user_id, &text, amount).await? {
        return Err(ApiError::NotFound("Transaction"));
    }
    // Re-read to return the updated record; a concurrent delete between the
    // two statements surfaces as not-found.
    let transaction = repo::get(&state.db, id, user_id)
        .await?
        .ok_or(ApiError::NotFound("Transaction"))?;
    info!(user_id = %user_id, %id, "transaction updated");
    Ok(Json(UpdatedTransactionResponse {
        message: "Transaction updated",
        transaction,
    }))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !repo::delete(&state.db, id, user_id).await? {
        return Err(ApiError::NotFound("Transaction"));
    }
    info!(user_id = %user_id, %id, "transaction deleted");
    Ok(Json(MessageResponse {
        message: "Transaction deleted",
    }))
}

#[instrument(skip(state))]
pub async fn transaction_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TransactionSummary>, ApiError> {
    let summary = repo::summary(&state.db, user_id).await?;
    Ok(Json(summary))
}
