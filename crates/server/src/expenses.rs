//! Expenses API endpoints.

use api_types::{
    balance::BalancesResponse,
    expense::{ExpenseNew, ExpenseView},
    payment::PaymentsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{balances_view, expense_cmd, expense_view, payment_view},
    server::ServerState,
    user,
};

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let cmd = expense_cmd(payload, &user.username)?;
    let expense = state.engine.create_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(expense_id, &user.username).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(expense_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn balances(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let sheet = state
        .engine
        .remaining_balances(expense_id, &user.username)
        .await?;
    Ok(Json(balances_view(expense_id, sheet)))
}

pub async fn payments(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<PaymentsResponse>, ServerError> {
    let payments = state
        .engine
        .expense_payments(expense_id, &user.username)
        .await?;
    Ok(Json(PaymentsResponse {
        payments: payments.into_iter().map(payment_view).collect(),
    }))
}
