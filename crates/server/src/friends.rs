//! Expenses and payments shared one-to-one with another user.

use api_types::{expense::ExpensesResponse, payment::PaymentsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    ServerError,
    convert::{expense_view, payment_view},
    server::ServerState,
    user,
};

pub async fn expenses(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(friend): Path<String>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .friend_expenses(&user.username, &friend)
        .await?;
    Ok(Json(ExpensesResponse {
        expenses: expenses.into_iter().map(expense_view).collect(),
    }))
}

pub async fn payments(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(friend): Path<String>,
) -> Result<Json<PaymentsResponse>, ServerError> {
    let payments = state
        .engine
        .friend_payments(&user.username, &friend)
        .await?;
    Ok(Json(PaymentsResponse {
        payments: payments.into_iter().map(payment_view).collect(),
    }))
}
