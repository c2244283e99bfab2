//! Groups API endpoints.

use api_types::{
    expense::{ExpenseListQuery, ExpensesPage},
    group::{GroupNew, GroupView, GroupsResponse},
    payment::PaymentsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::NewGroupCmd;
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{expense_view, group_view, payment_view},
    server::ServerState,
    user,
};

const DEFAULT_PAGE_LIMIT: u64 = 50;
const MAX_PAGE_LIMIT: u64 = 200;

pub(crate) fn page_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let mut cmd = NewGroupCmd::new(payload.name, &user.username);
    cmd.icon = payload.icon;
    cmd.description = payload.description;
    cmd.members = payload.members;

    let group = state.engine.create_group(cmd).await?;
    Ok((StatusCode::CREATED, Json(group_view(group))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<GroupsResponse>, ServerError> {
    let groups = state.engine.user_groups(&user.username).await?;
    Ok(Json(GroupsResponse {
        groups: groups.into_iter().map(group_view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(group_id, &user.username).await?;
    Ok(Json(group_view(group)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(group_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn expenses(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<ExpensesPage>, ServerError> {
    let (expenses, next_cursor) = state
        .engine
        .group_expenses_page(
            group_id,
            &user.username,
            page_limit(query.limit),
            query.cursor.as_deref(),
        )
        .await?;

    Ok(Json(ExpensesPage {
        expenses: expenses.into_iter().map(expense_view).collect(),
        next_cursor,
    }))
}

pub async fn payments(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<PaymentsResponse>, ServerError> {
    let payments = state
        .engine
        .group_payments(group_id, &user.username)
        .await?;
    Ok(Json(PaymentsResponse {
        payments: payments.into_iter().map(payment_view).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_defaults_and_caps() {
        assert_eq!(page_limit(None), 50);
        assert_eq!(page_limit(Some(0)), 1);
        assert_eq!(page_limit(Some(10)), 10);
        assert_eq!(page_limit(Some(10_000)), 200);
    }
}
