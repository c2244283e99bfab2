use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{EngineError, Expense, Group, LedgerStore, ResultEngine};

use super::Engine;

impl Engine {
    pub(super) async fn require_expense<C: ConnectionTrait>(
        &self,
        store: &LedgerStore<'_, C>,
        expense_id: Uuid,
    ) -> ResultEngine<Expense> {
        store
            .find_expense(expense_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("expense not exists".to_string()))
    }

    /// Loads an expense the user is related to.
    pub(super) async fn require_expense_read<C: ConnectionTrait>(
        &self,
        store: &LedgerStore<'_, C>,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        let expense = self.require_expense(store, expense_id).await?;
        if !expense.is_related(user_id) {
            return Err(EngineError::Unauthorized(
                "user is not related to this expense".to_string(),
            ));
        }
        Ok(expense)
    }

    pub(super) async fn require_group<C: ConnectionTrait>(
        &self,
        store: &LedgerStore<'_, C>,
        group_id: Uuid,
    ) -> ResultEngine<Group> {
        store
            .find_group(group_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("group not exists".to_string()))
    }

    /// Loads a group the user is a member of.
    pub(super) async fn require_group_member<C: ConnectionTrait>(
        &self,
        store: &LedgerStore<'_, C>,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Group> {
        let group = self.require_group(store, group_id).await?;
        if !group.is_member(user_id) {
            return Err(EngineError::Unauthorized(
                "user is not a member of this group".to_string(),
            ));
        }
        Ok(group)
    }
}
