use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{Channel, EngineError, LedgerEvent, LedgerStore, ResultEngine};

use super::{Engine, with_tx};

impl Engine {
    /// Delete an expense together with every payment admitted against it.
    ///
    /// Only the creator of the expense may delete it.
    pub async fn delete_expense(&self, expense_id: Uuid, requester_id: &str) -> ResultEngine<()> {
        let expense = with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            let expense = self.require_expense(&store, expense_id).await?;
            if expense.created_by != requester_id {
                return Err(EngineError::Unauthorized(
                    "only the creator can delete an expense".to_string(),
                ));
            }

            if store.delete_expense(expense_id).await? == 0 {
                Err(EngineError::NotFound("expense not exists".to_string()))
            } else {
                Ok(expense)
            }
        })?;

        tracing::info!(
            expense_id = %expense.id,
            payments = expense.payment_ids.len(),
            "expense deleted"
        );

        let channels: Vec<Channel> = expense.related_users.iter().map(Channel::user).collect();
        self.publish(
            &channels,
            &LedgerEvent::ExpenseDeleted {
                expense_id: expense.id,
                deleted_by: requester_id.to_string(),
            },
        );
        Ok(())
    }

    /// Delete a group with all of its expenses and their payments.
    ///
    /// Only the creator of the group may delete it.
    pub async fn delete_group(&self, group_id: Uuid, requester_id: &str) -> ResultEngine<()> {
        let group = with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            let group = self.require_group(&store, group_id).await?;
            if group.created_by != requester_id {
                return Err(EngineError::Unauthorized(
                    "only the creator can delete a group".to_string(),
                ));
            }

            if store.delete_group(group_id).await? == 0 {
                Err(EngineError::NotFound("group not exists".to_string()))
            } else {
                Ok(group)
            }
        })?;

        tracing::info!(group_id = %group.id, "group deleted");

        let mut channels = vec![Channel::group(group.id)];
        channels.extend(group.members.iter().map(Channel::user));
        self.publish(
            &channels,
            &LedgerEvent::GroupDeleted {
                group_id: group.id,
                deleted_by: requester_id.to_string(),
            },
        );
        Ok(())
    }
}
