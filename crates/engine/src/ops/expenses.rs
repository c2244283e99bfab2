use std::collections::HashSet;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Channel, EngineError, Expense, ExpenseStatus, LedgerEvent, LedgerStore, NewExpenseCmd, Payer,
    ResultEngine, validate_split,
    util::{normalize_required_name, normalize_user_id, push_unique},
};

use super::{Engine, with_tx};

/// One page of expenses plus the cursor of the next page, if any.
pub type ExpensePage = (Vec<Expense>, Option<String>);

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ExpensesCursor {
    created_at: DateTime<Utc>,
    expense_id: String,
}

impl ExpensesCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))
    }
}

fn validate_payers(payers: &[crate::PayerInput]) -> ResultEngine<Vec<Payer>> {
    if payers.is_empty() {
        return Err(EngineError::Validation(
            "expense must have at least one payer".to_string(),
        ));
    }
    let mut seen: HashSet<String> = HashSet::with_capacity(payers.len());
    let mut out = Vec::with_capacity(payers.len());
    for (index, payer) in payers.iter().enumerate() {
        let user_id = normalize_user_id(&payer.user_id, "payer")?;
        if !payer.amount_paid.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "payer at index {index} must pay an amount > 0"
            )));
        }
        if !seen.insert(user_id.clone()) {
            return Err(EngineError::Validation(format!(
                "payer at index {index} duplicates user {user_id}"
            )));
        }
        out.push(Payer {
            user_id,
            amount_paid: payer.amount_paid,
        });
    }
    Ok(out)
}

impl Engine {
    /// Create an expense with status `pending`.
    ///
    /// Related users always end up including the creator, every payer and
    /// every split member. For a group expense the creator and every split
    /// member must belong to the group.
    pub async fn create_expense(&self, cmd: NewExpenseCmd) -> ResultEngine<Expense> {
        let NewExpenseCmd {
            name,
            amount,
            created_by,
            expense_date,
            group_id,
            related_users,
            payers,
            split_type,
            split_members,
            created_at,
        } = cmd;

        let name = normalize_required_name(&name, "expense")?;
        let created_by = normalize_user_id(&created_by, "expense creator")?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be > 0".to_string(),
            ));
        }
        let payers = validate_payers(&payers)?;
        let split_members = validate_split(split_type, amount, &split_members)?;

        let mut related = Vec::with_capacity(related_users.len() + split_members.len() + 1);
        for user_id in &related_users {
            push_unique(&mut related, &normalize_user_id(user_id, "related user")?);
        }
        push_unique(&mut related, &created_by);
        for payer in &payers {
            push_unique(&mut related, &payer.user_id);
        }
        for member in &split_members {
            push_unique(&mut related, &member.user_id);
        }

        let expense = Expense {
            id: Uuid::new_v4(),
            name,
            amount,
            created_by,
            created_at,
            expense_date,
            status: ExpenseStatus::Pending,
            is_group_expense: group_id.is_some(),
            group_id,
            related_users: related,
            payers,
            split_type,
            split_members,
            payment_ids: Vec::new(),
            version: 0,
        };

        with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            if let Some(group_id) = expense.group_id {
                let group = self.require_group(&store, group_id).await?;
                if !group.is_member(&expense.created_by) {
                    return Err(EngineError::Unauthorized(
                        "expense creator is not a member of this group".to_string(),
                    ));
                }
                if let Some((index, member)) = expense
                    .split_members
                    .iter()
                    .enumerate()
                    .find(|(_, m)| !group.is_member(&m.user_id))
                {
                    return Err(EngineError::Validation(format!(
                        "split member at index {index} ({}) is not a member of this group",
                        member.user_id
                    )));
                }
            }
            store.insert_expense(&expense).await?;
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(
            expense_id = %expense.id,
            amount = %expense.amount,
            split_type = expense.split_type.as_str(),
            "expense created"
        );

        let mut channels: Vec<Channel> = expense
            .related_users
            .iter()
            .map(Channel::user)
            .collect();
        if let Some(group_id) = expense.group_id {
            channels.push(Channel::group(group_id));
        }
        self.publish(
            &channels,
            &LedgerEvent::ExpenseCreated {
                expense_id: expense.id,
                name: expense.name.clone(),
                amount: expense.amount,
                created_by: expense.created_by.clone(),
                group_id: expense.group_id,
            },
        );

        Ok(expense)
    }

    /// Return an expense the user is related to.
    pub async fn expense(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            self.require_expense_read(&store, expense_id, user_id).await
        })
    }

    /// Lists the expenses of a group.
    pub async fn group_expenses(
        &self,
        group_id: Uuid,
        user_id: &str,
        limit: u64,
    ) -> ResultEngine<Vec<Expense>> {
        let (items, _next) = self
            .group_expenses_page(group_id, user_id, limit, None)
            .await?;
        Ok(items)
    }

    /// Lists the expenses of a group, with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(created_at DESC, expense_id DESC)`.
    /// A `limit` of zero is rejected.
    pub async fn group_expenses_page(
        &self,
        group_id: Uuid,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<ExpensePage> {
        if limit == 0 {
            return Err(EngineError::Validation(
                "page limit must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            self.require_group_member(&store, group_id, user_id).await?;

            let after = cursor
                .map(ExpensesCursor::decode)
                .transpose()?
                .map(|c| (c.created_at, c.expense_id));
            let limit_plus_one = limit.saturating_add(1);
            let mut rows = store
                .group_expense_rows(group_id, after, limit_plus_one)
                .await?;
            let has_more = rows.len() > limit as usize;
            rows.truncate(limit as usize);
            let out = store.hydrate_expenses(rows).await?;

            let next_cursor = if has_more {
                out.last()
                    .map(|e| ExpensesCursor {
                        created_at: e.created_at,
                        expense_id: e.id.to_string(),
                    })
                    .map(|c| c.encode())
                    .transpose()?
            } else {
                None
            };

            Ok::<_, EngineError>((out, next_cursor))
        })
    }

    /// Lists the non-group expenses shared by exactly `user_id` and
    /// `friend_id`, newest first.
    pub async fn friend_expenses(
        &self,
        user_id: &str,
        friend_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        if user_id == friend_id {
            return Err(EngineError::Validation(
                "friend must be a different user".to_string(),
            ));
        }
        let expenses = LedgerStore::new(&self.database)
            .personal_expenses_of(user_id)
            .await?;
        Ok(expenses
            .into_iter()
            .filter(|e| {
                e.related_users.len() == 2 && e.is_related(user_id) && e.is_related(friend_id)
            })
            .collect())
    }
}
