//! Typed access to persisted ledger records.
//!
//! [`LedgerStore`] wraps any sea-orm connection (the pool or an open
//! `DatabaseTransaction`) and exposes find/insert/delete operations on
//! expenses, payments and groups. Every write operation in the engine goes
//! through a store built on a transaction, so the multi-record writes below
//! commit or roll back together.
//!
//! Expenses are stored across several tables. Reads hydrate them in batches:
//! one query per child table with `expense_id IN (...)`, then an in-memory
//! join.

use std::collections::HashMap;

use sea_orm::{
    ActiveValue::Set, Condition, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Expense, ExpenseStatus, Group, Payment, ResultEngine, expense_payers, expense_payments,
    expense_related_users, expense_split_members, expenses, group_members, groups, payments,
};

pub struct LedgerStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LedgerStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_expense(&self, expense_id: Uuid) -> ResultEngine<Option<Expense>> {
        let Some(model) = expenses::Entity::find_by_id(expense_id.to_string())
            .one(self.conn)
            .await?
        else {
            return Ok(None);
        };
        Ok(self.hydrate_expenses(vec![model]).await?.pop())
    }

    /// Hydrates expense rows with their child rows, preserving input order.
    pub async fn hydrate_expenses(
        &self,
        models: Vec<expenses::Model>,
    ) -> ResultEngine<Vec<Expense>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();

        let mut payers = bucket_by(
            expense_payers::Entity::find()
                .filter(expense_payers::Column::ExpenseId.is_in(ids.clone()))
                .all(self.conn)
                .await?,
            |row| &row.expense_id,
        );
        let mut members = bucket_by(
            expense_split_members::Entity::find()
                .filter(expense_split_members::Column::ExpenseId.is_in(ids.clone()))
                .all(self.conn)
                .await?,
            |row| &row.expense_id,
        );
        let mut related = bucket_by(
            expense_related_users::Entity::find()
                .filter(expense_related_users::Column::ExpenseId.is_in(ids.clone()))
                .all(self.conn)
                .await?,
            |row| &row.expense_id,
        );
        let mut links = bucket_by(
            expense_payments::Entity::find()
                .filter(expense_payments::Column::ExpenseId.is_in(ids))
                .all(self.conn)
                .await?,
            |row| &row.expense_id,
        );

        models
            .into_iter()
            .map(|model| {
                let id = model.id.clone();
                Expense::from_parts(
                    model,
                    payers.remove(&id).unwrap_or_default(),
                    members.remove(&id).unwrap_or_default(),
                    related.remove(&id).unwrap_or_default(),
                    links.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }

    pub async fn insert_expense(&self, expense: &Expense) -> ResultEngine<()> {
        let expense_id = expense.id.to_string();
        expenses::Entity::insert(expenses::ActiveModel::from(expense))
            .exec_without_returning(self.conn)
            .await?;

        for (position, payer) in (0i32..).zip(&expense.payers) {
            expense_payers::Entity::insert(expense_payers::ActiveModel::for_payer(
                &expense_id,
                position,
                payer,
            ))
            .exec_without_returning(self.conn)
            .await?;
        }
        for (position, member) in (0i32..).zip(&expense.split_members) {
            expense_split_members::Entity::insert(expense_split_members::ActiveModel::for_member(
                &expense_id,
                position,
                member,
            ))
            .exec_without_returning(self.conn)
            .await?;
        }
        for (position, user_id) in (0i32..).zip(&expense.related_users) {
            expense_related_users::Entity::insert(expense_related_users::ActiveModel {
                expense_id: Set(expense_id.clone()),
                user_id: Set(user_id.clone()),
                position: Set(position),
            })
            .exec_without_returning(self.conn)
            .await?;
        }
        Ok(())
    }

    /// Expenses of a group, newest first by `(created_at DESC, id DESC)`.
    ///
    /// `after` restricts the page to rows strictly older than the given
    /// `(created_at, id)` position. At most `limit` rows are returned.
    pub async fn group_expense_rows(
        &self,
        group_id: Uuid,
        after: Option<(DateTimeUtc, String)>,
        limit: u64,
    ) -> ResultEngine<Vec<expenses::Model>> {
        let mut query = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id.to_string()))
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .limit(limit);
        if let Some((created_at, id)) = after {
            query = query.filter(
                Condition::any()
                    .add(expenses::Column::CreatedAt.lt(created_at))
                    .add(
                        Condition::all()
                            .add(expenses::Column::CreatedAt.eq(created_at))
                            .add(expenses::Column::Id.lt(id)),
                    ),
            );
        }
        Ok(query.all(self.conn).await?)
    }

    /// Non-group expenses `user_id` is related to, newest first.
    pub async fn personal_expenses_of(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        let ids: Vec<String> = expense_related_users::Entity::find()
            .filter(expense_related_users::Column::UserId.eq(user_id))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|row| row.expense_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = expenses::Entity::find()
            .filter(expenses::Column::Id.is_in(ids))
            .filter(expenses::Column::IsGroupExpense.eq(false))
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .all(self.conn)
            .await?;
        self.hydrate_expenses(models).await
    }

    /// Compare-and-swap write on the expense version.
    ///
    /// Returns `false` when the row no longer carries `read_version`.
    pub async fn bump_expense_version(
        &self,
        expense_id: Uuid,
        read_version: i64,
        status: ExpenseStatus,
    ) -> ResultEngine<bool> {
        let backend = self.conn.get_database_backend();
        let result = self
            .conn
            .execute(Statement::from_sql_and_values(
                backend,
                "UPDATE expenses SET version = version + 1, status = ? WHERE id = ? AND version = ?;",
                vec![
                    status.as_str().into(),
                    expense_id.to_string().into(),
                    read_version.into(),
                ],
            ))
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Deletes an expense with its payments and child rows.
    ///
    /// Returns the number of expense rows removed.
    pub async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<u64> {
        let id = expense_id.to_string();

        // Links first: they reference both the expense and its payments.
        expense_payments::Entity::delete_many()
            .filter(expense_payments::Column::ExpenseId.eq(id.clone()))
            .exec(self.conn)
            .await?;
        payments::Entity::delete_many()
            .filter(payments::Column::ExpenseId.eq(id.clone()))
            .exec(self.conn)
            .await?;
        expense_payers::Entity::delete_many()
            .filter(expense_payers::Column::ExpenseId.eq(id.clone()))
            .exec(self.conn)
            .await?;
        expense_split_members::Entity::delete_many()
            .filter(expense_split_members::Column::ExpenseId.eq(id.clone()))
            .exec(self.conn)
            .await?;
        expense_related_users::Entity::delete_many()
            .filter(expense_related_users::Column::ExpenseId.eq(id.clone()))
            .exec(self.conn)
            .await?;

        let result = expenses::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn payments_for_expense(&self, expense_id: Uuid) -> ResultEngine<Vec<Payment>> {
        payments::Entity::find()
            .filter(payments::Column::ExpenseId.eq(expense_id.to_string()))
            .order_by_asc(payments::Column::CreatedAt)
            .order_by_asc(payments::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    pub async fn payments_for_group(&self, group_id: Uuid) -> ResultEngine<Vec<Payment>> {
        let expense_ids: Vec<String> = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id.to_string()))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        if expense_ids.is_empty() {
            return Ok(Vec::new());
        }
        payments::Entity::find()
            .filter(payments::Column::ExpenseId.is_in(expense_ids))
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    /// Non-group payments exchanged between two users, in either direction.
    pub async fn payments_between(&self, user_id: &str, friend_id: &str) -> ResultEngine<Vec<Payment>> {
        payments::Entity::find()
            .filter(payments::Column::IsGroupPayment.eq(false))
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(payments::Column::PaymentFrom.eq(user_id))
                            .add(payments::Column::PaymentTo.eq(friend_id)),
                    )
                    .add(
                        Condition::all()
                            .add(payments::Column::PaymentFrom.eq(friend_id))
                            .add(payments::Column::PaymentTo.eq(user_id)),
                    ),
            )
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    /// Inserts a payment and appends it to the expense's payment references.
    pub async fn insert_payment(&self, payment: &Payment, position: i32) -> ResultEngine<()> {
        payments::Entity::insert(payments::ActiveModel::from(payment))
            .exec_without_returning(self.conn)
            .await?;
        expense_payments::Entity::insert(expense_payments::ActiveModel {
            expense_id: Set(payment.expense_id.to_string()),
            payment_id: Set(payment.id.to_string()),
            position: Set(position),
        })
        .exec_without_returning(self.conn)
        .await?;
        Ok(())
    }

    pub async fn find_group(&self, group_id: Uuid) -> ResultEngine<Option<Group>> {
        let Some(model) = groups::Entity::find_by_id(group_id.to_string())
            .one(self.conn)
            .await?
        else {
            return Ok(None);
        };
        let members = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(model.id.clone()))
            .all(self.conn)
            .await?;
        Group::from_parts(model, members).map(Some)
    }

    pub async fn insert_group(&self, group: &Group) -> ResultEngine<()> {
        let group_id = group.id.to_string();
        groups::Entity::insert(groups::ActiveModel::from(group))
            .exec_without_returning(self.conn)
            .await?;
        for (position, user_id) in (0i32..).zip(&group.members) {
            group_members::Entity::insert(group_members::ActiveModel {
                group_id: Set(group_id.clone()),
                user_id: Set(user_id.clone()),
                position: Set(position),
            })
            .exec_without_returning(self.conn)
            .await?;
        }
        Ok(())
    }

    /// Groups `user_id` belongs to, newest first.
    pub async fn groups_of(&self, user_id: &str) -> ResultEngine<Vec<Group>> {
        let group_ids: Vec<String> = group_members::Entity::find()
            .filter(group_members::Column::UserId.eq(user_id))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|m| m.group_id)
            .collect();
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = groups::Entity::find()
            .filter(groups::Column::Id.is_in(group_ids.clone()))
            .order_by_desc(groups::Column::CreatedAt)
            .order_by_desc(groups::Column::Id)
            .all(self.conn)
            .await?;
        let mut members = bucket_by(
            group_members::Entity::find()
                .filter(group_members::Column::GroupId.is_in(group_ids))
                .all(self.conn)
                .await?,
            |row| &row.group_id,
        );

        models
            .into_iter()
            .map(|model| {
                let rows = members.remove(&model.id).unwrap_or_default();
                Group::from_parts(model, rows)
            })
            .collect()
    }

    /// Deletes a group together with every expense and payment under it.
    ///
    /// Returns the number of group rows removed.
    pub async fn delete_group(&self, group_id: Uuid) -> ResultEngine<u64> {
        let backend = self.conn.get_database_backend();
        let id = group_id.to_string();

        // FKs don't declare ON DELETE CASCADE, so children go first.
        for sql in [
            "DELETE FROM expense_payments WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
            "DELETE FROM payments WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
            "DELETE FROM expense_payers WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
            "DELETE FROM expense_split_members WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
            "DELETE FROM expense_related_users WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
            "DELETE FROM expenses WHERE group_id = ?;",
            "DELETE FROM group_members WHERE group_id = ?;",
        ] {
            self.conn
                .execute(Statement::from_sql_and_values(
                    backend,
                    sql,
                    vec![id.clone().into()],
                ))
                .await?;
        }

        let result = self
            .conn
            .execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM groups WHERE id = ?;",
                vec![id.into()],
            ))
            .await?;
        Ok(result.rows_affected())
    }
}

/// Buckets child rows by their owning record id.
fn bucket_by<T>(rows: Vec<T>, key: impl Fn(&T) -> &String) -> HashMap<String, Vec<T>> {
    let mut out: HashMap<String, Vec<T>> = HashMap::new();
    for row in rows {
        out.entry(key(&row).clone()).or_default().push(row);
    }
    out
}
