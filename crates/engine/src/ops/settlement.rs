use chrono::Utc;
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    BalanceSheet, Channel, EngineError, ExpenseStatus, LedgerEvent, LedgerStore, NewPaymentCmd,
    Payment, ResultEngine, util::normalize_user_id,
};

use super::{Engine, with_tx};

impl Engine {
    /// Admit a payment from a split member towards their obligation on an
    /// expense.
    ///
    /// The payment is validated against the member's remaining obligation,
    /// persisted, linked to the expense and the expense version is bumped, all
    /// in one transaction. The version bump is a compare-and-swap: if another
    /// payment on the same expense committed since the expense was read, this
    /// one fails with [`EngineError::Conflict`] and nothing is written.
    ///
    /// The expense flips to `settled` once every member's obligation is
    /// covered.
    pub async fn admit_payment(&self, cmd: NewPaymentCmd) -> ResultEngine<Payment> {
        let NewPaymentCmd {
            expense_id,
            payer_id,
            payee_id,
            amount,
            method,
            payment_date,
        } = cmd;

        let payer_id = normalize_user_id(&payer_id, "payer")?;
        let payee_id = normalize_user_id(&payee_id, "payee")?;

        let now = Utc::now();
        let (payment, newly_settled, related_users) = with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            let expense = self.require_expense(&store, expense_id).await?;
            let mut payments = store.payments_for_expense(expense_id).await?;

            let remaining = BalanceSheet::compute(&expense, &payments)
                .remaining_for(&payer_id)
                .ok_or_else(|| {
                    EngineError::Unauthorized(
                        "payer is not a split member of this expense".to_string(),
                    )
                })?;
            if !expense.is_related(&payee_id) {
                return Err(EngineError::Validation(
                    "payee is not related to this expense".to_string(),
                ));
            }
            if amount > remaining {
                return Err(EngineError::ExceedsObligation {
                    requested: amount,
                    remaining,
                });
            }
            if !amount.is_positive() {
                return Err(EngineError::InvalidAmount(
                    "payment amount must be > 0".to_string(),
                ));
            }
            if payer_id == payee_id {
                return Err(EngineError::Validation(
                    "payer and payee must be different users".to_string(),
                ));
            }

            let payment = Payment {
                id: Uuid::new_v4(),
                expense_id,
                amount,
                payment_date: payment_date.unwrap_or(now),
                method,
                payment_from: payer_id.clone(),
                payment_to: payee_id.clone(),
                is_group_payment: expense.is_group_expense,
                created_at: now,
            };
            let position = i32::try_from(expense.payment_ids.len()).map_err(|_| {
                EngineError::Validation("expense has too many payments".to_string())
            })?;
            store.insert_payment(&payment, position).await?;
            payments.push(payment.clone());

            let settled = BalanceSheet::compute(&expense, &payments).is_settled();
            let status = if settled {
                ExpenseStatus::Settled
            } else {
                expense.status
            };
            let swapped = store
                .bump_expense_version(expense.id, expense.version, status)
                .await?;
            if swapped {
                let newly_settled = settled && expense.status != ExpenseStatus::Settled;
                Ok((payment, newly_settled, expense.related_users))
            } else {
                Err(EngineError::Conflict(
                    "expense was modified concurrently".to_string(),
                ))
            }
        })?;

        tracing::info!(
            payment_id = %payment.id,
            expense_id = %payment.expense_id,
            amount = %payment.amount,
            "payment admitted"
        );

        self.publish(
            &[Channel::user(&payment.payment_to)],
            &LedgerEvent::PaymentReceived {
                payment_id: payment.id,
                expense_id: payment.expense_id,
                amount: payment.amount,
                payment_from: payment.payment_from.clone(),
                payment_to: payment.payment_to.clone(),
            },
        );
        if newly_settled {
            let channels: Vec<Channel> = related_users.iter().map(Channel::user).collect();
            self.publish(
                &channels,
                &LedgerEvent::ExpenseSettled {
                    expense_id: payment.expense_id,
                },
            );
        }

        Ok(payment)
    }

    /// Remaining obligation of every split member, for a user related to the
    /// expense.
    pub async fn remaining_balances(
        &self,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<BalanceSheet> {
        with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            let expense = self
                .require_expense_read(&store, expense_id, user_id)
                .await?;
            let payments = store.payments_for_expense(expense_id).await?;
            Ok::<_, EngineError>(BalanceSheet::compute(&expense, &payments))
        })
    }

    /// Payments admitted against an expense, oldest first.
    pub async fn expense_payments(
        &self,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            self.require_expense_read(&store, expense_id, user_id)
                .await?;
            store.payments_for_expense(expense_id).await
        })
    }

    /// Payments on every expense of a group, newest first.
    pub async fn group_payments(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            self.require_group_member(&store, group_id, user_id)
                .await?;
            store.payments_for_group(group_id).await
        })
    }

    /// Non-group payments between two users, in either direction, newest
    /// first.
    pub async fn friend_payments(
        &self,
        user_id: &str,
        friend_id: &str,
    ) -> ResultEngine<Vec<Payment>> {
        if user_id == friend_id {
            return Err(EngineError::Validation(
                "friend must be a different user".to_string(),
            ));
        }
        LedgerStore::new(&self.database)
            .payments_between(user_id, friend_id)
            .await
    }
}
