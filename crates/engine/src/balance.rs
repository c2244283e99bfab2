//! Balance calculator.
//!
//! Computes, for every split member of an expense, how much of their owed
//! amount is still outstanding given the payments admitted so far:
//!
//! `remaining(user) = owed(user) - sum(payments from user)`, floored at zero.
//!
//! Users that are not split members have no entry: they are not obligated on
//! the expense.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Expense, MoneyCents, Payment};

/// Per-member view of an expense obligation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub user_id: String,
    pub owed: MoneyCents,
    /// Sum of the member's payments against the expense.
    pub paid: MoneyCents,
    pub remaining: MoneyCents,
    /// What the member fronted as a payer of the expense.
    pub fronted: MoneyCents,
}

impl MemberBalance {
    /// Remaining obligation not already covered by the member's own payer
    /// contribution.
    #[must_use]
    pub fn outstanding(&self) -> MoneyCents {
        if self.remaining > self.fronted {
            self.remaining - self.fronted
        } else {
            MoneyCents::ZERO
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub members: Vec<MemberBalance>,
}

impl BalanceSheet {
    /// Builds the sheet for `expense`. Payments belonging to other expenses
    /// are ignored.
    #[must_use]
    pub fn compute(expense: &Expense, payments: &[Payment]) -> Self {
        let members = expense
            .split_members
            .iter()
            .map(|member| {
                let paid: MoneyCents = payments
                    .iter()
                    .filter(|p| p.expense_id == expense.id && p.payment_from == member.user_id)
                    .map(|p| p.amount)
                    .sum();
                let remaining = if member.amount_owed > paid {
                    member.amount_owed - paid
                } else {
                    MoneyCents::ZERO
                };
                MemberBalance {
                    user_id: member.user_id.clone(),
                    owed: member.amount_owed,
                    paid,
                    remaining,
                    fronted: expense.amount_paid_by(&member.user_id),
                }
            })
            .collect();
        Self { members }
    }

    #[must_use]
    pub fn member(&self, user_id: &str) -> Option<&MemberBalance> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    #[must_use]
    pub fn remaining_for(&self, user_id: &str) -> Option<MoneyCents> {
        self.member(user_id).map(|m| m.remaining)
    }

    #[must_use]
    pub fn remaining(&self) -> BTreeMap<String, MoneyCents> {
        self.members
            .iter()
            .map(|m| (m.user_id.clone(), m.remaining))
            .collect()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.members.iter().all(|m| m.outstanding().is_zero())
    }
}

/// Remaining obligation per split member of `expense`.
#[must_use]
pub fn remaining(expense: &Expense, payments: &[Payment]) -> BTreeMap<String, MoneyCents> {
    BalanceSheet::compute(expense, payments).remaining()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{ExpenseStatus, Payer, PaymentMethod, SplitMember, SplitType};

    fn member(user: &str, owed: i64) -> SplitMember {
        SplitMember {
            user_id: user.to_string(),
            amount_owed: MoneyCents::new(owed),
            share: None,
            percentage: None,
            is_equal_share: true,
        }
    }

    fn expense() -> Expense {
        Expense {
            id: Uuid::new_v4(),
            name: "Dinner".to_string(),
            amount: MoneyCents::new(30000),
            created_by: "bob".to_string(),
            created_at: Utc::now(),
            expense_date: None,
            status: ExpenseStatus::Pending,
            is_group_expense: false,
            group_id: None,
            related_users: vec!["bob".to_string(), "alice".to_string(), "carol".to_string()],
            payers: vec![Payer {
                user_id: "bob".to_string(),
                amount_paid: MoneyCents::new(30000),
            }],
            split_type: SplitType::Equal,
            split_members: vec![
                member("alice", 10000),
                member("bob", 10000),
                member("carol", 10000),
            ],
            payment_ids: Vec::new(),
            version: 0,
        }
    }

    fn payment(expense_id: Uuid, from: &str, amount: i64) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            expense_id,
            amount: MoneyCents::new(amount),
            payment_date: Utc::now(),
            method: PaymentMethod::Cash,
            payment_from: from.to_string(),
            payment_to: "bob".to_string(),
            is_group_payment: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn remaining_subtracts_member_payments() {
        let expense = expense();
        let payments = [payment(expense.id, "alice", 4000)];
        let remaining = remaining(&expense, &payments);
        assert_eq!(remaining["alice"], MoneyCents::new(6000));
        assert_eq!(remaining["carol"], MoneyCents::new(10000));
        assert!(!remaining.contains_key("dave"));
    }

    #[test]
    fn remaining_ignores_other_expenses_and_floors_at_zero() {
        let expense = expense();
        let payments = [
            payment(Uuid::new_v4(), "alice", 5000),
            payment(expense.id, "carol", 12000),
        ];
        let remaining = remaining(&expense, &payments);
        assert_eq!(remaining["alice"], MoneyCents::new(10000));
        assert_eq!(remaining["carol"], MoneyCents::ZERO);
    }

    #[test]
    fn settled_once_non_payers_have_paid() {
        let expense = expense();
        let partial = [payment(expense.id, "alice", 10000)];
        assert!(!BalanceSheet::compute(&expense, &partial).is_settled());

        let full = [
            payment(expense.id, "alice", 10000),
            payment(expense.id, "carol", 10000),
        ];
        let sheet = BalanceSheet::compute(&expense, &full);
        assert!(sheet.is_settled());
        assert_eq!(sheet.member("bob").map(|m| m.outstanding()), Some(MoneyCents::ZERO));
    }
}
