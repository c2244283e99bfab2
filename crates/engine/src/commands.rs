//! Command structs for engine operations.
//!
//! These types group parameters for write operations (expense, payment and
//! group creation), keeping call sites readable and avoiding long argument
//! lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MoneyCents, PaymentMethod, SplitMemberInput, SplitType};

/// A payer contribution as supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayerInput {
    pub user_id: String,
    pub amount_paid: MoneyCents,
}

impl PayerInput {
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount_paid: MoneyCents) -> Self {
        Self {
            user_id: user_id.into(),
            amount_paid,
        }
    }
}

/// Create an expense.
#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub name: String,
    pub amount: MoneyCents,
    pub created_by: String,
    pub expense_date: Option<DateTime<Utc>>,
    pub group_id: Option<Uuid>,
    pub related_users: Vec<String>,
    pub payers: Vec<PayerInput>,
    pub split_type: SplitType,
    pub split_members: Vec<SplitMemberInput>,
    pub created_at: DateTime<Utc>,
}

impl NewExpenseCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        amount: MoneyCents,
        created_by: impl Into<String>,
        split_type: SplitType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            created_by: created_by.into(),
            expense_date: None,
            group_id: None,
            related_users: Vec::new(),
            payers: Vec::new(),
            split_type,
            split_members: Vec::new(),
            created_at,
        }
    }

    #[must_use]
    pub fn expense_date(mut self, expense_date: DateTime<Utc>) -> Self {
        self.expense_date = Some(expense_date);
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    #[must_use]
    pub fn related_user(mut self, user_id: impl Into<String>) -> Self {
        self.related_users.push(user_id.into());
        self
    }

    #[must_use]
    pub fn payer(mut self, user_id: impl Into<String>, amount_paid: MoneyCents) -> Self {
        self.payers.push(PayerInput::new(user_id, amount_paid));
        self
    }

    #[must_use]
    pub fn member(mut self, member: SplitMemberInput) -> Self {
        self.split_members.push(member);
        self
    }
}

/// Admit a payment against an expense.
#[derive(Clone, Debug)]
pub struct NewPaymentCmd {
    pub expense_id: Uuid,
    pub payer_id: String,
    pub payee_id: String,
    pub amount: MoneyCents,
    pub method: PaymentMethod,
    pub payment_date: Option<DateTime<Utc>>,
}

impl NewPaymentCmd {
    #[must_use]
    pub fn new(
        expense_id: Uuid,
        payer_id: impl Into<String>,
        payee_id: impl Into<String>,
        amount: MoneyCents,
    ) -> Self {
        Self {
            expense_id,
            payer_id: payer_id.into(),
            payee_id: payee_id.into(),
            amount,
            method: PaymentMethod::default(),
            payment_date: None,
        }
    }

    #[must_use]
    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn payment_date(mut self, payment_date: DateTime<Utc>) -> Self {
        self.payment_date = Some(payment_date);
        self
    }
}

/// Create a group.
#[derive(Clone, Debug)]
pub struct NewGroupCmd {
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    /// Members besides the creator, who is always added first.
    pub members: Vec<String>,
    pub created_by: String,
}

impl NewGroupCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
            description: None,
            members: Vec::new(),
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn member(mut self, user_id: impl Into<String>) -> Self {
        self.members.push(user_id.into());
        self
    }
}
