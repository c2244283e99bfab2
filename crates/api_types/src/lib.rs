//! Request and response bodies of the HTTP API.
//!
//! Monetary amounts travel as decimal numbers with at most two fractional
//! digits (`12.5` is twelve and a half units). Percentages likewise
//! (`33.33`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub icon: Option<String>,
        pub description: Option<String>,
        /// Members besides the authenticated user, who is always added.
        #[serde(default)]
        pub members: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub icon: String,
        pub description: Option<String>,
        pub members: Vec<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        pub groups: Vec<GroupView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SplitType {
        Equal,
        Unequal,
        Percentage,
        Share,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpenseStatus {
        Pending,
        Settled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayerInput {
        pub user: String,
        pub amount_paid: f64,
    }

    /// Which optional field is required depends on the split type.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SplitMemberInput {
        pub user: String,
        pub amount_owed: Option<f64>,
        pub share: Option<u32>,
        pub percentage: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub name: String,
        pub amount: f64,
        pub expense_date: Option<DateTime<Utc>>,
        pub group_id: Option<Uuid>,
        #[serde(default)]
        pub related_users: Vec<String>,
        pub payers: Vec<PayerInput>,
        pub split_type: SplitType,
        pub split_members: Vec<SplitMemberInput>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayerView {
        pub user: String,
        pub amount_paid: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitMemberView {
        pub user: String,
        pub amount_owed: f64,
        pub share: Option<u32>,
        pub percentage: Option<f64>,
        pub is_equal_share: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub name: String,
        pub amount: f64,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
        pub expense_date: Option<DateTime<Utc>>,
        pub status: ExpenseStatus,
        pub is_group_expense: bool,
        pub group_id: Option<Uuid>,
        pub related_users: Vec<String>,
        pub payers: Vec<PayerView>,
        pub split_type: SplitType,
        pub split_members: Vec<SplitMemberView>,
        pub payment_ids: Vec<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseListQuery {
        pub limit: Option<u64>,
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesPage {
        pub expenses: Vec<ExpenseView>,
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod payment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum PaymentMethod {
        Cash,
        CreditCard,
        DebitCard,
        BankTransfer,
        Upi,
        Other,
    }

    /// A payment from the authenticated user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub expense_id: Uuid,
        pub payment_to: String,
        pub amount: f64,
        pub method: Option<PaymentMethod>,
        pub payment_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub expense_id: Uuid,
        pub amount: f64,
        pub payment_date: DateTime<Utc>,
        pub method: PaymentMethod,
        pub payment_from: String,
        pub payment_to: String,
        pub is_group_payment: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentsResponse {
        pub payments: Vec<PaymentView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberBalanceView {
        pub user: String,
        pub owed: f64,
        pub paid: f64,
        pub remaining: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub expense_id: Uuid,
        pub settled: bool,
        pub members: Vec<MemberBalanceView>,
    }
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
