//! Payments.
//!
//! A [`Payment`] settles (part of) a split member's obligation on an expense.
//! Payments are created only by [`Engine::admit_payment`](crate::Engine::admit_payment),
//! never edited, and removed only when their expense (or its group) is deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    Upi,
    Other,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::CreditCard => "CREDIT_CARD",
            Self::DebitCard => "DEBIT_CARD",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Upi => "UPI",
            Self::Other => "OTHER",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CASH" => Ok(Self::Cash),
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "DEBIT_CARD" => Ok(Self::DebitCard),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            "UPI" => Ok(Self::Upi),
            "OTHER" => Ok(Self::Other),
            other => Err(EngineError::Validation(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub amount: MoneyCents,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
    /// The split member paying off their share.
    pub payment_from: String,
    pub payment_to: String,
    pub is_group_payment: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub amount_minor: i64,
    pub payment_date: DateTimeUtc,
    pub method: String,
    pub payment_from: String,
    pub payment_to: String,
    pub is_group_payment: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            expense_id: ActiveValue::Set(payment.expense_id.to_string()),
            amount_minor: ActiveValue::Set(payment.amount.cents()),
            payment_date: ActiveValue::Set(payment.payment_date),
            method: ActiveValue::Set(payment.method.as_str().to_string()),
            payment_from: ActiveValue::Set(payment.payment_from.clone()),
            payment_to: ActiveValue::Set(payment.payment_to.clone()),
            is_group_payment: ActiveValue::Set(payment.is_group_payment),
            created_at: ActiveValue::Set(payment.created_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            expense_id: parse_uuid(&model.expense_id, "expense")?,
            amount: MoneyCents::new(model.amount_minor),
            payment_date: model.payment_date,
            method: PaymentMethod::try_from(model.method.as_str())?,
            payment_from: model.payment_from,
            payment_to: model.payment_to,
            is_group_payment: model.is_group_payment,
            created_at: model.created_at,
        })
    }
}
