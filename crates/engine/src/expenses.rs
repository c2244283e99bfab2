//! Expenses.
//!
//! An [`Expense`] records a shared cost: who fronted the money (payers), how
//! the total is split among participants (split members) and which users are
//! involved at all (related users). Payments admitted against the expense are
//! referenced in order through `payment_ids`.
//!
//! The expense row itself only stores scalar fields; payers, split members,
//! related users and payment links live in their own tables and are hydrated
//! by [`LedgerStore`](crate::store::LedgerStore).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, SplitMember, SplitType, expense_payers,
    expense_payments, expense_related_users, expense_split_members, util::parse_uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Settled,
}

impl ExpenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
        }
    }
}

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "settled" => Ok(Self::Settled),
            other => Err(EngineError::Validation(format!(
                "invalid expense status: {other}"
            ))),
        }
    }
}

/// A user who fronted money for the expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    pub user_id: String,
    pub amount_paid: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub name: String,
    pub amount: MoneyCents,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expense_date: Option<DateTime<Utc>>,
    pub status: ExpenseStatus,
    pub is_group_expense: bool,
    pub group_id: Option<Uuid>,
    pub related_users: Vec<String>,
    pub payers: Vec<Payer>,
    pub split_type: SplitType,
    pub split_members: Vec<SplitMember>,
    pub payment_ids: Vec<Uuid>,
    /// Bumped on every admitted payment.
    pub version: i64,
}

impl Expense {
    #[must_use]
    pub fn is_related(&self, user_id: &str) -> bool {
        self.related_users.iter().any(|u| u == user_id)
    }

    /// Total fronted by `user_id` as a payer of this expense.
    #[must_use]
    pub fn amount_paid_by(&self, user_id: &str) -> MoneyCents {
        self.payers
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.amount_paid)
            .sum()
    }

    /// Rebuilds an expense from its row and its child rows.
    pub(crate) fn from_parts(
        model: Model,
        mut payers: Vec<expense_payers::Model>,
        mut members: Vec<expense_split_members::Model>,
        mut related: Vec<expense_related_users::Model>,
        mut links: Vec<expense_payments::Model>,
    ) -> ResultEngine<Self> {
        payers.sort_by_key(|p| p.position);
        members.sort_by_key(|m| m.position);
        related.sort_by_key(|r| r.position);
        links.sort_by_key(|l| l.position);

        let split_members = members
            .into_iter()
            .map(SplitMember::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let payment_ids = links
            .iter()
            .map(|l| parse_uuid(&l.payment_id, "payment"))
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            name: model.name,
            amount: MoneyCents::new(model.amount_minor),
            created_by: model.created_by,
            created_at: model.created_at,
            expense_date: model.expense_date,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            is_group_expense: model.is_group_expense,
            group_id: model
                .group_id
                .as_deref()
                .map(|g| parse_uuid(g, "group"))
                .transpose()?,
            related_users: related.into_iter().map(|r| r.user_id).collect(),
            payers: payers.into_iter().map(Payer::from).collect(),
            split_type: SplitType::try_from(model.split_type.as_str())?,
            split_members,
            payment_ids,
            version: model.version,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub amount_minor: i64,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub expense_date: Option<DateTimeUtc>,
    pub status: String,
    pub is_group_expense: bool,
    pub group_id: Option<String>,
    pub split_type: String,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            name: ActiveValue::Set(expense.name.clone()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            created_by: ActiveValue::Set(expense.created_by.clone()),
            created_at: ActiveValue::Set(expense.created_at),
            expense_date: ActiveValue::Set(expense.expense_date),
            status: ActiveValue::Set(expense.status.as_str().to_string()),
            is_group_expense: ActiveValue::Set(expense.is_group_expense),
            group_id: ActiveValue::Set(expense.group_id.map(|g| g.to_string())),
            split_type: ActiveValue::Set(expense.split_type.as_str().to_string()),
            version: ActiveValue::Set(expense.version),
        }
    }
}
