//! Split member rows: what each participant owes on an expense.
//!
//! Share weights and percentages are only stored for the split types that use
//! them (`share` and `percentage` respectively).

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, MoneyCents, Percentage, SplitMember};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_split_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub position: i32,
    pub user_id: String,
    pub amount_owed_minor: i64,
    pub share: Option<i64>,
    pub percentage_bp: Option<i32>,
    pub is_equal_share: bool,
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

impl ActiveModel {
    pub(crate) fn for_member(expense_id: &str, position: i32, member: &SplitMember) -> Self {
        Self {
            expense_id: ActiveValue::Set(expense_id.to_string()),
            position: ActiveValue::Set(position),
            user_id: ActiveValue::Set(member.user_id.clone()),
            amount_owed_minor: ActiveValue::Set(member.amount_owed.cents()),
            share: ActiveValue::Set(member.share.map(i64::from)),
            percentage_bp: ActiveValue::Set(
                member.percentage.map(|p| p.basis_points() as i32),
            ),
            is_equal_share: ActiveValue::Set(member.is_equal_share),
        }
    }
}

impl TryFrom<Model> for SplitMember {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let share = model
            .share
            .map(u32::try_from)
            .transpose()
            .map_err(|_| EngineError::InvalidSplit("stored share out of range".to_string()))?;
        let percentage = model
            .percentage_bp
            .map(u32::try_from)
            .transpose()
            .map_err(|_| {
                EngineError::InvalidSplit("stored percentage out of range".to_string())
            })?
            .map(Percentage::from_basis_points);
        Ok(Self {
            user_id: model.user_id,
            amount_owed: MoneyCents::new(model.amount_owed_minor),
            share,
            percentage,
            is_equal_share: model.is_equal_share,
        })
    }
}
