use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{MoneyCents, Payer};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_payers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub position: i32,
    pub user_id: String,
    pub amount_paid_minor: i64,
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
    pub(crate) fn for_payer(expense_id: &str, position: i32, payer: &Payer) -> Self {
        Self {
            expense_id: ActiveValue::Set(expense_id.to_string()),
            position: ActiveValue::Set(position),
            user_id: ActiveValue::Set(payer.user_id.clone()),
            amount_paid_minor: ActiveValue::Set(payer.amount_paid.cents()),
        }
    }
}

impl From<Model> for Payer {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            amount_paid: MoneyCents::new(model.amount_paid_minor),
        }
    }
}
