//! Groups.
//!
//! A [`Group`] is a set of users sharing expenses. It owns its group expenses
//! for lifecycle purposes: deleting a group deletes every expense (and every
//! payment) recorded under it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, group_members, util::parse_uuid};

pub const DEFAULT_GROUP_ICON: &str = "default";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub description: Option<String>,
    /// Ordered member set, the creator first.
    pub members: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(
        name: String,
        icon: Option<String>,
        description: Option<String>,
        created_by: String,
        members: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if members.first() != Some(&created_by) {
            return Err(EngineError::Validation(
                "group members must start with the creator".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            icon: icon.unwrap_or_else(|| DEFAULT_GROUP_ICON.to_string()),
            description,
            members,
            created_by,
            created_at,
        })
    }

    #[must_use]
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    /// Rebuilds a group from its row and its member rows.
    pub(crate) fn from_parts(
        model: Model,
        mut members: Vec<group_members::Model>,
    ) -> ResultEngine<Self> {
        members.sort_by_key(|m| m.position);
        Ok(Self {
            id: parse_uuid(&model.id, "group")?,
            name: model.name,
            icon: model.icon,
            description: model.description,
            members: members.into_iter().map(|m| m.user_id).collect(),
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_members::Entity")]
    GroupMembers,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::group_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMembers.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Group> for ActiveModel {
    fn from(group: &Group) -> Self {
        Self {
            id: ActiveValue::Set(group.id.to_string()),
            name: ActiveValue::Set(group.name.clone()),
            icon: ActiveValue::Set(group.icon.clone()),
            description: ActiveValue::Set(group.description.clone()),
            created_by: ActiveValue::Set(group.created_by.clone()),
            created_at: ActiveValue::Set(group.created_at),
        }
    }
}
