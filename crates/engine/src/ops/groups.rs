use chrono::Utc;
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    EngineError, Group, LedgerStore, NewGroupCmd, ResultEngine,
    util::{normalize_optional_text, normalize_required_name, normalize_user_id},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a group. The creator becomes its first member.
    ///
    /// Listing the creator among `members` is allowed and has no effect; any
    /// other repeated member is rejected.
    pub async fn create_group(&self, cmd: NewGroupCmd) -> ResultEngine<Group> {
        let NewGroupCmd {
            name,
            icon,
            description,
            members,
            created_by,
        } = cmd;

        let name = normalize_required_name(&name, "group")?;
        let created_by = normalize_user_id(&created_by, "group creator")?;

        let mut all_members = vec![created_by.clone()];
        for (index, member) in members.iter().enumerate() {
            let member = normalize_user_id(member, "group member")?;
            if member == created_by {
                continue;
            }
            if all_members.contains(&member) {
                return Err(EngineError::Validation(format!(
                    "member at index {index} duplicates user {member}"
                )));
            }
            all_members.push(member);
        }

        let group = Group::new(
            name,
            normalize_optional_text(icon.as_deref()),
            normalize_optional_text(description.as_deref()),
            created_by,
            all_members,
            Utc::now(),
        )?;

        with_tx!(self, |db_tx| {
            LedgerStore::new(&db_tx).insert_group(&group).await?;
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(group_id = %group.id, members = group.members.len(), "group created");
        Ok(group)
    }

    /// Return a group the user is a member of.
    pub async fn group(&self, group_id: Uuid, user_id: &str) -> ResultEngine<Group> {
        with_tx!(self, |db_tx| {
            let store = LedgerStore::new(&db_tx);
            self.require_group_member(&store, group_id, user_id).await
        })
    }

    /// Return every group the user belongs to, newest first.
    pub async fn user_groups(&self, user_id: &str) -> ResultEngine<Vec<Group>> {
        LedgerStore::new(&self.database).groups_of(user_id).await
    }
}
