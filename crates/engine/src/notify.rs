//! Ledger events and the notifier seam.
//!
//! The engine publishes a [`LedgerEvent`] on a [`Channel`] after every
//! committed change. Delivery belongs to the [`Notifier`] implementation the
//! engine was built with; publishing is fire-and-forget and a failing
//! notifier never fails the ledger operation.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

/// Fan-out channel: a single user or every member of a group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Channel {
    User(String),
    Group(String),
}

impl Channel {
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User(user_id.into())
    }

    #[must_use]
    pub fn group(group_id: Uuid) -> Self {
        Self::Group(group_id.to_string())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEvent {
    ExpenseCreated {
        expense_id: Uuid,
        name: String,
        amount: MoneyCents,
        created_by: String,
        group_id: Option<Uuid>,
    },
    ExpenseSettled {
        expense_id: Uuid,
    },
    ExpenseDeleted {
        expense_id: Uuid,
        deleted_by: String,
    },
    PaymentReceived {
        payment_id: Uuid,
        expense_id: Uuid,
        amount: MoneyCents,
        payment_from: String,
        payment_to: String,
    },
    GroupDeleted {
        group_id: Uuid,
        deleted_by: String,
    },
}

impl LedgerEvent {
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ExpenseCreated { .. } => "EXPENSE_CREATED",
            Self::ExpenseSettled { .. } => "EXPENSE_SETTLED",
            Self::ExpenseDeleted { .. } => "EXPENSE_DELETED",
            Self::PaymentReceived { .. } => "PAYMENT_RECEIVED",
            Self::GroupDeleted { .. } => "GROUP_DELETED",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("notification channel closed")]
    Closed,
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0}")]
    Delivery(String),
}

/// Receives ledger events for delivery to interested parties.
pub trait Notifier: Send + Sync + fmt::Debug {
    fn publish(&self, channel: &Channel, event: &LedgerEvent) -> Result<(), NotifyError>;
}

/// Notifier that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn publish(&self, _channel: &Channel, _event: &LedgerEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}
