use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{Channel, LedgerEvent, NoopNotifier, Notifier, ResultEngine};

mod access;
mod cascade;
mod expenses;
mod groups;
mod settlement;

pub use expenses::ExpensePage;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// An early return out of the block (`?`) drops the uncommitted transaction,
/// which rolls it back as well.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                $tx.rollback().await?;
                Err(err)
            }
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Publishes `event` on every channel. Delivery failures are logged and
    /// otherwise ignored.
    fn publish(&self, channels: &[Channel], event: &LedgerEvent) {
        for channel in channels {
            if let Err(err) = self.notifier.publish(channel, event) {
                tracing::warn!(
                    %channel,
                    event = event.event_type(),
                    error = %err,
                    "failed to publish ledger event"
                );
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Option<Arc<dyn Notifier>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the notifier receiving ledger events (defaults to a no-op).
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier)),
        })
    }
}
