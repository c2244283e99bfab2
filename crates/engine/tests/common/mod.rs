#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Channel, Engine, Expense, LedgerEvent, MoneyCents, NewExpenseCmd, NewGroupCmd, Notifier,
    NotifyError, SplitMemberInput, SplitType,
};
use migration::MigratorTrait;

/// Notifier that remembers every `(channel, event type)` it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn channels_for(&self, event_type: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(_, ty)| ty == event_type)
            .map(|(channel, _)| channel)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, channel: &Channel, event: &LedgerEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .unwrap()
            .push((channel.to_string(), event.event_type().to_string()));
        Ok(())
    }
}

/// Notifier that always fails.
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn publish(&self, _channel: &Channel, _event: &LedgerEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Closed)
    }
}

pub async fn migrated_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection, Arc<RecordingNotifier>) {
    let db = migrated_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = Engine::builder()
        .database(db.clone())
        .notifier(notifier.clone())
        .build()
        .await
        .unwrap();
    (engine, db, notifier)
}

pub fn cents(value: i64) -> MoneyCents {
    MoneyCents::new(value)
}

/// Equal split of `total` among `members`, fronted entirely by `payer`.
pub fn equal_expense(name: &str, total: i64, payer: &str, members: &[&str]) -> NewExpenseCmd {
    let mut cmd = NewExpenseCmd::new(name, cents(total), payer, SplitType::Equal, Utc::now())
        .payer(payer, cents(total));
    for member in members {
        cmd = cmd.member(SplitMemberInput::new(*member));
    }
    cmd
}

pub async fn create_equal_expense(
    engine: &Engine,
    total: i64,
    payer: &str,
    members: &[&str],
) -> Expense {
    engine
        .create_expense(equal_expense("Dinner", total, payer, members))
        .await
        .unwrap()
}

pub async fn create_group(engine: &Engine, creator: &str, members: &[&str]) -> engine::Group {
    let mut cmd = NewGroupCmd::new("Trip", creator);
    for member in members {
        cmd = cmd.member(*member);
    }
    engine.create_group(cmd).await.unwrap()
}
