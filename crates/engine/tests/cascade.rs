mod common;

use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use common::{cents, create_equal_expense, create_group, engine_with_db, equal_expense};
use engine::{EngineError, NewPaymentCmd};

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table};"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

#[tokio::test]
async fn delete_unknown_expense_leaves_payments() {
    let (engine, db, _notifier) = engine_with_db().await;
    let expense = create_equal_expense(&engine, 30000, "bob", &["alice", "bob", "carol"]).await;
    engine
        .admit_payment(NewPaymentCmd::new(expense.id, "alice", "bob", cents(10000)))
        .await
        .unwrap();

    let err = engine
        .delete_expense(uuid::Uuid::new_v4(), "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert_eq!(count(&db, "payments").await, 1);
    assert_eq!(count(&db, "expenses").await, 1);
}

#[tokio::test]
async fn delete_expense_removes_its_payments() {
    let (engine, db, notifier) = engine_with_db().await;
    let expense = create_equal_expense(&engine, 30000, "bob", &["alice", "bob", "carol"]).await;
    let other = create_equal_expense(&engine, 2000, "bob", &["alice", "bob"]).await;
    engine
        .admit_payment(NewPaymentCmd::new(expense.id, "alice", "bob", cents(10000)))
        .await
        .unwrap();
    engine
        .admit_payment(NewPaymentCmd::new(other.id, "alice", "bob", cents(1000)))
        .await
        .unwrap();

    let err = engine.delete_expense(expense.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
    assert_eq!(count(&db, "payments").await, 2);

    engine.delete_expense(expense.id, "bob").await.unwrap();
    assert!(matches!(
        engine.expense(expense.id, "bob").await.unwrap_err(),
        EngineError::NotFound(_)
    ));
    assert_eq!(count(&db, "payments").await, 1);
    assert_eq!(count(&db, "expense_payments").await, 1);
    assert_eq!(
        notifier.channels_for("EXPENSE_DELETED"),
        vec!["user:bob", "user:alice", "user:carol"]
    );

    assert!(matches!(
        engine.delete_expense(expense.id, "bob").await.unwrap_err(),
        EngineError::NotFound(_)
    ));
}

#[tokio::test]
async fn delete_group_removes_expenses_and_payments() {
    let (engine, db, notifier) = engine_with_db().await;
    let group = create_group(&engine, "alice", &["bob", "carol"]).await;

    let e1 = engine
        .create_expense(equal_expense("E1", 30000, "alice", &["alice", "bob", "carol"]).group_id(group.id))
        .await
        .unwrap();
    let e2 = engine
        .create_expense(equal_expense("E2", 6000, "bob", &["alice", "bob"]).group_id(group.id))
        .await
        .unwrap();
    let outside = create_equal_expense(&engine, 2000, "alice", &["alice", "bob"]).await;

    for cmd in [
        NewPaymentCmd::new(e1.id, "bob", "alice", cents(10000)),
        NewPaymentCmd::new(e1.id, "carol", "alice", cents(5000)),
        NewPaymentCmd::new(e2.id, "alice", "bob", cents(3000)),
        NewPaymentCmd::new(outside.id, "bob", "alice", cents(1000)),
    ] {
        engine.admit_payment(cmd).await.unwrap();
    }

    assert!(matches!(
        engine.delete_group(group.id, "bob").await.unwrap_err(),
        EngineError::Unauthorized(_)
    ));

    engine.delete_group(group.id, "alice").await.unwrap();

    assert_eq!(count(&db, "groups").await, 0);
    assert_eq!(count(&db, "group_members").await, 0);
    assert_eq!(count(&db, "expenses").await, 1);
    assert_eq!(count(&db, "payments").await, 1);
    assert!(engine.expense(outside.id, "alice").await.is_ok());
    assert!(matches!(
        engine.expense(e1.id, "alice").await.unwrap_err(),
        EngineError::NotFound(_)
    ));

    let channels = notifier.channels_for("GROUP_DELETED");
    assert_eq!(
        channels,
        vec![
            format!("group:{}", group.id),
            "user:alice".to_string(),
            "user:bob".to_string(),
            "user:carol".to_string(),
        ]
    );

    assert!(matches!(
        engine.delete_group(group.id, "alice").await.unwrap_err(),
        EngineError::NotFound(_)
    ));
}

#[tokio::test]
async fn failed_group_delete_rolls_back_everything() {
    let (engine, db, notifier) = engine_with_db().await;
    let group = create_group(&engine, "alice", &["bob"]).await;
    let expense = engine
        .create_expense(equal_expense("E1", 4000, "alice", &["alice", "bob"]).group_id(group.id))
        .await
        .unwrap();
    engine
        .admit_payment(NewPaymentCmd::new(expense.id, "bob", "alice", cents(2000)))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "CREATE TRIGGER fail_group_delete BEFORE DELETE ON groups \
         BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
    ))
    .await
    .unwrap();

    let err = engine.delete_group(group.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));

    assert_eq!(count(&db, "groups").await, 1);
    assert_eq!(count(&db, "group_members").await, 2);
    assert_eq!(count(&db, "expenses").await, 1);
    assert_eq!(count(&db, "payments").await, 1);
    assert_eq!(
        engine.expense(expense.id, "bob").await.unwrap().payment_ids.len(),
        1
    );
    assert!(notifier.channels_for("GROUP_DELETED").is_empty());
}
