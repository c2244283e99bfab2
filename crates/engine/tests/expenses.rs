mod common;

use chrono::{Duration, Utc};

use common::{cents, create_equal_expense, create_group, engine_with_db, equal_expense};
use engine::{
    EngineError, ExpenseStatus, MoneyCents, NewExpenseCmd, Percentage, SplitMemberInput, SplitType,
};

#[tokio::test]
async fn create_expense_persists_split_and_related_users() {
    let (engine, _db, notifier) = engine_with_db().await;

    let created = create_equal_expense(&engine, 10000, "bob", &["alice", "bob", "carol"]).await;
    assert_eq!(created.status, ExpenseStatus::Pending);
    assert_eq!(created.related_users, vec!["bob", "alice", "carol"]);
    assert_eq!(
        created
            .split_members
            .iter()
            .map(|m| m.amount_owed)
            .sum::<MoneyCents>(),
        cents(10000)
    );

    let loaded = engine.expense(created.id, "carol").await.unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.payers, created.payers);
    assert_eq!(loaded.split_members, created.split_members);
    assert_eq!(loaded.related_users, created.related_users);
    assert_eq!(loaded.version, 0);

    let channels = notifier.channels_for("EXPENSE_CREATED");
    assert_eq!(channels, vec!["user:bob", "user:alice", "user:carol"]);
}

#[tokio::test]
async fn create_expense_trims_name_and_rejects_blank() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let created = engine
        .create_expense(equal_expense("  Taxi ", 1500, "alice", &["alice", "bob"]))
        .await
        .unwrap();
    assert_eq!(created.name, "Taxi");

    let err = engine
        .create_expense(equal_expense("   ", 1500, "alice", &["alice", "bob"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn create_expense_validates_payers() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let no_payer = NewExpenseCmd::new("Lunch", cents(2000), "alice", SplitType::Equal, Utc::now())
        .member(SplitMemberInput::new("alice"))
        .member(SplitMemberInput::new("bob"));
    assert!(matches!(
        engine.create_expense(no_payer).await.unwrap_err(),
        EngineError::Validation(_)
    ));

    let duplicate = equal_expense("Lunch", 2000, "alice", &["alice", "bob"]).payer("alice", cents(1));
    assert!(matches!(
        engine.create_expense(duplicate).await.unwrap_err(),
        EngineError::Validation(msg) if msg.contains("index 1")
    ));

    let zero = NewExpenseCmd::new("Lunch", cents(2000), "alice", SplitType::Equal, Utc::now())
        .payer("alice", MoneyCents::ZERO)
        .member(SplitMemberInput::new("bob"));
    assert!(matches!(
        engine.create_expense(zero).await.unwrap_err(),
        EngineError::InvalidAmount(_)
    ));
}

#[tokio::test]
async fn percentage_split_must_sum_to_hundred() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let cmd = NewExpenseCmd::new("Rent", cents(100000), "alice", SplitType::Percentage, Utc::now())
        .payer("alice", cents(100000))
        .member(SplitMemberInput::new("alice").percentage(Percentage::from_basis_points(6000)))
        .member(SplitMemberInput::new("bob").percentage(Percentage::from_basis_points(3000)));
    let err = engine.create_expense(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidSplit(_)));

    let cmd = NewExpenseCmd::new("Rent", cents(100000), "alice", SplitType::Percentage, Utc::now())
        .payer("alice", cents(100000))
        .member(SplitMemberInput::new("alice").percentage(Percentage::from_basis_points(6000)))
        .member(SplitMemberInput::new("bob").percentage(Percentage::from_basis_points(4000)));
    let created = engine.create_expense(cmd).await.unwrap();
    assert_eq!(created.split_members[1].amount_owed, cents(40000));
    assert_eq!(
        created.split_members[1].percentage,
        Some(Percentage::from_basis_points(4000))
    );
}

#[tokio::test]
async fn expense_read_requires_related_user() {
    let (engine, _db, _notifier) = engine_with_db().await;
    let created = create_equal_expense(&engine, 3000, "alice", &["alice", "bob"]).await;

    assert!(matches!(
        engine.expense(created.id, "mallory").await.unwrap_err(),
        EngineError::Unauthorized(_)
    ));
    assert!(matches!(
        engine.expense(uuid::Uuid::new_v4(), "alice").await.unwrap_err(),
        EngineError::NotFound(_)
    ));
}

#[tokio::test]
async fn group_expense_requires_members() {
    let (engine, _db, notifier) = engine_with_db().await;
    let group = create_group(&engine, "alice", &["bob"]).await;

    let outsider = equal_expense("Hotel", 9000, "alice", &["alice", "carol"]).group_id(group.id);
    assert!(matches!(
        engine.create_expense(outsider).await.unwrap_err(),
        EngineError::Validation(msg) if msg.contains("index 1")
    ));

    let not_member_creator =
        equal_expense("Hotel", 9000, "carol", &["alice", "bob"]).group_id(group.id);
    assert!(matches!(
        engine.create_expense(not_member_creator).await.unwrap_err(),
        EngineError::Unauthorized(_)
    ));

    let missing_group =
        equal_expense("Hotel", 9000, "alice", &["alice"]).group_id(uuid::Uuid::new_v4());
    assert!(matches!(
        engine.create_expense(missing_group).await.unwrap_err(),
        EngineError::NotFound(_)
    ));

    let ok = equal_expense("Hotel", 9000, "alice", &["alice", "bob"]).group_id(group.id);
    let created = engine.create_expense(ok).await.unwrap();
    assert!(created.is_group_expense);
    assert!(
        notifier
            .channels_for("EXPENSE_CREATED")
            .contains(&format!("group:{}", group.id))
    );
}

#[tokio::test]
async fn group_expenses_paginate_newest_first() {
    let (engine, _db, _notifier) = engine_with_db().await;
    let group = create_group(&engine, "alice", &["bob"]).await;

    let base = Utc::now();
    let mut ids = Vec::new();
    for i in 0..5 {
        let mut cmd = equal_expense(&format!("E{i}"), 1000, "alice", &["alice", "bob"])
            .group_id(group.id);
        cmd.created_at = base + Duration::seconds(i);
        ids.push(engine.create_expense(cmd).await.unwrap().id);
    }

    let (page1, cursor) = engine
        .group_expenses_page(group.id, "bob", 2, None)
        .await
        .unwrap();
    assert_eq!(page1.iter().map(|e| e.id).collect::<Vec<_>>(), vec![ids[4], ids[3]]);
    let cursor = cursor.unwrap();

    let (page2, cursor) = engine
        .group_expenses_page(group.id, "bob", 2, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(page2.iter().map(|e| e.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);

    let (page3, cursor) = engine
        .group_expenses_page(group.id, "bob", 2, cursor.as_deref())
        .await
        .unwrap();
    assert_eq!(page3.iter().map(|e| e.id).collect::<Vec<_>>(), vec![ids[0]]);
    assert!(cursor.is_none());

    assert!(matches!(
        engine
            .group_expenses_page(group.id, "bob", 2, Some("not-a-cursor"))
            .await
            .unwrap_err(),
        EngineError::InvalidCursor(_)
    ));
    assert!(matches!(
        engine.group_expenses(group.id, "mallory", 10).await.unwrap_err(),
        EngineError::Unauthorized(_)
    ));
    assert!(matches!(
        engine
            .group_expenses_page(group.id, "bob", 0, None)
            .await
            .unwrap_err(),
        EngineError::Validation(_)
    ));
}

#[tokio::test]
async fn percentage_members_survive_reload() {
    let (engine, _db, _notifier) = engine_with_db().await;
    let cmd = NewExpenseCmd::new("Rent", cents(100000), "alice", SplitType::Percentage, Utc::now())
        .payer("alice", cents(100000))
        .member(
            SplitMemberInput::new("carol")
                .percentage(Percentage::from_decimal(12.5).unwrap()),
        )
        .member(
            SplitMemberInput::new("alice")
                .percentage(Percentage::from_decimal(54.17).unwrap()),
        )
        .member(
            SplitMemberInput::new("bob")
                .percentage(Percentage::from_decimal(33.33).unwrap()),
        );
    let created = engine.create_expense(cmd).await.unwrap();

    let reloaded = engine.expense(created.id, "bob").await.unwrap();
    assert_eq!(reloaded.split_type, SplitType::Percentage);
    assert_eq!(reloaded.split_members, created.split_members);
    assert_eq!(
        reloaded
            .split_members
            .iter()
            .map(|m| (m.user_id.as_str(), m.percentage.map(Percentage::basis_points)))
            .collect::<Vec<_>>(),
        vec![("carol", Some(1250)), ("alice", Some(5417)), ("bob", Some(3333))]
    );
    assert_eq!(
        reloaded
            .split_members
            .iter()
            .map(|m| m.amount_owed)
            .sum::<MoneyCents>(),
        cents(100000)
    );
}

#[tokio::test]
async fn friend_expenses_only_include_the_pair() {
    let (engine, _db, _notifier) = engine_with_db().await;
    let group = create_group(&engine, "alice", &["bob"]).await;

    let pair = create_equal_expense(&engine, 2000, "alice", &["alice", "bob"]).await;
    create_equal_expense(&engine, 3000, "alice", &["alice", "bob", "carol"]).await;
    engine
        .create_expense(equal_expense("Group", 2000, "alice", &["alice", "bob"]).group_id(group.id))
        .await
        .unwrap();

    let shared = engine.friend_expenses("bob", "alice").await.unwrap();
    assert_eq!(shared.iter().map(|e| e.id).collect::<Vec<_>>(), vec![pair.id]);
    assert!(engine.friend_expenses("bob", "bob").await.is_err());
}

#[tokio::test]
async fn groups_are_listed_for_members() {
    let (engine, _db, _notifier) = engine_with_db().await;
    let group = create_group(&engine, "alice", &["bob", "alice"]).await;
    assert_eq!(group.members, vec!["alice", "bob"]);
    assert_eq!(group.icon, engine::DEFAULT_GROUP_ICON);

    let listed = engine.user_groups("bob").await.unwrap();
    assert_eq!(listed.iter().map(|g| g.id).collect::<Vec<_>>(), vec![group.id]);
    assert!(engine.user_groups("carol").await.unwrap().is_empty());
    let loaded = engine.group(group.id, "bob").await.unwrap();
    assert_eq!(loaded.members, group.members);
    assert_eq!(loaded.created_by, "alice");
    assert!(matches!(
        engine.group(group.id, "carol").await.unwrap_err(),
        EngineError::Unauthorized(_)
    ));

    let duplicate = engine::NewGroupCmd::new("Trip", "alice")
        .member("bob")
        .member("bob");
    assert!(matches!(
        engine.create_group(duplicate).await.unwrap_err(),
        EngineError::Validation(_)
    ));
}
