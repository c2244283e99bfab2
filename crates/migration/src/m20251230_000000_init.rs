//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for the split ledger:
//!
//! - `users`: authentication
//! - `groups` / `group_members`: groups and their ordered member sets
//! - `expenses`: expense header (amount, status, version counter)
//! - `expense_payers`: who fronted the money
//! - `expense_split_members`: what each participant owes
//! - `expense_related_users`: everyone involved in an expense
//! - `payments`: payments settling split obligations
//! - `expense_payments`: ordered payment references per expense
//!
//! Foreign keys do not cascade: the engine deletes child rows explicitly
//! inside one transaction.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Groups {
    Table,
    Id,
    Name,
    Icon,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum GroupMembers {
    Table,
    GroupId,
    UserId,
    Position,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Name,
    AmountMinor,
    CreatedBy,
    CreatedAt,
    ExpenseDate,
    Status,
    IsGroupExpense,
    GroupId,
    SplitType,
    Version,
}

#[derive(Iden)]
enum ExpensePayers {
    Table,
    ExpenseId,
    Position,
    UserId,
    AmountPaidMinor,
}

#[derive(Iden)]
enum ExpenseSplitMembers {
    Table,
    ExpenseId,
    Position,
    UserId,
    AmountOwedMinor,
    Share,
    PercentageBp,
    IsEqualShare,
}

#[derive(Iden)]
enum ExpenseRelatedUsers {
    Table,
    ExpenseId,
    UserId,
    Position,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    ExpenseId,
    AmountMinor,
    PaymentDate,
    Method,
    PaymentFrom,
    PaymentTo,
    IsGroupPayment,
    CreatedAt,
}

#[derive(Iden)]
enum ExpensePayments {
    Table,
    ExpenseId,
    PaymentId,
    Position,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(
                        ColumnDef::new(Groups::Icon)
                            .string()
                            .not_null()
                            .default("default"),
                    )
                    .col(ColumnDef::new(Groups::Description).string())
                    .col(ColumnDef::new(Groups::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Groups::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GroupMembers::GroupId).string().not_null())
                    .col(ColumnDef::new(GroupMembers::UserId).string().not_null())
                    .col(ColumnDef::new(GroupMembers::Position).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(GroupMembers::GroupId)
                            .col(GroupMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-group_id")
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(Groups::Table, Groups::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_members-user_id")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::ExpenseDate).timestamp())
                    .col(
                        ColumnDef::new(Expenses::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Expenses::IsGroupExpense)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::GroupId).string())
                    .col(ColumnDef::new(Expenses::SplitType).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-group_id")
                            .from(Expenses::Table, Expenses::GroupId)
                            .to(Groups::Table, Groups::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-group_id-created_at")
                    .table(Expenses::Table)
                    .col(Expenses::GroupId)
                    .col(Expenses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expense children
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpensePayers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpensePayers::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpensePayers::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpensePayers::UserId).string().not_null())
                    .col(
                        ColumnDef::new(ExpensePayers::AmountPaidMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExpensePayers::ExpenseId)
                            .col(ExpensePayers::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_payers-expense_id")
                            .from(ExpensePayers::Table, ExpensePayers::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseSplitMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseSplitMembers::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseSplitMembers::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseSplitMembers::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseSplitMembers::AmountOwedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseSplitMembers::Share).big_integer())
                    .col(ColumnDef::new(ExpenseSplitMembers::PercentageBp).integer())
                    .col(
                        ColumnDef::new(ExpenseSplitMembers::IsEqualShare)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExpenseSplitMembers::ExpenseId)
                            .col(ExpenseSplitMembers::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_split_members-expense_id")
                            .from(ExpenseSplitMembers::Table, ExpenseSplitMembers::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseRelatedUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseRelatedUsers::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseRelatedUsers::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseRelatedUsers::Position)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExpenseRelatedUsers::ExpenseId)
                            .col(ExpenseRelatedUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_related_users-expense_id")
                            .from(ExpenseRelatedUsers::Table, ExpenseRelatedUsers::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_related_users-user_id")
                    .table(ExpenseRelatedUsers::Table)
                    .col(ExpenseRelatedUsers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::ExpenseId).string().not_null())
                    .col(ColumnDef::new(Payments::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Payments::PaymentDate).timestamp().not_null())
                    .col(
                        ColumnDef::new(Payments::Method)
                            .string()
                            .not_null()
                            .default("CASH"),
                    )
                    .col(ColumnDef::new(Payments::PaymentFrom).string().not_null())
                    .col(ColumnDef::new(Payments::PaymentTo).string().not_null())
                    .col(
                        ColumnDef::new(Payments::IsGroupPayment)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-expense_id")
                            .from(Payments::Table, Payments::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-expense_id")
                    .table(Payments::Table)
                    .col(Payments::ExpenseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-from-to")
                    .table(Payments::Table)
                    .col(Payments::PaymentFrom)
                    .col(Payments::PaymentTo)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Expense payment references
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpensePayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpensePayments::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpensePayments::PaymentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpensePayments::Position)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExpensePayments::ExpenseId)
                            .col(ExpensePayments::PaymentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_payments-expense_id")
                            .from(ExpensePayments::Table, ExpensePayments::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_payments-payment_id")
                            .from(ExpensePayments::Table, ExpensePayments::PaymentId)
                            .to(Payments::Table, Payments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ExpensePayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseRelatedUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseSplitMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpensePayers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
