//! Split ledger engine.
//!
//! Records shared expenses, splits them among participants, admits payments
//! against the resulting obligations and keeps every related record
//! consistent when expenses or groups are deleted.
//!
//! All state lives in the database behind sea-orm; the [`Engine`] keeps no
//! ledger state in memory between calls.

pub use balance::{BalanceSheet, MemberBalance, remaining};
pub use commands::{NewExpenseCmd, NewGroupCmd, NewPaymentCmd, PayerInput};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseStatus, Payer};
pub use groups::{DEFAULT_GROUP_ICON, Group};
pub use money::MoneyCents;
pub use notify::{Channel, LedgerEvent, NoopNotifier, Notifier, NotifyError};
pub use ops::{Engine, EngineBuilder, ExpensePage};
pub use payments::{Payment, PaymentMethod};
pub use split::{Percentage, SplitMember, SplitMemberInput, SplitType, validate_split};
pub use store::LedgerStore;

mod balance;
mod commands;
mod error;
pub mod expense_payers;
pub mod expense_payments;
pub mod expense_related_users;
pub mod expense_split_members;
pub mod expenses;
pub mod group_members;
pub mod groups;
mod money;
mod notify;
mod ops;
pub mod payments;
mod split;
pub mod store;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
