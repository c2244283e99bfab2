//! Mapping between API bodies and engine types.

use api_types::{
    balance::{BalancesResponse, MemberBalanceView},
    expense::{
        self as api_expense, ExpenseNew, ExpenseView, PayerView, SplitMemberView,
    },
    group::GroupView,
    payment::{self as api_payment, PaymentView},
};
use chrono::Utc;
use engine::{
    BalanceSheet, EngineError, Expense, ExpenseStatus, Group, MoneyCents, NewExpenseCmd, Payment,
    PaymentMethod, Percentage, SplitMemberInput, SplitType,
};
use uuid::Uuid;

pub(crate) fn split_type_from_api(value: api_expense::SplitType) -> SplitType {
    match value {
        api_expense::SplitType::Equal => SplitType::Equal,
        api_expense::SplitType::Unequal => SplitType::Unequal,
        api_expense::SplitType::Percentage => SplitType::Percentage,
        api_expense::SplitType::Share => SplitType::Share,
    }
}

fn split_type_to_api(value: SplitType) -> api_expense::SplitType {
    match value {
        SplitType::Equal => api_expense::SplitType::Equal,
        SplitType::Unequal => api_expense::SplitType::Unequal,
        SplitType::Percentage => api_expense::SplitType::Percentage,
        SplitType::Share => api_expense::SplitType::Share,
    }
}

fn status_to_api(value: ExpenseStatus) -> api_expense::ExpenseStatus {
    match value {
        ExpenseStatus::Pending => api_expense::ExpenseStatus::Pending,
        ExpenseStatus::Settled => api_expense::ExpenseStatus::Settled,
    }
}

pub(crate) fn method_from_api(value: api_payment::PaymentMethod) -> PaymentMethod {
    match value {
        api_payment::PaymentMethod::Cash => PaymentMethod::Cash,
        api_payment::PaymentMethod::CreditCard => PaymentMethod::CreditCard,
        api_payment::PaymentMethod::DebitCard => PaymentMethod::DebitCard,
        api_payment::PaymentMethod::BankTransfer => PaymentMethod::BankTransfer,
        api_payment::PaymentMethod::Upi => PaymentMethod::Upi,
        api_payment::PaymentMethod::Other => PaymentMethod::Other,
    }
}

fn method_to_api(value: PaymentMethod) -> api_payment::PaymentMethod {
    match value {
        PaymentMethod::Cash => api_payment::PaymentMethod::Cash,
        PaymentMethod::CreditCard => api_payment::PaymentMethod::CreditCard,
        PaymentMethod::DebitCard => api_payment::PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer => api_payment::PaymentMethod::BankTransfer,
        PaymentMethod::Upi => api_payment::PaymentMethod::Upi,
        PaymentMethod::Other => api_payment::PaymentMethod::Other,
    }
}

/// Builds the engine command for an expense created by `created_by`.
pub(crate) fn expense_cmd(payload: ExpenseNew, created_by: &str) -> Result<NewExpenseCmd, EngineError> {
    let mut cmd = NewExpenseCmd::new(
        payload.name,
        MoneyCents::from_decimal(payload.amount)?,
        created_by,
        split_type_from_api(payload.split_type),
        Utc::now(),
    );
    cmd.expense_date = payload.expense_date;
    cmd.group_id = payload.group_id;
    cmd.related_users = payload.related_users;

    for payer in payload.payers {
        cmd = cmd.payer(payer.user, MoneyCents::from_decimal(payer.amount_paid)?);
    }
    for member in payload.split_members {
        let mut input = SplitMemberInput::new(member.user);
        if let Some(amount) = member.amount_owed {
            input = input.amount_owed(MoneyCents::from_decimal(amount)?);
        }
        if let Some(share) = member.share {
            input = input.share(share);
        }
        if let Some(percentage) = member.percentage {
            input = input.percentage(Percentage::from_decimal(percentage)?);
        }
        cmd = cmd.member(input);
    }
    Ok(cmd)
}

pub(crate) fn group_view(group: Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        icon: group.icon,
        description: group.description,
        members: group.members,
        created_by: group.created_by,
        created_at: group.created_at,
    }
}

pub(crate) fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        name: expense.name,
        amount: expense.amount.to_decimal(),
        created_by: expense.created_by,
        created_at: expense.created_at,
        expense_date: expense.expense_date,
        status: status_to_api(expense.status),
        is_group_expense: expense.is_group_expense,
        group_id: expense.group_id,
        related_users: expense.related_users,
        payers: expense
            .payers
            .into_iter()
            .map(|p| PayerView {
                user: p.user_id,
                amount_paid: p.amount_paid.to_decimal(),
            })
            .collect(),
        split_type: split_type_to_api(expense.split_type),
        split_members: expense
            .split_members
            .into_iter()
            .map(|m| SplitMemberView {
                user: m.user_id,
                amount_owed: m.amount_owed.to_decimal(),
                share: m.share,
                percentage: m.percentage.map(Percentage::to_decimal),
                is_equal_share: m.is_equal_share,
            })
            .collect(),
        payment_ids: expense.payment_ids,
    }
}

pub(crate) fn payment_view(payment: Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        expense_id: payment.expense_id,
        amount: payment.amount.to_decimal(),
        payment_date: payment.payment_date,
        method: method_to_api(payment.method),
        payment_from: payment.payment_from,
        payment_to: payment.payment_to,
        is_group_payment: payment.is_group_payment,
    }
}

pub(crate) fn balances_view(expense_id: Uuid, sheet: BalanceSheet) -> BalancesResponse {
    let settled = sheet.is_settled();
    BalancesResponse {
        expense_id,
        settled,
        members: sheet
            .members
            .into_iter()
            .map(|m| MemberBalanceView {
                user: m.user_id,
                owed: m.owed.to_decimal(),
                paid: m.paid.to_decimal(),
                remaining: m.remaining.to_decimal(),
            })
            .collect(),
    }
}
