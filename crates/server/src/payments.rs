use api_types::payment::{PaymentNew, PaymentView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{MoneyCents, NewPaymentCmd};

use crate::{
    ServerError,
    convert::{method_from_api, payment_view},
    server::ServerState,
    user,
};

/// Handle `POST /payments`: the authenticated user pays `payment_to`.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentNew>,
) -> Result<(StatusCode, Json<PaymentView>), ServerError> {
    let amount = MoneyCents::from_decimal(payload.amount)?;
    let mut cmd = NewPaymentCmd::new(
        payload.expense_id,
        &user.username,
        payload.payment_to,
        amount,
    );
    if let Some(method) = payload.method {
        cmd = cmd.method(method_from_api(method));
    }
    if let Some(date) = payload.payment_date {
        cmd = cmd.payment_date(date);
    }

    let payment = state.engine.admit_payment(cmd).await?;
    Ok((StatusCode::CREATED, Json(payment_view(payment))))
}
