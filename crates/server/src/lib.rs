use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use events::{BroadcastNotifier, Notification};
pub use server::{ServerState, router, run_with_listener};

mod convert;
mod events;
mod expenses;
mod friends;
mod groups;
mod payments;
mod server;
pub mod user;

pub mod types {
    pub mod group {
        pub use api_types::group::{GroupNew, GroupView, GroupsResponse};
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseListQuery, ExpenseNew, ExpenseView, ExpensesPage, ExpensesResponse,
        };
    }

    pub mod payment {
        pub use api_types::payment::{PaymentNew, PaymentView, PaymentsResponse};
    }

    pub mod balance {
        pub use api_types::balance::BalancesResponse;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized(_) => StatusCode::FORBIDDEN,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::ExceedsObligation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        err if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
