use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{
    events::{self, BroadcastNotifier},
    expenses, friends, groups, payments, user,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    /// Source of the `/events` streams. The engine must publish to a clone
    /// of the same notifier.
    pub events: BroadcastNotifier,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to look up user: {err}");
            StatusCode::UNAUTHORIZED
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/groups", post(groups::create).get(groups::list))
        .route("/groups/{id}", get(groups::get).delete(groups::remove))
        .route("/groups/{id}/expenses", get(groups::expenses))
        .route("/groups/{id}/payments", get(groups::payments))
        .route("/expenses", post(expenses::create))
        .route("/expenses/{id}", get(expenses::get).delete(expenses::remove))
        .route("/expenses/{id}/balances", get(expenses::balances))
        .route("/expenses/{id}/payments", get(expenses::payments))
        .route("/payments", post(payments::create))
        .route("/friends/{id}/expenses", get(friends::expenses))
        .route("/friends/{id}/payments", get(friends::payments))
        .route("/events", get(events::stream))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    events: BroadcastNotifier,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
        events,
    };

    axum::serve(listener, router(state)).await
}
