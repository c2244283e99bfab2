//! In-process delivery of ledger events.
//!
//! [`BroadcastNotifier`] fans every published event out over a tokio
//! broadcast channel; `GET /events` subscribes to it and forwards, as
//! Server-Sent Events, the notifications addressed to the caller's user
//! channel or to one of the caller's groups.

use std::{collections::HashSet, convert::Infallible, time::Duration};

use axum::{
    Extension,
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use engine::{Channel, LedgerEvent, Notifier, NotifyError};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::{ServerError, server::ServerState, user};

/// A ledger event addressed to one channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub channel: String,
    pub event_type: String,
    pub payload: serde_json::Value,
}

#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    /// Creates a notifier buffering up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, channel: &Channel, event: &LedgerEvent) -> Result<(), NotifyError> {
        let notification = Notification {
            channel: channel.to_string(),
            event_type: event.event_type().to_string(),
            payload: serde_json::to_value(event)?,
        };
        // Sending only fails when nobody is listening.
        if self.tx.send(notification).is_err() {
            tracing::debug!(%channel, "no event subscribers");
        }
        Ok(())
    }
}

/// Handle `GET /events`: stream the caller's notifications.
pub async fn stream(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ServerError> {
    let mut channels: HashSet<String> = state
        .engine
        .user_groups(&user.username)
        .await?
        .iter()
        .map(|g| Channel::group(g.id).to_string())
        .collect();
    channels.insert(Channel::user(&user.username).to_string());

    let rx = state.events.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(n) if channels.contains(&n.channel) => {
            let data = serde_json::to_string(&n).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(n.event_type).data(data)))
        }
        _ => None,
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
