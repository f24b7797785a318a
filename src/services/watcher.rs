//! Live token figures that follow the session.

use std::sync::Arc;

use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};

use crate::{
    services::token_data::{TokenDataService, TokenMetric, ZERO_DISPLAY},
    types::Token,
};

/// A balance or allowance display kept current in the background.
///
/// Fetches once on creation, then again whenever the session changes or
/// [`TokenWatch::refetch`] is called. Dropping the watch stops it.
pub struct TokenWatch {
    token: Token,
    metric: TokenMetric,
    value: watch::Receiver<String>,
    refetch: Arc<Notify>,
    task: JoinHandle<()>,
}

impl TokenWatch {
    /// Start watching `metric` of `token`.
    pub fn spawn(data: TokenDataService, token: Token, metric: TokenMetric) -> Self {
        let (tx, value) = watch::channel(ZERO_DISPLAY.to_string());
        let refetch = Arc::new(Notify::new());

        let mut session = data.store().subscribe();
        let trigger = refetch.clone();
        let watched = token.clone();

        let task = tokio::spawn(async move {
            loop {
                let display = data.display(&watched, metric).await;
                tx.send_replace(display);

                tokio::select! {
                    changed = session.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = trigger.notified() => {}
                }
            }
        });

        tracing::debug!(token = %token.symbol, metric = %metric, "Token watch started");
        Self { token, metric, value, refetch, task }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn metric(&self) -> TokenMetric {
        self.metric
    }

    /// Latest display value.
    pub fn value(&self) -> String {
        self.value.borrow().clone()
    }

    /// Wait for the next fetch to land and return its value.
    ///
    /// Returns `None` once the watch has stopped.
    pub async fn next(&mut self) -> Option<String> {
        self.value.changed().await.ok()?;
        Some(self.value.borrow_and_update().clone())
    }

    /// Fetch again without waiting for a session change.
    pub fn refetch(&self) {
        self.refetch.notify_one();
    }
}

impl Drop for TokenWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TokenDataService {
    /// Keep the connected account's balance of `token` current.
    pub fn watch_balance(&self, token: Token) -> TokenWatch {
        TokenWatch::spawn(self.clone(), token, TokenMetric::Balance)
    }

    /// Keep the router allowance for `token` current.
    pub fn watch_allowance(&self, token: Token) -> TokenWatch {
        TokenWatch::spawn(self.clone(), token, TokenMetric::Allowance)
    }
}
