//! Shared application state

use std::sync::Arc;

use chrono::Duration;

use crate::auth::TokenKeys;
use crate::notify::Notifier;
use crate::store::Store;

pub struct AppState<S: Store, N: Notifier> {
    pub store: Arc<S>,
    pub notifier: Arc<N>,
    pub tokens: TokenKeys,
    /// Maximum age of cached roster stats
    pub roster_staleness: Duration,
}

impl<S: Store, N: Notifier> AppState<S, N> {
    pub fn new(store: S, notifier: N, tokens: TokenKeys, roster_staleness: Duration) -> Self {
        Self {
            store: Arc::new(store),
            notifier: Arc::new(notifier),
            tokens,
            roster_staleness,
        }
    }
}
