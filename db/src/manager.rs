//! One live session per target, with bounded timeouts and a single
//! reconnect-and-retry on connection loss.
//!
//! The manager keeps a map from target id to a slot. The map lock is only
//! held long enough to find or create a slot; each slot has its own async
//! mutex, so dialing, reconnecting and running operations for one target are
//! serialized while other targets proceed independently. Two concurrent
//! `connect` calls for the same target therefore never dial twice.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::backend::postgres::PgConnector;
use crate::backend::{Connector, Session};
use crate::config::Timeouts;
use crate::error::{DbError, Result, TimeoutKind};
use crate::types::ConnectionTarget;

#[derive(Default)]
struct Slot {
    /// Cached until `disconnect`, for transparent reconnects.
    target: Option<ConnectionTarget>,
    session: Option<Arc<dyn Session>>,
}

pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    timeouts: Timeouts,
    slots: Mutex<HashMap<String, Arc<Mutex<Slot>>>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self::with_timeouts(connector, Timeouts::default())
    }

    pub fn with_timeouts(connector: Arc<dyn Connector>, timeouts: Timeouts) -> Self {
        Self {
            connector,
            timeouts,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// A manager dialing real PostgreSQL servers.
    pub fn postgres(timeouts: Timeouts) -> Self {
        Self::with_timeouts(Arc::new(PgConnector::new()), timeouts)
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    async fn slot(&self, target_id: &str) -> Arc<Mutex<Slot>> {
        self.slots
            .lock()
            .await
            .entry(target_id.to_string())
            .or_default()
            .clone()
    }

    /// Drop a slot that never connected, unless another caller holds it.
    async fn release_unused(&self, target_id: &str, handle: &Arc<Mutex<Slot>>) {
        let mut slots = self.slots.lock().await;
        let unused = slots
            .get(target_id)
            .is_some_and(|s| Arc::ptr_eq(s, handle) && Arc::strong_count(handle) == 2);
        if unused {
            slots.remove(target_id);
        }
    }

    async fn existing_slot(&self, target_id: &str) -> Option<Arc<Mutex<Slot>>> {
        self.slots.lock().await.get(target_id).cloned()
    }

    /// Open (or reuse) the session for `target`.
    ///
    /// A healthy session for the same target is kept without dialing. An
    /// unhealthy one is closed and replaced. On success the target is cached
    /// for later reconnects.
    pub async fn connect(&self, target: &ConnectionTarget) -> Result<()> {
        let handle = self.slot(&target.id).await;
        let mut slot = handle.lock().await;

        if let Some(session) = slot.session.take() {
            if slot.target.as_ref() == Some(target) && self.probe(session.as_ref()).await {
                debug!(target_id = %target.id, "reusing healthy session");
                slot.session = Some(session);
                return Ok(());
            }
            warn!(target_id = %target.id, "discarding stale session");
            session.close().await;
        }

        let session = match self.dial(target).await {
            Ok(session) => session,
            Err(e) => {
                if slot.target.is_none() {
                    drop(slot);
                    self.release_unused(&target.id, &handle).await;
                }
                return Err(e);
            }
        };
        slot.session = Some(session);
        slot.target = Some(target.clone());
        info!(target_id = %target.id, host = %target.host, database = %target.database, "connected");
        Ok(())
    }

    /// Close the session and forget the cached target. No-op when absent.
    pub async fn disconnect(&self, target_id: &str) {
        let Some(slot) = self.slots.lock().await.remove(target_id) else {
            return;
        };
        let mut slot = slot.lock().await;
        slot.target = None;
        if let Some(session) = slot.session.take() {
            session.close().await;
        }
        info!(target_id, "disconnected");
    }

    /// Disconnect every target.
    pub async fn disconnect_all(&self) {
        let ids: Vec<String> = self.slots.lock().await.keys().cloned().collect();
        for id in ids {
            self.disconnect(&id).await;
        }
    }

    /// Non-probing liveness check. A slot busy with an operation counts as
    /// connected.
    pub async fn is_connected(&self, target_id: &str) -> bool {
        let Some(slot) = self.existing_slot(target_id).await else {
            return false;
        };
        match slot.try_lock() {
            Ok(slot) => slot.session.as_ref().is_some_and(|s| !s.is_closed()),
            Err(_) => true,
        }
    }

    /// Round-trip probe bounded by the health timeout. Never errors.
    pub async fn is_connection_healthy(&self, target_id: &str) -> bool {
        let Some(slot) = self.existing_slot(target_id).await else {
            return false;
        };
        let slot = slot.lock().await;
        match &slot.session {
            Some(session) => self.probe(session.as_ref()).await,
            None => false,
        }
    }

    /// Run `op` against the target's session under the query timeout.
    ///
    /// A connection-class failure discards the session, redials once from
    /// the cached target, and retries `op` once. Any other failure, or a
    /// second failure, is returned unchanged.
    pub async fn execute_with_reconnect<T, F, Fut>(&self, target_id: &str, op: F) -> Result<T>
    where
        F: Fn(Arc<dyn Session>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let slot = self
            .existing_slot(target_id)
            .await
            .ok_or_else(|| DbError::NotConnected {
                target: target_id.to_string(),
            })?;
        let mut slot = slot.lock().await;

        let session = self.ensure_session(target_id, &mut slot).await?;
        let error = match self.run(&op, session).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_connection_loss() => e,
            Err(e) => return Err(e),
        };

        warn!(target_id, error = %error, "connection lost, reconnecting once");
        self.discard(&mut slot).await;
        let session = self.ensure_session(target_id, &mut slot).await?;

        let result = self.run(&op, session).await;
        if let Err(e) = &result {
            if e.is_connection_loss() {
                warn!(target_id, error = %e, "retry after reconnect failed");
                self.discard(&mut slot).await;
            }
        }
        result
    }

    async fn run<T, F, Fut>(&self, op: &F, session: Arc<dyn Session>) -> Result<T>
    where
        F: Fn(Arc<dyn Session>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        // Dropping the operation future on expiry cancels it.
        match timeout(self.timeouts.query, op(session)).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout {
                kind: TimeoutKind::Query,
                after: self.timeouts.query,
            }),
        }
    }

    async fn ensure_session(&self, target_id: &str, slot: &mut Slot) -> Result<Arc<dyn Session>> {
        if let Some(session) = &slot.session {
            if !session.is_closed() {
                return Ok(session.clone());
            }
            debug!(target_id, "session closed by peer");
            self.discard(slot).await;
        }

        let target = slot.target.clone().ok_or_else(|| DbError::NotConnected {
            target: target_id.to_string(),
        })?;
        let session = self.dial(&target).await?;
        slot.session = Some(session.clone());
        info!(target_id, "reconnected");
        Ok(session)
    }

    async fn discard(&self, slot: &mut Slot) {
        if let Some(session) = slot.session.take() {
            session.close().await;
        }
    }

    async fn dial(&self, target: &ConnectionTarget) -> Result<Arc<dyn Session>> {
        debug!(target_id = %target.id, "dialing");
        match timeout(self.timeouts.dial, self.connector.connect(target)).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout {
                kind: TimeoutKind::Dial,
                after: self.timeouts.dial,
            }),
        }
    }

    async fn probe(&self, session: &dyn Session) -> bool {
        if session.is_closed() {
            return false;
        }
        match self.health_check(session).await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }

    async fn health_check(&self, session: &dyn Session) -> Result<()> {
        match timeout(self.timeouts.health, session.ping()).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout {
                kind: TimeoutKind::Health,
                after: self.timeouts.health,
            }),
        }
    }
}
