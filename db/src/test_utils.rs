//! Shared test utilities for manager, service and CLI tests.
//!
//! This module provides a scripted connector that stands in for a live
//! server: tests queue replies, then inspect how many dials happened and
//! which SQL was sent.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{Connector, RawColumn, RawResult, Session};
use crate::error::{DbError, Result};
use crate::manager::ConnectionManager;
use crate::service::DatabaseService;
use crate::types::ConnectionTarget;

/// Target id used by [`connected_manager`] and [`connected_service`].
pub const TEST_TARGET: &str = "test";

/// One scripted answer, consumed by the next `query` or `execute` on any
/// session from the same connector.
#[derive(Debug)]
pub enum Reply {
    Rows(RawResult),
    Affected(u64),
    Fail(DbError),
    /// Sleep before answering with an empty result.
    Stall(Duration),
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<Reply>,
    dial_failures: VecDeque<DbError>,
    dial_delay: Option<Duration>,
    ping_delay: Option<Duration>,
    unhealthy: bool,
    dials: usize,
    closes: usize,
    executed: Vec<String>,
    sessions: Vec<Arc<AtomicBool>>,
}

/// A connector whose sessions replay a shared reply queue.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    pub fn push(&self, reply: Reply) -> &Self {
        self.state().replies.push_back(reply);
        self
    }

    pub fn push_rows(&self, result: RawResult) -> &Self {
        self.push(Reply::Rows(result))
    }

    /// Queue a driver-style failure with no SQLSTATE.
    pub fn push_failure(&self, message: &str) -> &Self {
        self.push(Reply::Fail(DbError::query_failed(message)))
    }

    pub fn fail_next_dial(&self, error: DbError) -> &Self {
        self.state().dial_failures.push_back(error);
        self
    }

    pub fn set_dial_delay(&self, delay: Duration) {
        self.state().dial_delay = Some(delay);
    }

    /// Make every ping hang for `delay` before answering.
    pub fn set_ping_delay(&self, delay: Duration) {
        self.state().ping_delay = Some(delay);
    }

    /// Make every ping fail (or succeed again).
    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.state().unhealthy = unhealthy;
    }

    /// Mark every session dialed so far as closed by the peer.
    pub fn drop_connections(&self) {
        for flag in &self.state().sessions {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn dial_count(&self) -> usize {
        self.state().dials
    }

    pub fn close_count(&self) -> usize {
        self.state().closes
    }

    /// Every statement that reached a session, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state().executed.clone()
    }

    pub fn pending_replies(&self) -> usize {
        self.state().replies.len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _target: &ConnectionTarget) -> Result<Arc<dyn Session>> {
        let (delay, failure) = {
            let mut state = self.state();
            state.dials += 1;
            (state.dial_delay, state.dial_failures.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let closed = Arc::new(AtomicBool::new(false));
        self.state().sessions.push(closed.clone());
        Ok(Arc::new(MockSession {
            state: self.state.clone(),
            closed,
        }))
    }
}

pub struct MockSession {
    state: Arc<Mutex<MockState>>,
    closed: Arc<AtomicBool>,
}

impl MockSession {
    fn next_reply(&self, sql: &str) -> Result<Option<Reply>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionLoss {
                message: "connection closed".to_string(),
            });
        }
        let mut state = self.state.lock().expect("mock state poisoned");
        state.executed.push(sql.to_string());
        Ok(state.replies.pop_front())
    }
}

#[async_trait]
impl Session for MockSession {
    async fn query(&self, sql: &str) -> Result<RawResult> {
        match self.next_reply(sql)? {
            Some(Reply::Rows(result)) => Ok(result),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(RawResult::default())
            }
            Some(Reply::Affected(_)) | None => Ok(RawResult::default()),
        }
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        match self.next_reply(sql)? {
            Some(Reply::Affected(count)) => Ok(count),
            Some(Reply::Rows(result)) => Ok(result.rows.len() as u64),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(0)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<()> {
        let (unhealthy, delay) = {
            let state = self.state.lock().expect("mock state poisoned");
            (state.unhealthy, state.ping_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if unhealthy || self.closed.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionLoss {
                message: "connection closed".to_string(),
            });
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.lock().expect("mock state poisoned").closes += 1;
        }
    }
}

/// A manager with default timeouts, already connected to [`TEST_TARGET`].
pub async fn connected_manager(mock: &MockConnector) -> ConnectionManager {
    let manager = ConnectionManager::new(Arc::new(mock.clone()));
    manager
        .connect(&target(TEST_TARGET))
        .await
        .expect("mock connect should succeed");
    manager
}

/// A service over [`connected_manager`].
pub async fn connected_service(mock: &MockConnector) -> DatabaseService {
    DatabaseService::new(connected_manager(mock).await)
}

// =============================================================================
// Result builders
// =============================================================================

pub fn target(id: &str) -> ConnectionTarget {
    ConnectionTarget::new(id, "localhost", 5432, "app", "tester", "secret")
}

/// Build a raw result from `(name, type)` pairs and rows of wire cells.
pub fn raw_result(columns: &[(&str, &str)], rows: Vec<Vec<Option<Vec<u8>>>>) -> RawResult {
    RawResult::new(
        columns
            .iter()
            .map(|(name, type_name)| RawColumn::new(*name, *type_name))
            .collect(),
        rows,
    )
}

pub fn int4(value: i32) -> Option<Vec<u8>> {
    Some(value.to_be_bytes().to_vec())
}

pub fn int8(value: i64) -> Option<Vec<u8>> {
    Some(value.to_be_bytes().to_vec())
}

pub fn text(value: &str) -> Option<Vec<u8>> {
    Some(value.as_bytes().to_vec())
}

pub fn boolean(value: bool) -> Option<Vec<u8>> {
    Some(vec![value as u8])
}

/// A one-column `text` result, the shape of most catalog lookups.
pub fn text_column(name: &str, values: &[&str]) -> RawResult {
    raw_result(
        &[(name, "text")],
        values.iter().map(|v| vec![text(v)]).collect(),
    )
}

/// A single `count` row.
pub fn count_result(count: i64) -> RawResult {
    raw_result(&[("count", "int8")], vec![vec![int8(count)]])
}
