//! What a command runs against: the database service, the selected target,
//! and the runtime that drives the async core.

use std::error::Error;
use std::future::Future;

use db::{ConnectionTarget, DatabaseService};
use tokio::runtime::Runtime;

pub struct Context {
    runtime: Runtime,
    service: DatabaseService,
    /// The resolved target, or why none could be resolved.
    target: Result<ConnectionTarget, String>,
}

impl Context {
    pub fn new(
        service: DatabaseService,
        target: Result<ConnectionTarget, String>,
    ) -> Result<Self, Box<dyn Error>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            service,
            target,
        })
    }

    pub fn service(&self) -> &DatabaseService {
        &self.service
    }

    pub fn target(&self) -> Result<&ConnectionTarget, Box<dyn Error>> {
        self.target.as_ref().map_err(|e| e.clone().into())
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Connect to the selected target and return its id.
    pub fn connect(&self) -> Result<&str, Box<dyn Error>> {
        let target = self.target()?;
        self.block_on(self.service.connect(target))?;
        Ok(&target.id)
    }

    pub fn close(&self) {
        if let Ok(target) = &self.target {
            self.block_on(self.service.disconnect(&target.id));
        }
    }
}

#[cfg(test)]
pub(crate) fn mock_context(mock: &db::test_utils::MockConnector) -> Context {
    use std::sync::Arc;

    let manager = db::ConnectionManager::new(Arc::new(mock.clone()));
    Context::new(
        DatabaseService::new(manager),
        Ok(db::test_utils::target(db::test_utils::TEST_TARGET)),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::test_utils::{MockConnector, TEST_TARGET};

    #[test]
    fn test_connect_returns_target_id() {
        let mock = MockConnector::new();
        let ctx = mock_context(&mock);

        assert_eq!(ctx.connect().unwrap(), TEST_TARGET);
        assert_eq!(mock.dial_count(), 1);
    }

    #[test]
    fn test_missing_target_reported_on_connect() {
        let mock = MockConnector::new();
        let manager = db::ConnectionManager::new(std::sync::Arc::new(mock.clone()));
        let ctx = Context::new(
            DatabaseService::new(manager),
            Err("No configuration found".to_string()),
        )
        .unwrap();

        let err = ctx.connect().unwrap_err();
        assert!(err.to_string().contains("No configuration found"));
        assert_eq!(mock.dial_count(), 0);
    }

    #[test]
    fn test_close_disconnects() {
        let mock = MockConnector::new();
        let ctx = mock_context(&mock);
        ctx.connect().unwrap();

        ctx.close();

        assert!(!ctx.block_on(ctx.service().is_connected(TEST_TARGET)));
        assert_eq!(mock.close_count(), 1);
    }
}
