use std::error::Error;

use serde::Serialize;

use super::PingCmd;
use crate::commands::Execute;
use crate::context::Context;

#[derive(Debug, Clone, Serialize)]
pub struct PingResult {
    pub target: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub healthy: bool,
}

impl Execute for PingCmd {
    type Output = PingResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let id = ctx.connect()?;
        let healthy = ctx.block_on(ctx.service().is_connection_healthy(id));
        let target = ctx.target()?;

        Ok(PingResult {
            target: target.id.clone(),
            host: target.host.clone(),
            port: target.port,
            database: target.database.clone(),
            username: target.username.clone(),
            healthy,
        })
    }
}
