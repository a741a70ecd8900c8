//! Output formatting for ping results.

use super::execute::PingResult;
use crate::output::Outputable;

impl Outputable for PingResult {
    fn to_table(&self) -> String {
        let status = if self.healthy { "healthy" } else { "not responding" };
        format!(
            "Target: {} ({}@{}:{}/{})\nStatus: {}",
            self.target, self.username, self.host, self.port, self.database, status
        )
    }
}
