use std::error::Error;

use db::QueryClassification;
use serde::Serialize;

use super::AnalyzeCmd;
use crate::commands::Execute;
use crate::context::Context;

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResult {
    pub sql: String,
    #[serde(flatten)]
    pub classification: QueryClassification,
}

impl Execute for AnalyzeCmd {
    type Output = AnalyzeResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let classification = ctx.service().analyze(&self.sql);
        Ok(AnalyzeResult {
            sql: self.sql,
            classification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::mock_context;
    use db::test_utils::MockConnector;
    use db::TableRef;
    use rstest::rstest;

    #[rstest]
    fn test_classifies_without_connecting() {
        let mock = MockConnector::new();
        let ctx = mock_context(&mock);

        let result = AnalyzeCmd {
            sql: "SELECT * FROM users u".to_string(),
        }
        .execute(&ctx)
        .unwrap();

        assert_eq!(result.classification.table(), Some(&TableRef::new("public", "users")));
        assert_eq!(mock.dial_count(), 0);
    }
}
