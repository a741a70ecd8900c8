//! Output formatting for editability verdicts.

use db::QueryClassification;

use super::execute::AnalyzeResult;
use crate::output::Outputable;

impl Outputable for AnalyzeResult {
    fn to_table(&self) -> String {
        match &self.classification {
            QueryClassification::Editable { table, alias } => {
                let mut line = format!("Editable: {}.{}", table.schema, table.table);
                if let Some(alias) = alias {
                    line.push_str(&format!(" (alias {})", alias));
                }
                line
            }
            QueryClassification::ReadOnly { reason } => format!("Read-only: {}", reason),
        }
    }
}
