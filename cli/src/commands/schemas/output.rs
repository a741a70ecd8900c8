//! Output formatting for schema listings.

use super::execute::SchemasResult;
use crate::output::Outputable;

impl Outputable for SchemasResult {
    fn to_table(&self) -> String {
        let mut lines = vec![format!("Schemas in {}:", self.target), String::new()];

        if self.schemas.is_empty() {
            lines.push("No schemas found.".to_string());
            return lines.join("\n");
        }

        for schema in &self.schemas {
            lines.push(format!("  {}", schema));
        }
        lines.push(String::new());
        lines.push(format!("{} schema(s)", self.schemas.len()));
        lines.join("\n")
    }
}
