//! Output formatting for relation listings.

use super::execute::TablesResult;
use crate::output::{render_grid, Outputable};

impl Outputable for TablesResult {
    fn to_table(&self) -> String {
        let mut lines = vec![format!("Relations in schema {}:", self.schema), String::new()];

        if self.tables.is_empty() {
            lines.push("No relations found.".to_string());
            return lines.join("\n");
        }

        let rows: Vec<Vec<String>> = self
            .tables
            .iter()
            .map(|t| vec![t.name.clone(), t.kind.label().to_string()])
            .collect();
        lines.push(render_grid(&["name".to_string(), "kind".to_string()], &rows));
        lines.join("\n")
    }
}
