//! Output formatting for column listings.

use super::execute::ColumnsResult;
use crate::output::{render_grid, Outputable};

impl Outputable for ColumnsResult {
    fn to_table(&self) -> String {
        let headers: Vec<String> = ["column", "type", "null", "key"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let rows: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.type_name.clone(),
                    if c.nullable { "yes" } else { "no" }.to_string(),
                    if c.is_primary_key { "PK" } else { "" }.to_string(),
                ]
            })
            .collect();

        format!(
            "Columns of {}.{}:\n\n{}",
            self.schema,
            self.table,
            render_grid(&headers, &rows)
        )
    }
}
