use super::execute::ExecResult;
use crate::output::Outputable;

impl Outputable for ExecResult {
    fn to_table(&self) -> String {
        format!("{} row(s) affected", self.affected_rows)
    }
}
