use super::execute::DdlResult;
use crate::output::Outputable;

impl Outputable for DdlResult {
    /// Statements as a runnable script.
    fn to_table(&self) -> String {
        let mut script = self.statements.join(";\n\n");
        if !script.is_empty() {
            script.push(';');
        }
        script
    }
}
