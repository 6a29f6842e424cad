//! Output formatting for compile command results.

use super::execute::CompileResult;
use crate::output::Outputable;

impl Outputable for CompileResult {
    fn to_table(&self) -> String {
        let mut lines = vec![format!("Collection: {}", self.collection)];
        for fragment in &self.fragments {
            lines.push(String::new());
            lines.push(format!("[{}]", fragment.clause));
            lines.push(fragment.query.explain());
        }
        lines.join("\n")
    }
}
