//! Output formatting for shape command results.

use super::execute::ShapeResult;
use crate::output::Outputable;
use crate::query::params::describe_slots;

impl Outputable for ShapeResult {
    fn to_table(&self) -> String {
        let cacheable = match &self.reason {
            None => "yes".to_string(),
            Some(reason) => format!("no ({})", reason),
        };
        [
            format!("Collection: {}", self.collection),
            format!("Shape: {}", self.shape),
            format!("Cacheable: {}", cacheable),
            format!("Cached: {}", if self.cached { "yes" } else { "no" }),
            format!("Parameters: {}", describe_slots(&self.slots)),
        ]
        .join("\n")
    }
}
