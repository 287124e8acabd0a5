//! Tree-table extraction.
//!
//! Flattens the two-level parent/child table on the takeoff screen into
//! (service type, service item, measurement) records.

use tracing::debug;

use crate::model::{ServiceItemRecord, TableRow};

/// Flatten a traversal-ordered row sequence into service-item records.
///
/// Single left-to-right pass. A row at indent 0 becomes the current parent
/// and emits nothing; a nested row emits one record under the current
/// parent. Nested rows seen before any parent, and rows without level
/// information, are dropped without error — this mirrors the host screen's
/// observed behavior and is deliberate.
pub fn extract_service_items(rows: &[TableRow]) -> Vec<ServiceItemRecord> {
    let mut records = Vec::new();
    let mut current_parent: Option<&str> = None;

    for row in rows {
        match row.indent {
            Some(0) => current_parent = Some(&row.label),
            Some(_) => match current_parent {
                Some(parent) => records.push(ServiceItemRecord {
                    service_type: parent.to_string(),
                    service_item_type: row.label.clone(),
                    measurement: row.secondary_text.clone(),
                }),
                None => {
                    debug!(label = %row.label, "dropping nested row seen before any parent");
                }
            },
            None => {}
        }
    }

    records
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
