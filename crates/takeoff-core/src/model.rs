//! Data model for the takeoff screens.

use serde::{Deserialize, Serialize};

/// Marker Aspire's tree table puts on the toggler button of every levelled row.
const MARGIN_MARKER: &str = "margin-left:";

/// One row of the service-item tree table, as snapshotted from the DOM.
///
/// `indent` is derived from the row's toggler control: `Some(0)` marks a
/// top-level service type, `Some(n)` with `n > 0` marks a nested service
/// item, and `None` means the row carried no level information at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Primary cell text (service type or service item name).
    pub label: String,
    /// Secondary cell text (measurement/unit).
    pub secondary_text: String,
    /// Nesting level in margin pixels, if the toggler exposed one.
    pub indent: Option<u32>,
}

impl TableRow {
    /// Build a row from its two cell texts and the toggler's inline style.
    pub fn from_cells(
        label: impl Into<String>,
        secondary_text: impl Into<String>,
        toggler_style: Option<&str>,
    ) -> Self {
        Self {
            label: label.into(),
            secondary_text: secondary_text.into(),
            indent: toggler_style.and_then(indent_from_style),
        }
    }
}

/// Parse a nesting level out of a toggler button's inline style.
///
/// Aspire encodes tree depth as a `margin-left` on the toggler. A zero
/// margin marks a parent row; any other margin marks a nested row. Styles
/// without the marker yield `None` and the row is treated as unlevelled.
pub fn indent_from_style(style: &str) -> Option<u32> {
    let rest = style[style.find(MARGIN_MARKER)? + MARGIN_MARKER.len()..].trim_start();
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };
    // A marker with an unparseable value still marks a nested row.
    Some(digits.parse::<u32>().unwrap_or(1))
}

/// One flattened (parent, child, measurement) record, persisted to
/// `takeoff_service_items.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItemRecord {
    /// Label of the owning top-level service type.
    #[serde(rename = "serviceType")]
    pub service_type: String,
    /// Label of the nested service item.
    #[serde(rename = "serviceItemType")]
    pub service_item_type: String,
    /// Measurement/unit text.
    pub measurement: String,
}

/// One fill instruction read from `takeoff_data.csv`.
///
/// `service_item_type` is matched against live rows by substring, not
/// equality; `value` is written as text into the first visible numeric
/// input of the matched rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillInstruction {
    /// Service item to locate on the page.
    #[serde(rename = "serviceItemType")]
    pub service_item_type: String,
    /// Numeric text to write.
    pub value: String,
}
