//! CSV persistence for extraction output and fill input.

use std::path::Path;

use tracing::warn;

use crate::error::CoreError;
use crate::model::{FillInstruction, ServiceItemRecord};

/// Write extracted service items to `path` with the
/// `serviceType,serviceItemType,measurement` header row.
pub fn write_service_items(
    path: impl AsRef<Path>,
    records: &[ServiceItemRecord],
) -> Result<(), CoreError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read back previously extracted service items, preserving row order.
pub fn read_service_items(path: impl AsRef<Path>) -> Result<Vec<ServiceItemRecord>, CoreError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Read fill instructions from the externally supplied takeoff data file.
///
/// Columns beyond `serviceItemType` and `value` are ignored. A malformed
/// row is logged and skipped; the rest of the batch is still returned.
pub fn read_fill_instructions(
    path: impl AsRef<Path>,
) -> Result<Vec<FillInstruction>, CoreError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut instructions = Vec::new();
    for (index, row) in reader.deserialize::<FillInstruction>().enumerate() {
        match row {
            Ok(instruction) => instructions.push(instruction),
            Err(e) => {
                warn!(row = index + 2, error = %e, "skipping malformed takeoff data row");
            }
        }
    }
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(service_type: &str, item: &str, measurement: &str) -> ServiceItemRecord {
        ServiceItemRecord {
            service_type: service_type.to_string(),
            service_item_type: item.to_string(),
            measurement: measurement.to_string(),
        }
    }

    #[test]
    fn service_items_round_trip_field_for_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("takeoff_service_items.csv");

        let records = vec![
            record("Lawn Care", "Mowing - Weekly", "SQFT"),
            record("Lawn Care", "Edging", "LF"),
            record("Irrigation", "Head Check", "EA"),
        ];
        write_service_items(&path, &records).unwrap();

        let read_back = read_service_items(&path).unwrap();
        assert_eq!(read_back, records);
    }

    #[test]
    fn service_items_header_uses_upstream_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_service_items(&path, &[record("A", "a1", "SQFT")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("serviceType,serviceItemType,measurement"));
    }

    #[test]
    fn fill_instructions_ignore_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("takeoff_data.csv");
        std::fs::write(
            &path,
            "serviceItemType,value,notes\nMowing - Weekly,42,front lawn\nEdging,7,\n",
        )
        .unwrap();

        let instructions = read_fill_instructions(&path).unwrap();
        assert_eq!(
            instructions,
            vec![
                FillInstruction {
                    service_item_type: "Mowing - Weekly".to_string(),
                    value: "42".to_string(),
                },
                FillInstruction {
                    service_item_type: "Edging".to_string(),
                    value: "7".to_string(),
                },
            ]
        );
    }

    #[test]
    fn malformed_fill_rows_are_skipped_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("takeoff_data.csv");
        std::fs::write(
            &path,
            "serviceItemType,value\nMowing,42\nrow-with-too-few-fields\nEdging,7\n",
        )
        .unwrap();

        let instructions = read_fill_instructions(&path).unwrap();
        let items: Vec<&str> = instructions
            .iter()
            .map(|i| i.service_item_type.as_str())
            .collect();
        assert_eq!(items, vec!["Mowing", "Edging"]);
    }

    #[test]
    fn missing_file_surfaces_an_error() {
        assert!(read_service_items("/nonexistent/takeoff.csv").is_err());
    }
}
