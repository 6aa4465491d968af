//! Type-aware record serialization for transport
//!
//! Converts domain records into the transport-stable mapping list endpoints
//! return. The rules are deliberate:
//!
//! - fixed-precision numerics become JSON floats (display values, not meant
//!   for recomputation)
//! - date/timestamp fields are emitted twice: a canonical string under
//!   `<field>_str` and the original key holding a UTC-adjusted Unix epoch
//! - everything else passes through unchanged

use crate::core::field::{FieldValue, Record};
use crate::core::schema::Schema;
use chrono::{FixedOffset, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value, json};

/// Timestamp string format: `YYYY-MM-DD HH:MM:SS`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Date string format: `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serializes records into transport mappings
///
/// Holds the UTC offset of the wall clock stored in date/timestamp fields,
/// fixed at process start from configuration.
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    utc_offset: FixedOffset,
}

impl Serializer {
    pub fn new(utc_offset: FixedOffset) -> Self {
        Self { utc_offset }
    }

    /// Convert a record into its transport mapping
    pub fn to_object(&self, record: &Record) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, value) in record {
            match value {
                FieldValue::Decimal(d) => {
                    // Precision loss is deliberate; transport values are for
                    // display, not recomputation.
                    out.insert(name.clone(), json!(d.to_f64()));
                }
                FieldValue::Timestamp(t) => {
                    out.insert(
                        format!("{}_str", name),
                        json!(t.format(TIMESTAMP_FORMAT).to_string()),
                    );
                    out.insert(name.clone(), json!(self.epoch_of(*t)));
                }
                FieldValue::Date(d) => {
                    out.insert(
                        format!("{}_str", name),
                        json!(d.format(DATE_FORMAT).to_string()),
                    );
                    let midnight = d.and_hms_opt(0, 0, 0).expect("midnight is valid");
                    out.insert(name.clone(), json!(self.epoch_of(midnight)));
                }
                FieldValue::String(s) => {
                    out.insert(name.clone(), json!(s));
                }
                FieldValue::Integer(i) => {
                    out.insert(name.clone(), json!(i));
                }
                FieldValue::Float(f) => {
                    out.insert(name.clone(), json!(f));
                }
                FieldValue::Boolean(b) => {
                    out.insert(name.clone(), json!(b));
                }
                FieldValue::Null => {
                    out.insert(name.clone(), Value::Null);
                }
            }
        }
        out
    }

    /// Unix epoch of a wall-clock datetime stored in the configured offset
    fn epoch_of(&self, wall: NaiveDateTime) -> i64 {
        wall.and_utc().timestamp() - i64::from(self.utc_offset.local_minus_utc())
    }
}

/// Copy a record, skipping identity and audit fields
///
/// Used to duplicate a domain object while letting storage assign fresh
/// identity and timestamps.
pub fn duplicate(record: &Record, schema: &Schema) -> Record {
    record
        .iter()
        .filter(|(name, _)| !schema.is_identity_or_audit(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldKind;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn utc() -> Serializer {
        Serializer::new(FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn test_passthrough_kinds() {
        let mut record = Record::new();
        record.insert("id".to_string(), FieldValue::Integer(3));
        record.insert("name".to_string(), FieldValue::from("banner"));
        record.insert("active".to_string(), FieldValue::Boolean(true));
        record.insert("ratio".to_string(), FieldValue::Float(0.5));
        record.insert("note".to_string(), FieldValue::Null);

        let obj = utc().to_object(&record);
        assert_eq!(obj["id"], json!(3));
        assert_eq!(obj["name"], json!("banner"));
        assert_eq!(obj["active"], json!(true));
        assert_eq!(obj["ratio"], json!(0.5));
        assert_eq!(obj["note"], Value::Null);
    }

    #[test]
    fn test_decimal_becomes_float() {
        let mut record = Record::new();
        record.insert(
            "budget".to_string(),
            FieldValue::Decimal(Decimal::new(123450, 2)), // 1234.50
        );
        let obj = utc().to_object(&record);
        assert_eq!(obj["budget"], json!(1234.5));
    }

    #[test]
    fn test_timestamp_dual_representation() {
        let wall = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap();
        let mut record = Record::new();
        record.insert("created_at".to_string(), FieldValue::Timestamp(wall));

        let obj = utc().to_object(&record);
        assert_eq!(obj["created_at_str"], json!("2021-03-04 12:30:05"));
        assert_eq!(obj["created_at"], json!(wall.and_utc().timestamp()));
    }

    #[test]
    fn test_date_dual_representation() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        let mut record = Record::new();
        record.insert("date_field".to_string(), FieldValue::Date(date));

        let obj = utc().to_object(&record);
        assert_eq!(obj["date_field_str"], json!("2021-03-04"));
        let midnight = date.and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(obj["date_field"], json!(midnight.and_utc().timestamp()));
    }

    #[test]
    fn test_epoch_adjusts_for_utc_offset() {
        // Wall clock stored at UTC+8: epoch must be 8 hours earlier than the
        // naive reading.
        let east8 = Serializer::new(FixedOffset::east_opt(8 * 3600).unwrap());
        let wall = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut record = Record::new();
        record.insert("created_at".to_string(), FieldValue::Timestamp(wall));

        let obj = east8.to_object(&record);
        assert_eq!(
            obj["created_at"],
            json!(wall.and_utc().timestamp() - 8 * 3600)
        );
        assert_eq!(obj["created_at_str"], json!("2021-03-04 08:00:00"));
    }

    #[test]
    fn test_str_and_epoch_agree() {
        // Round-trip property: parsing the _str value per its format and
        // epoch-converting it must reproduce the sibling integer.
        let offset = FixedOffset::east_opt(3600).unwrap();
        let serializer = Serializer::new(offset);
        let wall = NaiveDate::from_ymd_opt(2022, 11, 30)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let mut record = Record::new();
        record.insert("ts".to_string(), FieldValue::Timestamp(wall));

        let obj = serializer.to_object(&record);
        let reparsed =
            NaiveDateTime::parse_from_str(obj["ts_str"].as_str().unwrap(), TIMESTAMP_FORMAT)
                .unwrap();
        let expected = reparsed.and_utc().timestamp() - i64::from(offset.local_minus_utc());
        assert_eq!(obj["ts"], json!(expected));
    }

    #[test]
    fn test_duplicate_skips_identity_and_audit_fields() {
        let schema = Schema::new("campaign")
            .field("id", FieldKind::Integer)
            .field("name", FieldKind::String)
            .field("created_at", FieldKind::Timestamp)
            .field("updated_at", FieldKind::Timestamp);

        let mut record = Record::new();
        record.insert("id".to_string(), FieldValue::Integer(9));
        record.insert("name".to_string(), FieldValue::from("c"));
        record.insert(
            "created_at".to_string(),
            FieldValue::Timestamp(
                NaiveDate::from_ymd_opt(2021, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            ),
        );
        record.insert("updated_at".to_string(), FieldValue::Null);

        let copy = duplicate(&record, &schema);
        assert_eq!(copy.len(), 1);
        assert_eq!(copy["name"], FieldValue::from("c"));
        assert!(!copy.contains_key("id"));
        assert!(!copy.contains_key("created_at"));
        assert!(!copy.contains_key("updated_at"));
    }
}
