use surrealdb::RecordId;

use crate::errors::{Error, Result};

/// Parse a `table:key` string back into a record id. Token subjects and
/// client-supplied references arrive in this form.
pub fn parse_record_id(val: &str) -> Result<RecordId> {
    let mut parts = val.trim().splitn(2, ':');
    match (parts.next(), parts.next()) {
        (Some(table), Some(key)) if !table.is_empty() && !key.is_empty() => {
            Ok(RecordId::from_table_key(table, key))
        }
        _ => Err(Error::BadRequest(format!("Malformed record id: {val}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        let id = parse_record_id("users:abc123").expect("Failed to parse");
        assert_eq!(id, RecordId::from_table_key("users", "abc123"));
    }

    #[test]
    fn test_rejects_missing_parts() {
        assert!(parse_record_id("users").is_err());
        assert!(parse_record_id(":abc").is_err());
        assert!(parse_record_id("users:").is_err());
    }
}
