//! PostgreSQL type Object IDs (OIDs).
//!
//! The server identifies types by numeric OIDs. This module defines the
//! well-known OIDs of the types this crate has codecs for, plus their array
//! types so that element/array relationships can be resolved.

/// Money (8-byte signed count of cents)
pub const MONEY: u32 = 790;

/// Array of money
pub const MONEY_ARRAY: u32 = 791;

/// Calendar date
pub const DATE: u32 = 1082;

/// Time of day without time zone
pub const TIME: u32 = 1083;

/// Timestamp without time zone
pub const TIMESTAMP: u32 = 1114;

/// Array of timestamp
pub const TIMESTAMP_ARRAY: u32 = 1115;

/// Array of date
pub const DATE_ARRAY: u32 = 1182;

/// Array of time
pub const TIME_ARRAY: u32 = 1183;

/// Timestamp with time zone
pub const TIMESTAMPTZ: u32 = 1184;

/// Array of timestamptz
pub const TIMESTAMPTZ_ARRAY: u32 = 1185;

/// Time of day with time zone
pub const TIMETZ: u32 = 1266;

/// Array of timetz
pub const TIMETZ_ARRAY: u32 = 1270;

/// Get the element type OID for an array type.
pub const fn element_oid(array_oid: u32) -> Option<u32> {
    match array_oid {
        MONEY_ARRAY => Some(MONEY),
        DATE_ARRAY => Some(DATE),
        TIME_ARRAY => Some(TIME),
        TIMETZ_ARRAY => Some(TIMETZ),
        TIMESTAMP_ARRAY => Some(TIMESTAMP),
        TIMESTAMPTZ_ARRAY => Some(TIMESTAMPTZ),
        _ => None,
    }
}

/// Get the array type OID for an element type.
pub const fn array_oid(element_oid: u32) -> Option<u32> {
    match element_oid {
        MONEY => Some(MONEY_ARRAY),
        DATE => Some(DATE_ARRAY),
        TIME => Some(TIME_ARRAY),
        TIMETZ => Some(TIMETZ_ARRAY),
        TIMESTAMP => Some(TIMESTAMP_ARRAY),
        TIMESTAMPTZ => Some(TIMESTAMPTZ_ARRAY),
        _ => None,
    }
}

/// Check if an OID is a known array type.
pub const fn is_array(oid: u32) -> bool {
    element_oid(oid).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_oid_mapping() {
        assert_eq!(element_oid(TIMETZ_ARRAY), Some(TIMETZ));
        assert_eq!(element_oid(DATE_ARRAY), Some(DATE));
        assert_eq!(element_oid(TIMETZ), None);
    }

    #[test]
    fn test_array_oid_mapping() {
        for oid in [MONEY, DATE, TIME, TIMETZ, TIMESTAMP, TIMESTAMPTZ] {
            let array = array_oid(oid).unwrap();
            assert!(is_array(array));
            assert_eq!(element_oid(array), Some(oid));
        }
        assert_eq!(array_oid(999_999), None);
    }
}
