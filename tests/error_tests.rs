//! Tests for the `DptError` enum and its `Display` and `Serialize` implementations.

use knx_dpt::error::DptError;

/// Tests that the `NotFound` variant carries the input as given.
#[test]
fn test_not_found_error() {
    let err = DptError::NotFound("DPT-42".to_string());
    assert_eq!(err.to_string(), "DPT could not be found: DPT-42");
}

/// Tests that the `PayloadTruncated` variant names the bit position.
#[test]
fn test_payload_truncated_error() {
    let err = DptError::PayloadTruncated { bit: 24 };
    assert_eq!(err.to_string(), "telegram payload truncated at bit 24");
}

/// Tests that the `UnsupportedWidth` variant is correctly formatted.
#[test]
fn test_unsupported_width_error() {
    let err = DptError::UnsupportedWidth(12);
    assert_eq!(err.to_string(), "Unsupported field width: 12 bits");
}

/// Tests that the `InvalidGroupAddress` variant is correctly formatted.
#[test]
fn test_invalid_group_address_error() {
    let err = DptError::InvalidGroupAddress("32/0/0".to_string());
    assert_eq!(err.to_string(), "Invalid group address: 32/0/0");
}

/// Tests that I/O errors convert into `CatalogIo`.
#[test]
fn test_catalog_io_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: DptError = io.into();
    assert!(matches!(err, DptError::CatalogIo(_)));
    assert_eq!(err.to_string(), "Catalog I/O error: gone");
}

/// Errors appear in JSON output as their message.
#[test]
fn test_error_serializes_as_message() {
    let err = DptError::InsufficientPayload {
        available: 8,
        required: 24,
    };
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        serde_json::json!("telegram payload too few bits for given DPT: 8 < 24")
    );
}
