//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes an `invalid_request` error whose details name the
//! offending camelCase field and a stable code.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{DepartureWindow, Error, Location, RiderValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    OutOfRange,
    InvalidWindow,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::InvalidWindow => "invalid_window",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Parse a UUID-backed identifier such as `UserId` or `RequestId`.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: From<Uuid>,
{
    let name = field.as_str();
    Uuid::parse_str(value.trim()).map(T::from).map_err(|_| {
        field_value_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{name} must be a valid UUID"),
            value,
        )
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    let name = field.as_str();
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field_value_error(
                field,
                ErrorCode::InvalidTimestamp,
                format!("{name} must be an RFC 3339 timestamp"),
                value,
            )
        })
}

/// Build a coordinate, attributing range errors to the matching field.
pub(crate) fn parse_location(
    latitude: f64,
    longitude: f64,
    latitude_field: FieldName,
    longitude_field: FieldName,
) -> Result<Location, Error> {
    Location::new(latitude, longitude).map_err(|err| {
        let field = match err {
            RiderValidationError::Longitude(_) => longitude_field,
            _ => latitude_field,
        };
        field_error(field, ErrorCode::OutOfRange, err.to_string())
    })
}

/// Parse both window bounds and require `start < end`.
pub(crate) fn parse_window(
    start: &str,
    end: &str,
    start_field: FieldName,
    end_field: FieldName,
) -> Result<DepartureWindow, Error> {
    let earliest = parse_rfc3339_timestamp(start, start_field)?;
    let latest = parse_rfc3339_timestamp(end, end_field)?;
    DepartureWindow::new(earliest, latest)
        .map_err(|err| field_error(start_field, ErrorCode::InvalidWindow, err.to_string()))
}
