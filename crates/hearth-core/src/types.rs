//! Shared types used across the Hearth workspace.
//!
//! This module defines the newtypes and enums that model the enrichment
//! domain: record identity, collection status, the per-task data domains
//! and their record-store column mapping.

use crate::error::HearthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for record-store row identifiers.
///
/// The store assigns ids; Hearth only carries them back into
/// `update`-by-id calls, so the only constraints are non-emptiness and a
/// sane length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new `RecordId` from a string.
    ///
    /// # Errors
    /// Returns error if the id is empty or unreasonably long.
    pub fn new(id: impl Into<String>) -> Result<Self, HearthError> {
        let id = id.into();
        if id.is_empty() {
            return Err(HearthError::Validation(
                "record id cannot be empty".to_string(),
            ));
        }
        if id.len() > 128 {
            return Err(HearthError::Validation(format!(
                "record id too long: {} characters (max 128)",
                id.len()
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the external record store, as read by the matcher.
///
/// Workers only ever read `id` and `address`; all other columns are written
/// blindly through [`DataDomain`] field maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRow {
    /// Store-assigned row id
    pub id: RecordId,
    /// Address string of record
    pub address: String,
}

/// Collection status for an enrichment field pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    /// Not yet attempted
    Pending,
    /// A worker is currently collecting this domain
    InProgress,
    /// Collection finished and the data column is populated
    Complete,
    /// Collection failed after exhausting retries
    Failed,
}

impl CollectionStatus {
    /// Status marker as written to the store's `_collection_status` columns.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The data domains a worker can enrich.
///
/// Each domain maps to a `<domain>_data` column and a companion
/// `<domain>_collection_status` column in the record store; writes always
/// pair the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataDomain {
    /// Registered-offender proximity map artifact
    OffenderMap,
    /// School district boundary map artifact
    SchoolDistrict,
    /// Generated valuation report workbook
    ValuationReport,
    /// Flood risk score
    FloodFactor,
    /// Fire risk score
    FireFactor,
    /// Wind risk score
    WindFactor,
    /// Air quality risk score
    AirFactor,
    /// Heat risk score
    HeatFactor,
}

impl DataDomain {
    /// Name of the data column in the record store.
    #[must_use]
    pub fn data_column(&self) -> &'static str {
        match self {
            Self::OffenderMap => "offender_map_data",
            Self::SchoolDistrict => "school_district_data",
            Self::ValuationReport => "valuation_report_data",
            Self::FloodFactor => "flood_factor_data",
            Self::FireFactor => "fire_factor_data",
            Self::WindFactor => "wind_factor_data",
            Self::AirFactor => "air_factor_data",
            Self::HeatFactor => "heat_factor_data",
        }
    }

    /// Name of the companion status column.
    #[must_use]
    pub fn status_column(&self) -> &'static str {
        match self {
            Self::OffenderMap => "offender_map_collection_status",
            Self::SchoolDistrict => "school_district_collection_status",
            Self::ValuationReport => "valuation_report_collection_status",
            Self::FloodFactor => "flood_factor_collection_status",
            Self::FireFactor => "fire_factor_collection_status",
            Self::WindFactor => "wind_factor_collection_status",
            Self::AirFactor => "air_factor_collection_status",
            Self::HeatFactor => "heat_factor_collection_status",
        }
    }

    /// Human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OffenderMap => "Offender Map",
            Self::SchoolDistrict => "School District",
            Self::ValuationReport => "Valuation Report",
            Self::FloodFactor => "Flood Factor",
            Self::FireFactor => "Fire Factor",
            Self::WindFactor => "Wind Factor",
            Self::AirFactor => "Air Factor",
            Self::HeatFactor => "Heat Factor",
        }
    }

    /// The five risk-score domains, in extraction schema order.
    #[must_use]
    pub fn risk_factors() -> [Self; 5] {
        [
            Self::FloodFactor,
            Self::FireFactor,
            Self::WindFactor,
            Self::AirFactor,
            Self::HeatFactor,
        ]
    }
}

impl fmt::Display for DataDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, HearthError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| HearthError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_valid() {
        let id = RecordId::new("42").expect("valid record id");
        assert_eq!(id.as_str(), "42");

        let uuid_like = "550e8400-e29b-41d4-a716-446655440000";
        let id = RecordId::new(uuid_like).expect("valid record id");
        assert_eq!(id.to_string(), uuid_like);
    }

    #[test]
    fn test_record_id_invalid() {
        assert!(RecordId::new("").is_err());
        assert!(RecordId::new("x".repeat(129)).is_err());
    }

    #[test]
    fn test_domain_column_pairing() {
        for domain in [
            DataDomain::OffenderMap,
            DataDomain::SchoolDistrict,
            DataDomain::ValuationReport,
            DataDomain::FloodFactor,
            DataDomain::FireFactor,
            DataDomain::WindFactor,
            DataDomain::AirFactor,
            DataDomain::HeatFactor,
        ] {
            assert!(domain.data_column().ends_with("_data"));
            assert!(domain.status_column().ends_with("_collection_status"));
            let stem = domain.data_column().trim_end_matches("_data");
            assert!(domain.status_column().starts_with(stem));
        }
    }

    #[test]
    fn test_risk_factor_order() {
        let factors = DataDomain::risk_factors();
        assert_eq!(factors[0], DataDomain::FloodFactor);
        assert_eq!(factors[4], DataDomain::HeatFactor);
    }

    #[test]
    fn test_collection_status_marker() {
        assert_eq!(CollectionStatus::Complete.as_str(), "complete");
        let json = serde_json::to_string(&CollectionStatus::Complete).expect("serialize status");
        assert_eq!(json, "\"complete\"");
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::now();
        let s = ts.to_rfc3339();
        let parsed = Timestamp::from_rfc3339(&s).expect("parse RFC3339 timestamp");
        assert_eq!(ts.timestamp(), parsed.timestamp());
    }

    #[test]
    fn test_timestamp_ordering() {
        let ts1 = Timestamp::now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let ts2 = Timestamp::now();
        assert!(ts2 > ts1);
    }

    #[test]
    fn test_property_row_deserialize() {
        let row: PropertyRow =
            serde_json::from_str(r#"{"id":"7","address":"123 Main St, Springfield, IL 62704"}"#)
                .expect("deserialize row");
        assert_eq!(row.id.as_str(), "7");
        assert!(row.address.starts_with("123 Main"));
    }
}
