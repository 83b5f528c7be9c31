//! Record store access: row reads and paired field/status writes.
//!
//! The store is the only shared mutable resource in a run. All writes are
//! single-row update-by-id calls scoped to a task's own column family, so
//! concurrent tasks touching disjoint fields of the same row need no
//! locking; last-writer-wins on overlapping fields is accepted.

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use hearth_core::{CollectionStatus, DataDomain, PropertyRow, RecordId, StoreConfig};
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;

/// A paired field/status write.
///
/// Every enrichment write couples a data column with its companion status
/// column set to the completion marker, so readers can distinguish "null
/// because uncollected" from "null because the source had nothing".
#[derive(Debug, Clone, Default)]
pub struct FieldUpdate {
    fields: Map<String, Value>,
}

impl FieldUpdate {
    /// Start an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a domain's data value and mark its collection complete.
    ///
    /// A `Value::Null` data value is written as-is — an extraction that
    /// found nothing still completes the domain.
    #[must_use]
    pub fn set(mut self, domain: DataDomain, value: Value) -> Self {
        self.fields.insert(domain.data_column().to_string(), value);
        self.fields.insert(
            domain.status_column().to_string(),
            Value::String(CollectionStatus::Complete.as_str().to_string()),
        );
        self
    }

    /// Whether nothing was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The raw column map sent to the store.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Capability interface over the external record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read `id, address` for every property row.
    async fn select_rows(&self) -> Result<Vec<PropertyRow>>;

    /// Apply a column map to one row by id.
    async fn update_fields(&self, id: &RecordId, fields: &Map<String, Value>) -> Result<()>;
}

/// Apply one update to every matched row.
///
/// Duplicate address rows are expected in the store; the same field update
/// goes to all of them, by id, one call per row.
pub async fn apply_to_rows(
    store: &dyn RecordStore,
    rows: &[PropertyRow],
    update: &FieldUpdate,
) -> Result<usize> {
    let mut updated = 0;
    for row in rows {
        store.update_fields(&row.id, update.as_map()).await?;
        tracing::debug!(id = %row.id, address = %row.address, "row updated");
        updated += 1;
    }
    Ok(updated)
}

/// PostgREST-style HTTP client for the record store.
#[derive(Debug)]
pub struct RestRecordStore {
    client: Client,
    base_url: String,
    service_key: String,
    table: String,
}

impl RestRecordStore {
    /// Create a client from store configuration.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        url::Url::parse(&config.url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", config.url)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            table: config.records_table.clone(),
        })
    }

    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(StoreError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn select_rows(&self) -> Result<Vec<PropertyRow>> {
        let response = self
            .client
            .get(self.rest_url())
            .query(&[("select", "id,address")])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let rows: Vec<PropertyRow> = response.json().await?;
        tracing::debug!(rows = rows.len(), table = %self.table, "selected property rows");
        Ok(rows)
    }

    async fn update_fields(&self, id: &RecordId, fields: &Map<String, Value>) -> Result<()> {
        let response = self
            .client
            .patch(self.rest_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=minimal")
            .json(fields)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str) -> StoreConfig {
        StoreConfig {
            url: url.to_string(),
            service_key: "service-key".to_string(),
            records_table: "property_detail".to_string(),
        }
    }

    #[test]
    fn test_field_update_pairs_data_with_status() {
        let update = FieldUpdate::new()
            .set(DataDomain::FloodFactor, json!("4/10"))
            .set(DataDomain::FireFactor, Value::Null);

        let map = update.as_map();
        assert_eq!(map.get("flood_factor_data"), Some(&json!("4/10")));
        assert_eq!(
            map.get("flood_factor_collection_status"),
            Some(&json!("complete"))
        );
        // Null data still completes the domain.
        assert_eq!(map.get("fire_factor_data"), Some(&Value::Null));
        assert_eq!(
            map.get("fire_factor_collection_status"),
            Some(&json!("complete"))
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = RestRecordStore::new(&config("not a url")).expect_err("must fail");
        assert!(matches!(err, StoreError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_select_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/property_detail"))
            .and(query_param("select", "id,address"))
            .and(header("apikey", "service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "1", "address": "123 Main St, Springfield, IL 62704"},
                {"id": "2", "address": "500 Pine Ct, Austin, TX 78701"}
            ])))
            .mount(&server)
            .await;

        let store = RestRecordStore::new(&config(&server.uri())).expect("create store");
        let rows = store.select_rows().await.expect("select rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_str(), "1");
    }

    #[tokio::test]
    async fn test_update_fields_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/property_detail"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestRecordStore::new(&config(&server.uri())).expect("create store");
        let id = RecordId::new("7").expect("valid id");
        let update = FieldUpdate::new().set(DataDomain::SchoolDistrict, json!("https://x/map.png"));
        store
            .update_fields(&id, update.as_map())
            .await
            .expect("update row");
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/property_detail"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let store = RestRecordStore::new(&config(&server.uri())).expect("create store");
        let err = store.select_rows().await.expect_err("must fail");
        match err {
            StoreError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("bad key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_apply_to_rows_fans_out() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/property_detail"))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&server)
            .await;

        let store = RestRecordStore::new(&config(&server.uri())).expect("create store");
        let rows = vec![
            PropertyRow {
                id: RecordId::new("1").expect("valid id"),
                address: "123 Main St".to_string(),
            },
            PropertyRow {
                id: RecordId::new("2").expect("valid id"),
                address: "123 Main St".to_string(),
            },
        ];
        let update = FieldUpdate::new().set(DataDomain::OffenderMap, json!("url"));
        let updated = apply_to_rows(&store, &rows, &update)
            .await
            .expect("fan-out update");
        assert_eq!(updated, 2);
    }
}
