//! In-memory store doubles for task-level tests.
//!
//! Pairs with `hearth_browser::testing::FakeSurface` so a whole worker flow
//! can run without a browser, a store, or the network.

use crate::task::SessionFactory;
use async_trait::async_trait;
use hearth_browser::testing::FakeSurface;
use hearth_browser::SessionSurface;
use hearth_core::{PropertyRow, RecordId};
use hearth_store::{ArtifactStorage, RecordStore, StoreError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Record store holding rows in memory and recording every update.
#[derive(Default)]
pub struct InMemoryRecordStore {
    rows: Mutex<Vec<PropertyRow>>,
    updates: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl InMemoryRecordStore {
    /// Create a store seeded with `(id, address)` rows.
    #[must_use]
    pub fn with_rows(rows: &[(&str, &str)]) -> Self {
        let rows = rows
            .iter()
            .map(|(id, address)| PropertyRow {
                id: RecordId::new(*id).expect("valid record id"),
                address: (*address).to_string(),
            })
            .collect();
        Self {
            rows: Mutex::new(rows),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// Every `(row_id, field_map)` update applied, in order.
    #[must_use]
    pub fn updates(&self) -> Vec<(String, Map<String, Value>)> {
        self.updates.lock().expect("store lock").clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select_rows(&self) -> hearth_store::Result<Vec<PropertyRow>> {
        Ok(self.rows.lock().expect("store lock").clone())
    }

    async fn update_fields(
        &self,
        id: &RecordId,
        fields: &Map<String, Value>,
    ) -> hearth_store::Result<()> {
        self.updates
            .lock()
            .expect("store lock")
            .push((id.as_str().to_string(), fields.clone()));
        Ok(())
    }
}

/// Artifact storage keeping uploads in memory.
#[derive(Default)]
pub struct InMemoryArtifacts {
    uploads: Mutex<HashMap<String, Vec<u8>>>,
    reject_uploads: Mutex<bool>,
}

impl InMemoryArtifacts {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail, to exercise the terminal
    /// upload-failure path.
    pub fn reject_uploads(&self) {
        *self.reject_uploads.lock().expect("artifact lock") = true;
    }

    /// `bucket/name` keys of everything uploaded.
    #[must_use]
    pub fn uploaded_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .uploads
            .lock()
            .expect("artifact lock")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ArtifactStorage for InMemoryArtifacts {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> hearth_store::Result<()> {
        if *self.reject_uploads.lock().expect("artifact lock") {
            return Err(StoreError::Upload(format!("{bucket}/{name} rejected")));
        }
        let key = format!("{bucket}/{name}");
        let mut uploads = self.uploads.lock().expect("artifact lock");
        if uploads.contains_key(&key) {
            return Err(StoreError::Upload(format!("{key} already exists")));
        }
        uploads.insert(key, bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("memory://{bucket}/{name}")
    }
}

/// Factory returning clones of one scripted fake surface.
pub struct FakeSessionFactory {
    surface: FakeSurface,
}

impl FakeSessionFactory {
    /// Wrap a prepared fake surface.
    #[must_use]
    pub fn new(surface: FakeSurface) -> Self {
        Self { surface }
    }
}

#[async_trait]
impl SessionFactory for FakeSessionFactory {
    async fn create(&self) -> hearth_browser::Result<Arc<dyn SessionSurface>> {
        Ok(Arc::new(self.surface.clone()))
    }
}
