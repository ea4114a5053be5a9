//! Kind-partitioned object store

use bytes::Bytes;
use gatekeeper_storage::SnapshotBackend;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::DbError;
use crate::models::{Entity, EntityMeta, META_FIELDS};
use crate::utils::Clock;

/// Conjunction of `field == value` conditions
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: BTreeMap<String, Value>,
}

impl Filter {
    /// Filter matching every entity
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `field == value` condition
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn matches(&self, fields: &Map<String, Value>) -> Result<bool, DbError> {
        for (field, expected) in &self.conditions {
            let actual = fields
                .get(field)
                .ok_or_else(|| DbError::Validation(format!("Unknown field: {}", field)))?;
            if actual != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// In-memory collection preserving insertion order
struct Collection<T> {
    entries: HashMap<String, T>,
    order: Vec<String>,
}

impl<T: Entity> Collection<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn upsert(&mut self, entity: T) {
        let id = entity.id().to_string();
        if !self.entries.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.entries.insert(id, entity);
    }

    fn remove(&mut self, id: &str) -> bool {
        if self.entries.remove(id).is_none() {
            return false;
        }
        self.order.retain(|k| k != id);
        true
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Serialize the whole collection as `{ id: fields }`
    fn encode(&self) -> Result<Bytes, DbError> {
        let mut document = Map::new();
        for entity in self.iter() {
            document.insert(entity.id().to_string(), serde_json::to_value(entity)?);
        }
        Ok(Bytes::from(serde_json::to_vec(&Value::Object(document))?))
    }

    fn decode(data: &[u8]) -> Result<Self, DbError> {
        let document: Map<String, Value> = serde_json::from_slice(data)?;
        let mut collection = Self::new();
        for (_, fields) in document {
            collection.upsert(serde_json::from_value(fields)?);
        }
        Ok(collection)
    }
}

/// Serialized field set of an entity
fn fields_of<T: Entity>(entity: &T) -> Result<Map<String, Value>, DbError> {
    match serde_json::to_value(entity)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(DbError::Validation(format!(
            "{} does not serialize to an object",
            T::KIND
        ))),
    }
}

/// Store for one entity kind
///
/// Reads go straight to the in-memory collection. Every mutation updates
/// memory first and then writes the complete collection to the snapshot
/// backend; writes for a kind are serialized so snapshots land in the same
/// order as the mutations they capture.
pub struct ObjectStore<T: Entity> {
    backend: Arc<dyn SnapshotBackend>,
    clock: Arc<dyn Clock>,
    collection: RwLock<Collection<T>>,
    writer: tokio::sync::Mutex<()>,
}

impl<T: Entity> ObjectStore<T> {
    /// Create an empty store; call [`ObjectStore::load_snapshot`] to seed it
    pub fn new(backend: Arc<dyn SnapshotBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            collection: RwLock::new(Collection::new()),
            writer: tokio::sync::Mutex::new(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        T::KIND
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Build a new entity with a fresh id and timestamps (not persisted)
    pub fn create(&self, build: impl FnOnce(EntityMeta) -> T) -> T {
        build(EntityMeta::new(self.clock.now()))
    }

    /// Get an entity by ID
    pub fn get(&self, id: &str) -> Option<T> {
        self.collection.read().entries.get(id).cloned()
    }

    /// All entities whose fields equal every condition of `filter`
    ///
    /// An empty filter returns the whole kind in insertion order. Naming a
    /// field the kind does not have is a validation error.
    pub fn search(&self, filter: &Filter) -> Result<Vec<T>, DbError> {
        let collection = self.collection.read();

        if filter.is_empty() {
            return Ok(collection.iter().cloned().collect());
        }

        let mut found = Vec::new();
        for entity in collection.iter() {
            if filter.matches(&fields_of(entity)?)? {
                found.push(entity.clone());
            }
        }
        Ok(found)
    }

    /// All entities in insertion order
    pub fn all(&self) -> Vec<T> {
        self.collection.read().iter().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.collection.read().entries.len()
    }

    /// Insert or replace an entity and write the snapshot
    pub async fn save(&self, entity: &mut T) -> Result<(), DbError> {
        let _writer = self.writer.lock().await;

        let data = {
            let mut collection = self.collection.write();
            entity.meta_mut().touch(self.clock.now());
            collection.upsert(entity.clone());
            collection.encode()?
        };

        debug!("Saved {} {}", T::KIND, entity.id());
        self.write_snapshot(data).await
    }

    /// Remove an entity and write the snapshot
    ///
    /// Returns `false` without writing anything if the entity was not stored.
    pub async fn remove(&self, entity: &T) -> Result<bool, DbError> {
        let _writer = self.writer.lock().await;

        let data = {
            let mut collection = self.collection.write();
            if !collection.remove(entity.id()) {
                return Ok(false);
            }
            collection.encode()?
        };

        debug!("Removed {} {}", T::KIND, entity.id());
        self.write_snapshot(data).await?;
        Ok(true)
    }

    /// Apply field changes to an entity, then save it
    ///
    /// Every key must name an existing, mutable field; otherwise nothing is
    /// changed and a validation error is returned.
    pub async fn update(&self, entity: &mut T, changes: &Map<String, Value>) -> Result<(), DbError> {
        let mut fields = fields_of(entity)?;

        for (field, value) in changes {
            if META_FIELDS.contains(&field.as_str()) || !fields.contains_key(field) {
                return Err(DbError::Validation(format!(
                    "Cannot update field '{}' of {}",
                    field,
                    T::KIND
                )));
            }
            fields.insert(field.clone(), value.clone());
        }

        let updated: T = serde_json::from_value(Value::Object(fields))
            .map_err(|e| DbError::Validation(e.to_string()))?;
        *entity = updated;

        self.save(entity).await
    }

    /// Keep only the entities for which `keep` is true
    ///
    /// Writes a single snapshot, and none at all when nothing was removed.
    pub async fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> Result<usize, DbError> {
        let _writer = self.writer.lock().await;

        let (removed, data) = {
            let mut collection = self.collection.write();
            let doomed: Vec<String> = collection
                .iter()
                .filter(|entity| !keep(*entity))
                .map(|entity| entity.id().to_string())
                .collect();
            if doomed.is_empty() {
                return Ok(0);
            }
            for id in &doomed {
                collection.remove(id);
            }
            (doomed.len(), collection.encode()?)
        };

        debug!("Removed {} {} entities", removed, T::KIND);
        self.write_snapshot(data).await?;
        Ok(removed)
    }

    /// Replace the in-memory collection with the stored snapshot
    ///
    /// A kind that was never written loads as empty. On error the current
    /// collection is left untouched.
    pub async fn load_snapshot(&self) -> Result<usize, DbError> {
        let _writer = self.writer.lock().await;

        let loaded = match self.backend.read_all(T::KIND).await? {
            Some(data) => Collection::decode(&data)?,
            None => Collection::new(),
        };
        let count = loaded.entries.len();

        *self.collection.write() = loaded;

        debug!("Loaded {} {} entities from snapshot", count, T::KIND);
        Ok(count)
    }

    async fn write_snapshot(&self, data: Bytes) -> Result<(), DbError> {
        self.backend.write_all(T::KIND, data).await.map_err(|e| {
            warn!("Failed to write {} snapshot: {}", T::KIND, e);
            DbError::from(e)
        })
    }
}
