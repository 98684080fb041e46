//! In-memory [`Backend`] used by the handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{display_path, Backend, BackendError};

pub struct MemoryBackend {
    data: Mutex<Map<String, Value>>,
    unavailable: bool,
}

impl MemoryBackend {
    /// `data` is a json-server style database: collection name to array,
    /// singular resource name to object.
    pub fn new(data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        MemoryBackend {
            data: Mutex::new(data),
            unavailable: false,
        }
    }

    /// A backend whose every request fails at the transport level.
    pub fn unavailable() -> Self {
        MemoryBackend {
            data: Mutex::new(Map::new()),
            unavailable: true,
        }
    }

    pub fn snapshot(&self, key: &str) -> Value {
        self.data
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.unavailable {
            return Err(BackendError::Transport("connection refused".to_owned()));
        }
        Ok(())
    }
}

fn id_matches(record: &Value, id: &str) -> bool {
    match record.get("id") {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

fn merge(target: &mut Value, fields: Value) {
    if let (Value::Object(target), Value::Object(fields)) = (target, fields) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
}

fn not_found(segments: &[&str]) -> BackendError {
    BackendError::NotFound(display_path(segments))
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, segments: &[&str]) -> Result<Value, BackendError> {
        self.check()?;
        let collection = segments.first().copied().unwrap_or_default();
        let data = self.data.lock().unwrap();
        let value = data.get(collection).ok_or_else(|| not_found(segments))?;
        match (segments.get(1), value) {
            (None, value) => Ok(value.clone()),
            (Some(id), Value::Array(records)) => records
                .iter()
                .find(|r| id_matches(r, id))
                .cloned()
                .ok_or_else(|| not_found(segments)),
            (Some(_), _) => Err(not_found(segments)),
        }
    }

    async fn patch(&self, segments: &[&str], body: Value) -> Result<Value, BackendError> {
        self.check()?;
        let collection = segments.first().copied().unwrap_or_default();
        let mut data = self.data.lock().unwrap();
        let value = data
            .get_mut(collection)
            .ok_or_else(|| not_found(segments))?;
        let record = match (segments.get(1), value) {
            (None, value) => value,
            (Some(id), Value::Array(records)) => records
                .iter_mut()
                .find(|r| id_matches(r, id))
                .ok_or_else(|| not_found(segments))?,
            (Some(_), _) => return Err(not_found(segments)),
        };
        if !record.is_object() {
            return Err(not_found(segments));
        }
        merge(record, body);
        Ok(record.clone())
    }
}
