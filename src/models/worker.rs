use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::string_or_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub worker_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Worker {
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(Value::from(self.id)),
            "name" => Some(Value::String(self.name.clone())),
            "email" => Some(Value::String(self.email.clone())),
            "worker_type" => self.worker_type.clone().map(Value::String),
            _ => self.extra.get(key).cloned(),
        }
    }
}
