use serde::Serialize;
use serde_json::{Map, Value};

/// Raw request fields. `None` means the key was absent from the body,
/// `Some(Value::Null)` means it was sent as `null`.
#[derive(Debug, Default, Clone)]
pub struct UserFields {
    pub username: Option<Value>,
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub role: Option<Value>,
    pub is_active: Option<Value>,
    pub password: Option<Value>,
}

impl UserFields {
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            username: map.remove("username"),
            name: map.remove("name"),
            email: map.remove("email"),
            role: map.remove("role"),
            is_active: map.remove("is_active"),
            password: map.remove("password"),
        }
    }

    /// Lenient body parsing: anything that is not a JSON object counts as `{}`.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self::from_map(map),
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: i64,
}
