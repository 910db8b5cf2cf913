use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Query string of `GET /api/data`.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DataQuery {
    #[serde(default)]
    pub key: Option<String>,
}

/// Body of a successful `GET /api/data`.
///
/// A bucket that was never written comes back as `[]`, not as an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DataResponse {
    pub data: Value,
}

impl DataResponse {
    pub fn empty() -> Self {
        Self { data: Value::Array(Vec::new()) }
    }
}

/// Body of `POST /api/data`. Both fields are required; they are optional here
/// so a missing field is reported as a client error instead of a parse failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WriteRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WriteResponse {
    pub success: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
