//! Typed access to operation arguments.

use crate::error::BoxAgentError;

/// Wrapper around invocation arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct OperationArguments {
    value: serde_json::Value,
}

impl OperationArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, BoxAgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| BoxAgentError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, BoxAgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| {
                BoxAgentError::InvalidArgument(format!("Missing boolean argument: {key}"))
            })
    }

    /// Get an optional boolean argument.
    pub fn get_bool_opt(&self, key: &str) -> Option<bool> {
        self.value.get(key).and_then(|v| v.as_bool())
    }

    /// Get an optional array of strings; non-string elements are skipped.
    pub fn get_string_list_opt(&self, key: &str) -> Option<Vec<String>> {
        self.value.get(key).and_then(|v| v.as_array()).map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }

    /// Deserialize the entire arguments into a typed struct.
    ///
    /// Providers sometimes deliver arguments as a JSON-encoded string
    /// rather than an object; both forms are accepted.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, BoxAgentError> {
        let value = match &self.value {
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str::<serde_json::Value>(trimmed).map_err(|e| {
                        BoxAgentError::InvalidArgument(format!(
                            "Failed to deserialize arguments: {e}"
                        ))
                    })?
                }
            }
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| {
            BoxAgentError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
