use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::sink::SinkError;

/// One intercepted call, assembled after the wrapped call has completed.
///
/// Fields serialize in declaration order with camelCase keys. Absent
/// values (`result`, `error`, `serviceName`) are left out of the JSON
/// entirely instead of being written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    method_name: String,
    arguments: Vec<Value>,
    execution_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    username: String,
    ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_name: Option<String>,
}

impl LogRecord {
    pub(crate) fn new(
        method_name: String,
        arguments: Vec<Value>,
        execution_time: u64,
        username: String,
        ip_address: String,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            method_name,
            arguments,
            execution_time,
            result: None,
            error: None,
            username,
            ip_address,
            service_name: None,
        }
    }

    /// A JSON `null` result (unit return) is stored as absent.
    pub(crate) fn with_result(mut self, result: Option<Value>) -> Self {
        self.result = result.filter(|v| !v.is_null());
        self
    }

    pub(crate) fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub(crate) fn with_service_name(mut self, service_name: Option<String>) -> Self {
        self.service_name = service_name;
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Wall-clock duration of the wrapped call in whole milliseconds.
    pub fn execution_time_millis(&self) -> u64 {
        self.execution_time
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Failure message, only set when failed calls are recorded.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Compact single-line JSON, as handed to text-based sinks.
    pub fn to_json(&self) -> Result<String, SinkError> {
        Ok(serde_json::to_string(self)?)
    }
}
