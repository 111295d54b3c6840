//! Response envelopes written back to clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message sent when the host thread does not answer within the response
/// timeout.
pub const PROCESSING_TIMEOUT_MESSAGE: &str =
    "Command processing timeout - main thread may be busy";

const OK_FIELD: &str = "ok";
const ERROR_FIELD: &str = "error";

/// One response line: a JSON object that always carries a boolean `ok`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response {
    fields: Map<String, Value>,
}

impl Response {
    /// Success response carrying the action's payload. Any `ok` key already
    /// present in the payload is overwritten.
    #[must_use]
    pub fn success(payload: Map<String, Value>) -> Self {
        let mut fields = payload;
        fields.insert(OK_FIELD.to_owned(), Value::Bool(true));
        Self { fields }
    }

    /// Failure response with a human-readable message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(OK_FIELD.to_owned(), Value::Bool(false));
        fields.insert(ERROR_FIELD.to_owned(), Value::String(message.into()));
        Self { fields }
    }

    /// Failure response for an internal fault, carrying diagnostic text.
    #[must_use]
    pub fn fault(message: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self::error(message).with_field("traceback", Value::String(traceback.into()))
    }

    /// Failure response sent when the host thread did not answer in time.
    #[must_use]
    pub fn processing_timeout() -> Self {
        Self::error(PROCESSING_TIMEOUT_MESSAGE)
    }

    /// Adds or replaces one field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_owned(), value);
        self
    }

    /// Value of the `ok` flag.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.fields
            .get(OK_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The `error` message, when present.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.fields.get(ERROR_FIELD).and_then(Value::as_str)
    }

    /// Looks up one field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All fields of the envelope.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Serialises the response as one newline-terminated JSON line.
    ///
    /// # Errors
    ///
    /// Returns the encoder error if a field cannot be serialised.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}
