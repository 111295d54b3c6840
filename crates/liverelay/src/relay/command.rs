//! Decoded client commands.

use serde_json::{Map, Value};

/// Keyword parameters passed to an action.
pub type Params = Map<String, Value>;

/// Name of the mandatory envelope field selecting the action.
pub const ACTION_FIELD: &str = "action";

/// A decoded request line: a JSON object whose `action` field selects the
/// operation and whose remaining fields are the action's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    fields: Map<String, Value>,
}

impl Command {
    /// Wraps already-decoded envelope fields.
    #[must_use]
    pub const fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds a command for `action` with the given parameters.
    #[must_use]
    pub fn new(action: &str, params: Params) -> Self {
        let mut fields = params;
        fields.insert(ACTION_FIELD.to_owned(), Value::String(action.to_owned()));
        Self { fields }
    }

    /// Decodes one request line.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the line is not a JSON object.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line).map(Self::from_fields)
    }

    /// The requested action. A missing or non-string `action` field resolves
    /// to the empty name, which no action is registered under.
    #[must_use]
    pub fn action(&self) -> &str {
        self.fields
            .get(ACTION_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Consumes the command, yielding every field except `action`.
    #[must_use]
    pub fn into_params(self) -> Params {
        let mut fields = self.fields;
        fields.remove(ACTION_FIELD);
        fields
    }
}
