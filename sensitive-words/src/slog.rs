//! Adapters for emitting desensitized values through `slog`.
//!
//! [`DesensitizedJson`] is a `slog::Value` carrying the JSON form of a value
//! after a [`Resolver`] has rewritten it. The original value is never
//! serialized. Failures are logged as placeholder strings rather than
//! propagated, so logging stays infallible.

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    resolver::{Request, Resolver},
    walk::Walk,
};

/// Logged in place of a value whose scan failed or was canceled.
pub const DESENSITIZE_FAILED: &str = "Failed to desensitize value";

/// Logged in place of a desensitized value that has no JSON form.
pub const SERIALIZE_FAILED: &str = "Failed to serialize desensitized value";

/// A `slog::Value` that emits a desensitized payload as structured JSON.
pub struct DesensitizedJson {
    value: JsonValue,
}

impl DesensitizedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The payload that will be logged.
    #[must_use]
    pub const fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for DesensitizedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts values into a `slog::Value` that logs their desensitized form.
///
/// ## Example
/// ```ignore
/// use sensitive_words::slog::IntoDesensitizedJson;
///
/// info!(logger, "comment posted"; "comment" => comment.into_desensitized_json(&resolver, &request));
/// ```
pub trait IntoDesensitizedJson: Walk + Serialize + Sized {
    /// Desensitizes `self` and returns a `slog::Value` serializing as JSON.
    ///
    /// A failed scan stores [`DESENSITIZE_FAILED`]; a failed JSON conversion
    /// stores [`SERIALIZE_FAILED`].
    fn into_desensitized_json(self, resolver: &Resolver, request: &Request) -> DesensitizedJson {
        let value = match resolver.desensitize(self, request) {
            Ok(desensitized) => serde_json::to_value(desensitized)
                .unwrap_or_else(|_| JsonValue::String(SERIALIZE_FAILED.to_string())),
            Err(_) => JsonValue::String(DESENSITIZE_FAILED.to_string()),
        };
        DesensitizedJson::new(value)
    }
}

impl<T> IntoDesensitizedJson for T where T: Walk + Serialize {}
