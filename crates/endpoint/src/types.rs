//! Core types for relation endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

use crate::error::{Error, Result};

/// Logical name under which a relation interface is registered.
///
/// Used to namespace flags as `endpoint.{name}.{flag}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointName(String);

impl EndpointName {
    /// Create a validated endpoint name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpointName`] if the name is empty or
    /// contains characters that would break flag namespacing.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_endpoint_name("name is empty"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(Error::invalid_endpoint_name(format!(
                "'{name}' may only contain lowercase letters, digits, '-' and '_'"
            )));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EndpointName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EndpointName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationId(Ulid);

impl RelationId {
    /// Create a new random relation ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Create from a ULID.
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Get the inner ULID.
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for RelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a relation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Ulid);

impl EventId {
    /// Create a new random event ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Create from a ULID.
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Get the inner ULID.
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque access-grant data delivered by the counterpart.
///
/// The inner structure is never inspected; the only question this crate
/// asks of it is whether anything meaningful was delivered at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Value);

impl Credentials {
    /// Wrap a raw value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Whether the value carries any content.
    ///
    /// Null, `false`, zero, the empty string, and empty collections all
    /// count as absent.
    pub fn is_present(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        }
    }

    /// Borrow the raw value.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the raw value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Credentials {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Named boolean signals published per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// The relation is connected. Owned by the dispatcher.
    Joined,
    /// Credentials have been delivered. Owned by the tracker.
    Ready,
    /// Relation data changed since last evaluation. Set by the dispatcher,
    /// cleared by the tracker once consumed.
    Changed,
}

impl Flag {
    /// Get the bare flag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joined => "joined",
            Self::Ready => "ready",
            Self::Changed => "changed",
        }
    }

    /// Get the fully qualified flag name for an endpoint.
    pub fn qualified(&self, endpoint: &EndpointName) -> String {
        format!("endpoint.{endpoint}.{self}")
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_name_valid() {
        let name = EndpointName::new("openstack").unwrap();
        assert_eq!(name.as_str(), "openstack");
    }

    #[test]
    fn test_endpoint_name_rejects_empty() {
        assert!(EndpointName::new("").is_err());
    }

    #[test]
    fn test_endpoint_name_rejects_dots() {
        // Dots would collide with the flag namespace separator.
        assert!(EndpointName::new("end.point").is_err());
        assert!(EndpointName::new("End Point").is_err());
    }

    #[test]
    fn test_relation_id_unique() {
        assert_ne!(RelationId::new(), RelationId::new());
    }

    #[test]
    fn test_credentials_presence() {
        assert!(Credentials::new(json!("tok-123")).is_present());
        assert!(Credentials::new(json!({"user": "svc"})).is_present());
        assert!(Credentials::new(json!([1])).is_present());

        assert!(!Credentials::new(json!(null)).is_present());
        assert!(!Credentials::new(json!("")).is_present());
        assert!(!Credentials::new(json!({})).is_present());
        assert!(!Credentials::new(json!([])).is_present());
        assert!(!Credentials::new(json!(false)).is_present());
        assert!(!Credentials::new(json!(0)).is_present());
    }

    #[test]
    fn test_flag_qualified_name() {
        let name = EndpointName::new("openstack").unwrap();
        assert_eq!(Flag::Ready.qualified(&name), "endpoint.openstack.ready");
        assert_eq!(Flag::Joined.qualified(&name), "endpoint.openstack.joined");
        assert_eq!(Flag::Changed.qualified(&name), "endpoint.openstack.changed");
    }
}
