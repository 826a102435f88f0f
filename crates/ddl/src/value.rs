//! Plaintext-or-secret values

use crate::error::{Error, Result};
use crate::name::ObjectReference;
use crate::quote::quote_string;
use serde::{Deserialize, Serialize};

/// A value supplied either inline or through a secret object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    Text(String),
    Secret(ObjectReference),
}

impl SecretValue {
    /// Right-hand side of a `KEY = <value>` option
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => quote_string(text),
            Self::Secret(reference) => format!("SECRET {}", reference.qualified_name()),
        }
    }
}

/// Raw `{ text, secret }` block as declared by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSecretSpec {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub secret: Option<ObjectReference>,
}

impl ValueSecretSpec {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            secret: None,
        }
    }

    pub fn secret(reference: ObjectReference) -> Self {
        Self {
            text: None,
            secret: Some(reference),
        }
    }

    /// Resolve to at most one concrete value.
    ///
    /// Empty text and empty references count as unset; both populated is a
    /// conflict.
    pub fn resolve(&self, field: &str) -> Result<Option<SecretValue>> {
        let text = self.text.as_deref().filter(|t| !t.is_empty());
        let secret = ObjectReference::configured(self.secret.as_ref(), field)?;

        match (text, secret) {
            (Some(_), Some(_)) => Err(Error::conflict(
                field,
                "set either text or secret, not both",
            )),
            (Some(text), None) => Ok(Some(SecretValue::Text(text.to_string()))),
            (None, Some(reference)) => Ok(Some(SecretValue::Secret(reference))),
            (None, None) => Ok(None),
        }
    }
}

/// Resolve an optional raw block; an absent block is an omitted clause.
pub(crate) fn resolve_optional(
    spec: Option<&ValueSecretSpec>,
    field: &str,
) -> Result<Option<SecretValue>> {
    spec.map_or(Ok(None), |s| s.resolve(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_and_secret() {
        assert_eq!(SecretValue::Text("u".into()).render(), "'u'");
        let r = ObjectReference::new("ca").in_schema("sch").in_database("db");
        assert_eq!(SecretValue::Secret(r).render(), "SECRET db.sch.ca");
    }

    #[test]
    fn test_resolve_neither_is_omitted() {
        assert_eq!(ValueSecretSpec::default().resolve("ssl_ca").unwrap(), None);
        assert_eq!(ValueSecretSpec::text("").resolve("ssl_ca").unwrap(), None);
        assert_eq!(
            ValueSecretSpec::secret(ObjectReference::default())
                .resolve("ssl_ca")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_both_conflict() {
        let spec = ValueSecretSpec {
            text: Some("pem".into()),
            secret: Some(ObjectReference::new("ca")),
        };
        let err = spec.resolve("ssl_certificate_authority").unwrap_err();
        assert_eq!(
            err,
            Error::ConfigurationConflict {
                field: "ssl_certificate_authority".into(),
                reason: "set either text or secret, not both".into(),
            }
        );
    }

    #[test]
    fn test_resolve_single_side() {
        assert_eq!(
            ValueSecretSpec::text("u").resolve("sasl_username").unwrap(),
            Some(SecretValue::Text("u".into()))
        );
        assert_eq!(
            ValueSecretSpec::secret(ObjectReference::new("user"))
                .resolve("sasl_username")
                .unwrap(),
            Some(SecretValue::Secret(ObjectReference::new("user")))
        );
    }
}
