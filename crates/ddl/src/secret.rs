//! Secrets

use crate::error::Result;
use crate::name::{ObjectDescriptor, ObjectKind};
use crate::quote::quote_string;
use crate::statement::Statements;
use serde::{Deserialize, Serialize};

const REDACTED: &str = "'********'";

/// Raw secret block as declared by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSpec {
    pub name: String,
    #[serde(default)]
    pub schema_name: String,
    #[serde(default)]
    pub database_name: String,
    pub value: String,
}

impl SecretSpec {
    pub fn resolve(&self) -> Result<Secret> {
        Ok(Secret {
            object: ObjectDescriptor::new(
                ObjectKind::Secret,
                self.name.clone(),
                self.schema_name.clone(),
                self.database_name.clone(),
            )?,
            value: self.value.clone(),
        })
    }
}

/// A resolved secret. The value can be altered in place.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    object: ObjectDescriptor,
    value: String,
}

// Keep the value out of debug output.
impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}

impl Statements for Secret {
    fn object(&self) -> &ObjectDescriptor {
        &self.object
    }

    fn create_sql(&self) -> String {
        format!(
            "CREATE SECRET {} AS {};",
            self.object.qualified_name(),
            quote_string(&self.value)
        )
    }

    fn display_create_sql(&self) -> String {
        format!("CREATE SECRET {} AS {REDACTED};", self.object.qualified_name())
    }

    fn alter_sql(&self) -> Option<String> {
        Some(format!(
            "ALTER SECRET {} AS {};",
            self.object.qualified_name(),
            quote_string(&self.value)
        ))
    }

    fn display_alter_sql(&self) -> Option<String> {
        Some(format!("ALTER SECRET {} AS {REDACTED};", self.object.qualified_name()))
    }
}
