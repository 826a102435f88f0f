//! Catalog lookup queries
//!
//! These statements read identities back out of the store catalog. They are
//! generated the same deterministic way as DDL.

use crate::name::{ObjectDescriptor, ObjectKind};
use crate::privilege::Privilege;
use crate::quote::quote_string;

/// Columns returned by [`read_object`], in order
pub const OBJECT_COLUMNS: [&str; 6] = [
    "id",
    "name",
    "schema_name",
    "database_name",
    "owner_name",
    "comment",
];

fn scoped_from(kind: ObjectKind) -> String {
    let rel = kind.catalog_relation();
    format!(
        "FROM {rel} JOIN mz_schemas ON {rel}.schema_id = mz_schemas.id \
         LEFT JOIN mz_databases ON mz_schemas.database_id = mz_databases.id"
    )
}

/// Id lookup keyed on kind, name, schema and database.
///
/// Scope predicates are only added for non-empty scopes, so an unqualified
/// descriptor matches by name alone.
pub fn read_id(object: &ObjectDescriptor) -> String {
    let rel = object.kind().catalog_relation();
    let mut predicates = vec![format!("{rel}.name = {}", quote_string(object.name()))];
    if !object.schema_name().is_empty() {
        predicates.push(format!(
            "mz_schemas.name = {}",
            quote_string(object.schema_name())
        ));
    }
    if !object.database_name().is_empty() {
        predicates.push(format!(
            "mz_databases.name = {}",
            quote_string(object.database_name())
        ));
    }
    format!(
        "SELECT {rel}.id {} WHERE {};",
        scoped_from(object.kind()),
        predicates.join(" AND ")
    )
}

/// Full row for one object, keyed on its store-assigned id.
pub fn read_object(kind: ObjectKind, id: &str) -> String {
    let rel = kind.catalog_relation();
    format!(
        "SELECT {rel}.id, {rel}.name, mz_schemas.name, mz_databases.name, \
         mz_roles.name, comments.comment \
         {} \
         JOIN mz_roles ON {rel}.owner_id = mz_roles.id \
         LEFT JOIN (SELECT id, comment FROM mz_internal.mz_comments \
         WHERE object_type = {} AND object_sub_id IS NULL) comments ON {rel}.id = comments.id \
         WHERE {rel}.id = {};",
        scoped_from(kind),
        quote_string(kind.comment_object_type()),
        quote_string(id)
    )
}

pub fn read_role_id(role: &str) -> String {
    format!("SELECT id FROM mz_roles WHERE name = {};", quote_string(role))
}

/// Whether `role_id` holds `privilege` on the object with `object_id`.
/// Returns the object id once per match, nothing when the grant is gone.
pub fn read_privilege(
    kind: ObjectKind,
    object_id: &str,
    role_id: &str,
    privilege: Privilege,
) -> String {
    let rel = kind.catalog_relation();
    format!(
        "SELECT DISTINCT {rel}.id FROM {rel} \
         CROSS JOIN LATERAL mz_internal.mz_aclexplode({rel}.privileges) AS acl \
         WHERE {rel}.id = {} AND acl.grantee = {} AND acl.privilege_type = {};",
        quote_string(object_id),
        quote_string(role_id),
        quote_string(privilege.as_str())
    )
}
