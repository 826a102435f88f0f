//! Statement compilation shared by every object kind

use crate::catalog;
use crate::error::{Error, Result};
use crate::name::ObjectDescriptor;
use crate::quote::{quote_identifier, quote_string};

/// Compiler from a resolved object description to DDL text.
///
/// Implementations are immutable values; every method is a pure function of
/// the description, so calling them in any order yields the same text.
pub trait Statements {
    /// Identity of the object the statements act on
    fn object(&self) -> &ObjectDescriptor;

    /// `CREATE <KIND> <qname> ...;`
    fn create_sql(&self) -> String;

    /// Create statement safe to print (sensitive literals masked)
    fn display_create_sql(&self) -> String {
        self.create_sql()
    }

    /// In-place alter that brings an existing object's definition up to
    /// date, or `None` when the kind can only be replaced.
    fn alter_sql(&self) -> Option<String> {
        None
    }

    /// Alter statement safe to print
    fn display_alter_sql(&self) -> Option<String> {
        self.alter_sql()
    }

    /// `ALTER <KIND> <qname> RENAME TO <new qname>;`
    fn rename_sql(&self, new_name: &str) -> Result<String> {
        rename_object(self.object(), new_name)
    }

    /// `DROP <KIND> <qname>;`
    fn drop_sql(&self) -> String {
        drop_object(self.object())
    }

    /// Lookup returning the store-assigned id of the object
    fn read_id_sql(&self) -> String {
        catalog::read_id(self.object())
    }
}

pub fn rename_object(object: &ObjectDescriptor, new_name: &str) -> Result<String> {
    let renamed = object.renamed(new_name)?;
    Ok(format!(
        "ALTER {} {} RENAME TO {};",
        object.kind(),
        object.qualified_name(),
        renamed.qualified_name()
    ))
}

pub fn drop_object(object: &ObjectDescriptor) -> String {
    format!("DROP {} {};", object.kind(), object.qualified_name())
}

pub fn alter_owner(object: &ObjectDescriptor, role: &str) -> Result<String> {
    if role.is_empty() {
        return Err(Error::invalid("ownership role must not be empty"));
    }
    Ok(format!(
        "ALTER {} {} OWNER TO {};",
        object.kind(),
        object.qualified_name(),
        quote_identifier(role)
    ))
}

/// `COMMENT ON ... IS '<text>'`, or `IS NULL` to clear the comment.
pub fn comment_on(object: &ObjectDescriptor, comment: Option<&str>) -> String {
    let value = comment.map_or_else(|| "NULL".to_string(), quote_string);
    format!(
        "COMMENT ON {} {} IS {};",
        object.kind(),
        object.qualified_name(),
        value
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::ObjectKind;

    fn connection() -> ObjectDescriptor {
        ObjectDescriptor::new(ObjectKind::Connection, "k1", "", "").unwrap()
    }

    #[test]
    fn test_drop_object() {
        assert_eq!(drop_object(&connection()), "DROP CONNECTION k1;");
    }

    #[test]
    fn test_rename_object() {
        let d = ObjectDescriptor::new(ObjectKind::Secret, "s1", "sch", "db").unwrap();
        assert_eq!(
            rename_object(&d, "s2").unwrap(),
            "ALTER SECRET db.sch.s1 RENAME TO db.sch.s2;"
        );
        assert!(matches!(
            rename_object(&d, ""),
            Err(Error::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_alter_owner() {
        assert_eq!(
            alter_owner(&connection(), "analysts").unwrap(),
            "ALTER CONNECTION k1 OWNER TO analysts;"
        );
        assert_eq!(
            alter_owner(&connection(), "Data Team").unwrap(),
            "ALTER CONNECTION k1 OWNER TO \"Data Team\";"
        );
        assert!(alter_owner(&connection(), "").is_err());
    }

    #[test]
    fn test_comment_on() {
        assert_eq!(
            comment_on(&connection(), Some("prod's kafka")),
            "COMMENT ON CONNECTION k1 IS 'prod''s kafka';"
        );
        assert_eq!(
            comment_on(&connection(), None),
            "COMMENT ON CONNECTION k1 IS NULL;"
        );
    }
}
