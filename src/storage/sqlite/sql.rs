//! SQL construction helpers.
//!
//! Table and column names cannot be bound as parameters, so they are checked
//! with [`validate_table_name`](crate::storage::validate_table_name) and then
//! double-quoted here.

use crate::storage::ColumnSpec;

/// Double-quotes an identifier, doubling embedded quotes.
///
/// # Examples
///
/// ```
/// use roster::storage::sqlite::quote_identifier;
///
/// assert_eq!(quote_identifier("jobs"), "\"jobs\"");
/// assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
/// ```
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds a `CREATE TABLE` statement.
///
/// No primary key or uniqueness constraint is declared: loading the same file
/// twice appends its rows twice.
#[must_use]
pub fn create_table_sql(table: &str, columns: &[ColumnSpec]) -> String {
    let column_defs = columns
        .iter()
        .map(|c| match c.ty.sql_type() {
            "" => quote_identifier(&c.name),
            sql_type => format!("{} {sql_type}", quote_identifier(&c.name)),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({column_defs})", quote_identifier(table))
}

/// Builds a parameterized `INSERT` statement for the given columns.
#[must_use]
pub fn insert_sql<'a>(table: &str, columns: impl IntoIterator<Item = &'a str>) -> String {
    let (names, placeholders): (Vec<String>, Vec<String>) = columns
        .into_iter()
        .enumerate()
        .map(|(i, name)| (quote_identifier(name), format!("?{}", i + 1)))
        .unzip();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SemanticType;

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql(
            "jobs",
            &[
                ColumnSpec::new("id", SemanticType::Integer),
                ColumnSpec::new("job", SemanticType::Text),
            ],
        );
        assert_eq!(sql, r#"CREATE TABLE "jobs" ("id" INTEGER, "job" TEXT)"#);
    }

    #[test]
    fn test_create_table_sql_untyped_column() {
        let sql = create_table_sql(
            "jobs",
            &[
                ColumnSpec::new("id", SemanticType::Any),
                ColumnSpec::new("job", SemanticType::Text),
            ],
        );
        assert_eq!(sql, r#"CREATE TABLE "jobs" ("id", "job" TEXT)"#);
    }

    #[test]
    fn test_insert_sql() {
        let sql = insert_sql("departments", ["id", "department"]);
        assert_eq!(
            sql,
            r#"INSERT INTO "departments" ("id", "department") VALUES (?1, ?2)"#
        );
    }
}
