//! SQL identifier quoting utilities
//!
//! Table and column names reach the sampler from catalog metadata and
//! user-supplied table lists, so they are always quoted before being
//! spliced into SQL.

/// Quote a SQL identifier, doubling embedded double quotes.
///
/// # Examples
/// ```
/// use fv_db::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a schema and table as `"schema"."table"`.
///
/// The parts are quoted separately and never split, so dots inside a table
/// name stay part of that name.
///
/// # Examples
/// ```
/// use fv_db::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("main", "users"), r#""main"."users""#);
/// assert_eq!(quote_qualified("main", "v1.orders"), r#""main"."v1.orders""#);
/// ```
pub fn quote_qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Escape a SQL string literal value by doubling single quotes.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_with_embedded_quotes() {
        assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(quote_qualified("sales", "orders"), r#""sales"."orders""#);
        assert_eq!(quote_qualified("a.b", r#"c"d"#), r#""a.b"."c""d""#);
    }

    #[test]
    fn test_escape_sql_string() {
        assert_eq!(escape_sql_string("o'brien"), "o''brien");
    }
}
