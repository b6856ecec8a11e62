use chrono::{DateTime, FixedOffset};
use sqlx::{
    query::{Query, QueryAs},
    sqlite::{SqliteArguments, SqliteRow},
    Sqlite,
};

#[derive(Clone, Debug, PartialEq)]
pub enum SqlxBinds {
    String(String),
    OptionString(Option<String>),
    Int(i64),
    Float(f64),
    DateTimeFixedOffset(DateTime<FixedOffset>),
}

pub fn binds_query(stmt: &str, binds: Vec<SqlxBinds>) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    let mut q: Query<'_, Sqlite, SqliteArguments<'_>> = sqlx::query(stmt);
    for bind in binds.into_iter() {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val),
            SqlxBinds::OptionString(val) => q.bind(val),
            SqlxBinds::Int(val) => q.bind(val),
            SqlxBinds::Float(val) => q.bind(val),
            SqlxBinds::DateTimeFixedOffset(val) => q.bind(val),
        };
    }
    q
}

pub fn binds_query_as<'a, T: for<'r> sqlx::FromRow<'r, SqliteRow>>(
    stmt: &'a str,
    binds: Vec<SqlxBinds>,
) -> QueryAs<'a, Sqlite, T, SqliteArguments<'a>> {
    let mut q: QueryAs<'_, Sqlite, T, SqliteArguments<'_>> = sqlx::query_as(stmt);
    for bind in binds.into_iter() {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val),
            SqlxBinds::OptionString(val) => q.bind(val),
            SqlxBinds::Int(val) => q.bind(val),
            SqlxBinds::Float(val) => q.bind(val),
            SqlxBinds::DateTimeFixedOffset(val) => q.bind(val),
        };
    }
    q
}

/// Builds `SELECT .. FROM .. WHERE .. ORDER BY ..`.
/// Filters are joined with AND and use `?` placeholders in bind order.
pub fn query_builder(
    select: Option<String>,
    table_name: &str,
    wheres: &[String],
    order_by: Vec<String>,
) -> String {
    // Select
    let mut stmt = "SELECT ".to_string();
    if let Some(val) = select {
        stmt.push_str(&val);
    } else {
        stmt.push('*');
    }

    // From
    stmt.push_str(format!(" FROM {}", table_name).as_str());

    // Where
    if !wheres.is_empty() {
        stmt.push_str(" WHERE ");
        stmt.push_str(&wheres.join(" AND "));
    }

    // order by
    if !order_by.is_empty() {
        stmt.push_str(" ORDER BY ");
        stmt.push_str(&order_by.join(", "));
    }
    stmt
}

/// Collects `column = ?` assignments for a partial UPDATE.
#[derive(Default)]
pub struct UpdateBuilder {
    sets: Vec<String>,
    binds: Vec<SqlxBinds>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: SqlxBinds) -> &mut Self {
        self.sets.push(format!("{} = ?", column));
        self.binds.push(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Returns the statement and its binds, with `id` bound last.
    pub fn build(self, table_name: &str, id: &str) -> (String, Vec<SqlxBinds>) {
        let stmt = format!(
            "UPDATE {} SET {} WHERE id = ?",
            table_name,
            self.sets.join(", ")
        );
        let mut binds = self.binds;
        binds.push(SqlxBinds::String(id.to_string()));
        (stmt, binds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder_full() {
        let stmt = query_builder(
            Some("count(id)".to_string()),
            "products",
            &["format = ?".to_string(), "name LIKE ?".to_string()],
            vec!["created_date DESC".to_string(), "id".to_string()],
        );
        assert_eq!(
            stmt,
            "SELECT count(id) FROM products WHERE format = ? AND name LIKE ? ORDER BY created_date DESC, id"
        );
    }

    #[test]
    fn test_query_builder_minimal() {
        let stmt = query_builder(None, "departments", &[], vec![]);
        assert_eq!(stmt, "SELECT * FROM departments");
    }

    #[test]
    fn test_update_builder() {
        let mut builder = UpdateBuilder::new();
        builder
            .set("name", SqlxBinds::String("Ops".to_string()))
            .set("bio", SqlxBinds::OptionString(None));
        assert!(!builder.is_empty());
        let (stmt, binds) = builder.build("users", "USER-1");
        assert_eq!(stmt, "UPDATE users SET name = ?, bio = ? WHERE id = ?");
        assert_eq!(binds.len(), 3);
        assert_eq!(binds[2], SqlxBinds::String("USER-1".to_string()));
    }
}
