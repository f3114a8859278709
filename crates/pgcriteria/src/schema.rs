//! Entity metadata and schema introspection.
//!
//! The soft-delete default only applies to entities that actually have a
//! status column, so repositories ask a [`SchemaIntrospector`] before
//! augmenting criteria. [`SchemaRegistry`] is the in-memory implementation.

use std::collections::HashMap;

/// Static metadata for an entity table.
///
/// # Example
///
/// ```ignore
/// impl TableMeta for User {
///     fn table_name() -> &'static str { "users" }
///     fn alias() -> &'static str { "u" }
///     fn columns() -> &'static [&'static str] { &["id", "name", "status"] }
/// }
/// ```
pub trait TableMeta {
    /// The database table name.
    fn table_name() -> &'static str;

    /// The alias the table is selected under (`FROM users u`).
    fn alias() -> &'static str;

    /// The database schema name (defaults to "public").
    fn schema_name() -> &'static str {
        "public"
    }

    /// List of column names in this table.
    fn columns() -> &'static [&'static str];

    /// The primary key column name, if any.
    fn primary_key() -> Option<&'static str> {
        None
    }
}

/// Answers whether an entity declares an attribute.
pub trait SchemaIntrospector: Send + Sync {
    fn declares_attribute(&self, entity: &str, attribute: &str) -> bool;
}

/// Column information.
#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,
    pub is_primary_key: bool,
}

/// Table information.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Schema name (e.g., "public").
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnMeta>,
}

impl TableSchema {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn add_column(&mut self, name: impl Into<String>, is_primary_key: bool) {
        self.columns.push(ColumnMeta {
            name: name.into(),
            is_primary_key,
        });
    }

    /// Add multiple non-key columns.
    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        for col in columns {
            self.add_column(*col, false);
        }
        self
    }

    /// Mark `pk` as the primary key, adding the column if it is missing.
    pub fn with_primary_key(mut self, pk: &str) -> Self {
        for col in &mut self.columns {
            col.is_primary_key = col.name == pk;
        }
        if !self.has_column(pk) {
            self.add_column(pk, true);
        }
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}

/// In-memory table registry.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// schema -> (table -> TableSchema)
    tables: HashMap<String, HashMap<String, TableSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table from a type that implements [`TableMeta`].
    pub fn register<T: TableMeta>(&mut self) -> &mut Self {
        let pk = T::primary_key();
        let mut table = TableSchema::new(T::schema_name(), T::table_name());
        for col in T::columns() {
            table.add_column(*col, pk == Some(*col));
        }
        self.register_table(table)
    }

    /// Register a table schema directly, replacing any table with the same name.
    pub fn register_table(&mut self, table: TableSchema) -> &mut Self {
        self.tables
            .entry(table.schema.clone())
            .or_default()
            .insert(table.name.clone(), table);
        self
    }

    pub fn get_table(&self, schema: &str, name: &str) -> Option<&TableSchema> {
        self.tables
            .get(schema)
            .and_then(|by_name| by_name.get(name))
    }

    /// Find a table by name, preferring the `public` schema.
    pub fn find_table(&self, name: &str) -> Option<&TableSchema> {
        if let Some(t) = self.get_table("public", name) {
            return Some(t);
        }
        self.tables.values().find_map(|by_name| by_name.get(name))
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(HashMap::is_empty)
    }
}

impl SchemaIntrospector for SchemaRegistry {
    fn declares_attribute(&self, entity: &str, attribute: &str) -> bool {
        self.find_table(entity)
            .is_some_and(|table| table.has_column(attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Post;

    impl TableMeta for Post {
        fn table_name() -> &'static str {
            "posts"
        }
        fn alias() -> &'static str {
            "p"
        }
        fn columns() -> &'static [&'static str] {
            &["id", "title", "status"]
        }
        fn primary_key() -> Option<&'static str> {
            Some("id")
        }
    }

    #[test]
    fn registered_entity_declares_its_columns() {
        let mut registry = SchemaRegistry::new();
        registry.register::<Post>();

        assert!(registry.declares_attribute("posts", "status"));
        assert!(!registry.declares_attribute("posts", "deleted_at"));
        assert!(!registry.declares_attribute("users", "status"));
        assert!(registry.find_table("posts").unwrap().columns[0].is_primary_key);
    }

    #[test]
    fn find_table_falls_back_to_other_schemas() {
        let mut registry = SchemaRegistry::new();
        registry.register_table(TableSchema::new("audit", "events").with_columns(&["id", "kind"]));

        assert_eq!(registry.len(), 1);
        assert!(registry.declares_attribute("events", "kind"));
    }

    #[test]
    fn with_primary_key_adds_missing_column() {
        let table = TableSchema::new("public", "tags")
            .with_columns(&["name"])
            .with_primary_key("id");
        assert!(table.has_column("id"));
        assert!(table.columns.iter().any(|c| c.name == "id" && c.is_primary_key));
    }
}
