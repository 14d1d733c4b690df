// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: seeded DuckDB database files
//!
//! Each fixture writes a fresh database into its own temporary directory.
//! The directory, and the file with it, is removed when the returned
//! [`TestDatabase`] is dropped.

use std::path::{Path, PathBuf};

use duckcat_catalog::{CatalogConnection, CatalogError, CatalogResult, DuckDbConnection};
use tempfile::TempDir;

/// Seeded database file in a temporary directory
pub struct TestDatabase {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDatabase {
    /// Create `file_name` in a new temporary directory and run `setup_sql`
    ///
    /// The seeding connection is closed before returning, so the file can be
    /// reopened by the code under test.
    pub fn create(file_name: &str, setup_sql: &str) -> CatalogResult<Self> {
        let dir = TempDir::new().map_err(|e| CatalogError::ConnectionFailed(e.to_string()))?;
        let path = dir.path().join(file_name);

        let conn = DuckDbConnection::open(Some(path.as_path()))?;
        if !setup_sql.trim().is_empty() {
            conn.execute_batch(setup_sql)?;
        }
        drop(conn);

        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_buf(&self) -> PathBuf {
        self.path.clone()
    }

    /// Open another connection to the file
    pub fn open(&self) -> CatalogResult<DuckDbConnection> {
        DuckDbConnection::open(Some(self.path.as_path()))
    }
}

/// Setup scripts and seeded databases used across the test suite
pub struct DbFixtures;

impl DbFixtures {
    // ===== Setup scripts =====

    /// Three user schemas with known row counts, an empty schema, and a
    /// schema and table whose names need quoting
    ///
    /// - `test_schema1.table1` (3 rows), `test_schema1.table2` (2 rows)
    /// - `test_schema2.table3` (5 rows)
    /// - `"special-schema"."table-with-dashes"` (4 rows)
    /// - `empty_schema` with no tables
    pub const fn test_data_sql() -> &'static str {
        r#"
        CREATE SCHEMA test_schema1;
        CREATE SCHEMA test_schema2;
        CREATE SCHEMA empty_schema;
        CREATE SCHEMA "special-schema";

        CREATE TABLE test_schema1.table1 (id INTEGER, name VARCHAR);
        INSERT INTO test_schema1.table1 VALUES (1, 'Alice'), (2, 'Bob'), (3, 'Charlie');

        CREATE TABLE test_schema1.table2 (id INTEGER, value DOUBLE);
        INSERT INTO test_schema1.table2 VALUES (1, 10.5), (2, 20.5);

        CREATE TABLE test_schema2.table3 (id INTEGER, active BOOLEAN);
        INSERT INTO test_schema2.table3 VALUES (1, TRUE), (2, FALSE), (3, TRUE), (4, TRUE), (5, FALSE);

        CREATE TABLE "special-schema"."table-with-dashes" (id INTEGER, notes VARCHAR);
        INSERT INTO "special-schema"."table-with-dashes" VALUES
            (1, 'Note 1'), (2, 'Note 2'), (3, 'Note 3'), (4, 'Note 4');
        "#
    }

    /// Tables plus views, including a schema that holds only views
    ///
    /// - `test_schema.users` (3 rows), `test_schema.orders` (4 rows)
    /// - views `test_schema.user_summary`, `test_schema.order_details`
    /// - `views_only_schema.all_users`
    pub const fn views_sql() -> &'static str {
        r#"
        CREATE SCHEMA test_schema;

        CREATE TABLE test_schema.users (id INTEGER, name VARCHAR, email VARCHAR);
        INSERT INTO test_schema.users VALUES
            (1, 'Alice', 'alice@example.com'),
            (2, 'Bob', 'bob@example.com'),
            (3, 'Charlie', 'charlie@example.com');

        CREATE TABLE test_schema.orders (id INTEGER, user_id INTEGER, amount DECIMAL(10, 2));
        INSERT INTO test_schema.orders VALUES
            (101, 1, 25.50), (102, 1, 15.75), (103, 2, 45.25), (104, 3, 10.00);

        CREATE VIEW test_schema.user_summary AS
            SELECT id, name, email FROM test_schema.users;

        CREATE VIEW test_schema.order_details AS
            SELECT o.id AS order_id, u.name AS user_name, o.amount
            FROM test_schema.orders o
            JOIN test_schema.users u ON o.user_id = u.id;

        CREATE SCHEMA views_only_schema;
        CREATE VIEW views_only_schema.all_users AS SELECT * FROM test_schema.users;
        "#
    }

    /// A keyed table with comments, a default and a view over it
    pub const fn with_pk_sql() -> &'static str {
        r#"
        CREATE TABLE with_pk (id INTEGER PRIMARY KEY, value VARCHAR DEFAULT 'none');
        INSERT INTO with_pk VALUES (1, 'a'), (2, 'b'), (3, 'c');
        COMMENT ON TABLE with_pk IS 'Keyed values';
        COMMENT ON COLUMN with_pk.value IS 'Free text';

        CREATE TABLE composite_pk (a INTEGER, b VARCHAR, note VARCHAR, PRIMARY KEY (b, a));
        INSERT INTO composite_pk VALUES (1, 'x', NULL);

        CREATE VIEW with_pk_view AS SELECT id, value FROM with_pk;
        "#
    }

    // ===== Seeded databases =====

    pub fn test_data() -> CatalogResult<TestDatabase> {
        TestDatabase::create("test_db.duckdb", Self::test_data_sql())
    }

    pub fn views() -> CatalogResult<TestDatabase> {
        TestDatabase::create("test_db_views.duckdb", Self::views_sql())
    }

    pub fn with_pk() -> CatalogResult<TestDatabase> {
        TestDatabase::create("test_db_pk.duckdb", Self::with_pk_sql())
    }

    /// A database file with no user objects
    pub fn empty() -> CatalogResult<TestDatabase> {
        TestDatabase::create("empty.duckdb", "")
    }
}
