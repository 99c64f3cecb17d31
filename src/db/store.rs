//! The customer store: one owned SQLite connection and one method per
//! operation. Every statement is parameterized; the only dynamic pieces of
//! SQL are column names and direction keywords taken from typed enums.

use std::path::Path;

use rusqlite::{params, Connection, Row};

use crate::models::{Customer, CustomerField};

use super::connection::{default_db_path, ensure_schema, open_at};
use super::error::{Result, StoreError};
use super::query::{FilterOp, Predicate, SortSpec};

/// Durable persistence for the customer set. Owns its connection; constructed
/// once at startup and handed to the UI by value, so there is no shared global
/// handle anywhere in the process.
pub struct CustomerStore {
    conn: Connection,
}

impl CustomerStore {
    /// Open the store at its default location under the user's home
    /// directory, creating the file and schema on first use.
    pub fn open() -> Result<Self> {
        let path = default_db_path()?;
        Self::open_path(&path)
    }

    /// Open the store at an explicit path. Used by tests and useful for
    /// pointing the tool at a copied database file.
    pub fn open_path(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_at(path)?,
        })
    }

    /// Fully in-memory store for tests; same schema, no file.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|err| StoreError::Unavailable(format!("cannot open database: {err}")))?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a new customer, returning the hydrated struct so the caller can
    /// push it straight into the in-memory list without re-querying.
    pub fn create(&mut self, name: &str, email: &str, phone: &str) -> Result<Customer> {
        self.conn.execute(
            "INSERT INTO customers (name, email, phone) VALUES (?1, ?2, ?3)",
            params![name, email, phone],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Customer {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        })
    }

    /// Overwrite all three text fields of an existing customer. Zero touched
    /// rows means the id is gone, which is surfaced instead of silently
    /// succeeding.
    pub fn update(&mut self, id: i64, name: &str, email: &str, phone: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE customers SET name = ?1, email = ?2, phone = ?3 WHERE id = ?4",
            params![name, email, phone, id],
        )?;

        if updated == 0 {
            Err(StoreError::NotFound { id })
        } else {
            Ok(())
        }
    }

    /// Permanently remove a customer. Same missing-id treatment as update.
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM customers WHERE id = ?1", params![id])?;

        if deleted == 0 {
            Err(StoreError::NotFound { id })
        } else {
            Ok(())
        }
    }

    /// Every record in primary-key (insertion) order.
    pub fn list_all(&self) -> Result<Vec<Customer>> {
        self.collect("SELECT id, name, email, phone FROM customers ORDER BY id", [])
    }

    /// Substring search across name, email, and phone. The pattern is built
    /// in application code with LIKE wildcards escaped, then bound as a
    /// parameter, so `%` and `_` in the query match themselves.
    pub fn search(&self, query: &str) -> Result<Vec<Customer>> {
        let pattern = format!("%{}%", escape_like(query));
        self.collect(
            "SELECT id, name, email, phone FROM customers
             WHERE name LIKE ?1 ESCAPE '\\'
                OR email LIKE ?1 ESCAPE '\\'
                OR phone LIKE ?1 ESCAPE '\\'
             ORDER BY id",
            params![pattern],
        )
    }

    /// Records satisfying a structured predicate. The column name comes from
    /// the field enum and the comparison value is always a bound parameter.
    pub fn filter(&self, predicate: &Predicate) -> Result<Vec<Customer>> {
        let column = predicate.field.column();
        match predicate.op {
            FilterOp::Equals => self.collect(
                &format!(
                    "SELECT id, name, email, phone FROM customers
                     WHERE {column} = ?1 ORDER BY id"
                ),
                params![predicate.value],
            ),
            FilterOp::NotEquals => self.collect(
                &format!(
                    "SELECT id, name, email, phone FROM customers
                     WHERE {column} <> ?1 ORDER BY id"
                ),
                params![predicate.value],
            ),
            FilterOp::Contains => {
                let pattern = format!("%{}%", escape_like(&predicate.value));
                self.collect(
                    &format!(
                        "SELECT id, name, email, phone FROM customers
                         WHERE {column} LIKE ?1 ESCAPE '\\' ORDER BY id"
                    ),
                    params![pattern],
                )
            }
        }
    }

    /// All records ordered by the requested field, compared case-insensitively
    /// so "ann" and "Ann" sort together rather than splitting by case. Ties
    /// break by id ascending in both directions so repeated sorts are stable.
    pub fn sort(&self, spec: SortSpec) -> Result<Vec<Customer>> {
        let sql = format!(
            "SELECT id, name, email, phone FROM customers
             ORDER BY {} COLLATE NOCASE {}, id",
            spec.field.column(),
            spec.direction(),
        );
        self.collect(&sql, [])
    }

    /// Record counts grouped by one field, largest group first. Feeds the bar
    /// chart screen.
    pub fn count_by(&self, field: CustomerField) -> Result<Vec<(String, i64)>> {
        let sql = format!(
            "SELECT {0}, COUNT(*) FROM customers
             GROUP BY {0} ORDER BY COUNT(*) DESC, {0}",
            field.column(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    /// Total number of records; the pagination footer wants this without
    /// loading every row.
    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count)
    }

    fn collect<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Customer>> {
        let mut stmt = self.conn.prepare(sql)?;
        let customers = stmt
            .query_map(params, row_to_customer)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(customers)
    }
}

fn row_to_customer(row: &Row<'_>) -> std::result::Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
    })
}

/// Escape LIKE wildcards so a search string is matched literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> CustomerStore {
        let mut store = CustomerStore::open_in_memory().unwrap();
        store.create("Ann", "ann@x.com", "111").unwrap();
        store.create("Bo", "bo@x.com", "222").unwrap();
        store
    }

    #[test]
    fn create_assigns_fresh_ids() {
        let mut store = CustomerStore::open_in_memory().unwrap();
        let a = store.create("Ann", "ann@x.com", "111").unwrap();
        let b = store.create("Bo", "bo@x.com", "222").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "Ann");
        assert_eq!(store.list_all().unwrap(), vec![a, b]);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let mut store = seeded();
        let err = store.update(999, "X", "x@x.com", "0").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 999 }));
    }

    #[test]
    fn delete_missing_id_is_not_found() {
        let mut store = seeded();
        assert!(matches!(
            store.delete(999).unwrap_err(),
            StoreError::NotFound { id: 999 }
        ));
    }

    #[test]
    fn search_escapes_like_wildcards() {
        let mut store = seeded();
        store.create("100%", "percent@x.com", "333").unwrap();
        let hits = store.search("0%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100%");
    }

    #[test]
    fn search_matches_any_field() {
        let store = seeded();
        assert_eq!(store.search("an").unwrap().len(), 1);
        assert_eq!(store.search("@x.com").unwrap().len(), 2);
        assert_eq!(store.search("222").unwrap().len(), 1);
        assert!(store.search("zzz").unwrap().is_empty());
    }

    #[test]
    fn filter_contains_is_literal() {
        let store = seeded();
        let predicate = Predicate::new(CustomerField::Email, FilterOp::Contains, "_");
        assert!(store.filter(&predicate).unwrap().is_empty());
    }

    #[test]
    fn sort_ties_break_by_id() {
        let mut store = CustomerStore::open_in_memory().unwrap();
        let first = store.create("Same", "a@x.com", "1").unwrap();
        let second = store.create("Same", "b@x.com", "2").unwrap();
        for ascending in [true, false] {
            let sorted = store
                .sort(SortSpec::new(CustomerField::Name, ascending))
                .unwrap();
            assert_eq!(sorted[0].id, first.id);
            assert_eq!(sorted[1].id, second.id);
        }
    }

    #[test]
    fn sort_ignores_letter_case() {
        let mut store = CustomerStore::open_in_memory().unwrap();
        // Byte-wise ordering would put "Bo" before "ann"; case-insensitive
        // comparison keeps the alphabetical order a user expects.
        store.create("ann", "ann@x.com", "1").unwrap();
        store.create("Bo", "bo@x.com", "2").unwrap();
        store.create("cleo", "cleo@y.org", "3").unwrap();
        let sorted = store
            .sort(SortSpec::new(CustomerField::Name, true))
            .unwrap();
        let names: Vec<_> = sorted.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ann", "Bo", "cleo"]);
    }

    #[test]
    fn count_by_groups_values() {
        let mut store = seeded();
        store.create("Ann", "other@x.com", "333").unwrap();
        let counts = store.count_by(CustomerField::Name).unwrap();
        assert_eq!(counts[0], ("Ann".to_string(), 2));
        assert_eq!(counts[1], ("Bo".to_string(), 1));
    }
}
