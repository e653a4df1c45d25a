use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use tracing::{debug, info};

use super::connection::{ProductStore, TABLE};
use super::error::{wrap, StorageError, StorageResult};
use crate::models::{Product, ProductDraft, ProductQuery, SortOrder};

impl ProductStore {
    /// Insert a new product and return the id SQLite assigned to it. Type
    /// checking is the form's job; here only the storage engine's own
    /// constraints apply.
    pub fn insert(&self, draft: &ProductDraft) -> StorageResult<i64> {
        let conn = self.open(StorageError::Insert)?;
        conn.execute(
            &format!("INSERT INTO {TABLE} (name, quantity, price) VALUES (?1, ?2, ?3)"),
            params![draft.name, draft.quantity, draft.price],
        )
        .map_err(wrap(StorageError::Insert))?;

        let id = conn.last_insert_rowid();
        info!(id, name = %draft.name, "product added");
        Ok(id)
    }

    /// Overwrite all editable fields of the product with `id`. A missing id is
    /// not an error: the return value says whether any row matched and the
    /// caller decides what that means.
    pub fn update(&self, id: i64, draft: &ProductDraft) -> StorageResult<bool> {
        let conn = self.open(StorageError::Update)?;
        let updated = conn
            .execute(
                &format!("UPDATE {TABLE} SET name = ?1, quantity = ?2, price = ?3 WHERE id = ?4"),
                params![draft.name, draft.quantity, draft.price, id],
            )
            .map_err(wrap(StorageError::Update))?;

        info!(id, matched = updated > 0, "product updated");
        Ok(updated > 0)
    }

    /// Remove every product whose id is in `ids` with one statement. Ids that
    /// do not exist are ignored; the count of rows actually removed is
    /// returned.
    pub fn delete(&self, ids: &[i64]) -> StorageResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.open(StorageError::Delete)?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let deleted = conn
            .execute(
                &format!("DELETE FROM {TABLE} WHERE id IN ({placeholders})"),
                params_from_iter(ids.iter()),
            )
            .map_err(wrap(StorageError::Delete))?;

        info!(requested = ids.len(), deleted, "products deleted");
        Ok(deleted)
    }

    /// Load the product table, filtered and ordered as the query asks.
    pub fn fetch(&self, query: &ProductQuery) -> StorageResult<Vec<Product>> {
        let (sql, values) = build_select(query);
        debug!(%sql, params = values.len(), "fetching products");

        let conn = self.open(StorageError::Query)?;
        let mut stmt = conn.prepare(&sql).map_err(wrap(StorageError::Query))?;

        let products = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok(Product {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    quantity: row.get(2)?,
                    price: row.get(3)?,
                })
            })
            .map_err(wrap(StorageError::Query))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(wrap(StorageError::Query))?;

        Ok(products)
    }
}

/// Assemble the SELECT statement and its bound values for a query.
fn build_select(query: &ProductQuery) -> (String, Vec<Value>) {
    let mut sql = format!("SELECT id, name, quantity, price FROM {TABLE}");
    let mut values = Vec::new();

    if let Some(term) = query.search_term() {
        let (clause, filter_values) = build_filter_clause(term);
        sql.push_str(&clause);
        values = filter_values;
    }

    sql.push_str(&order_clause(query.sort));
    (sql, values)
}

/// Build the WHERE clause for a search term. A row matches when any single
/// condition holds:
/// - the term is a case-sensitive substring of the name,
/// - the term is a substring of the quantity or price rendered as text,
/// - the term parses as a number equal to the quantity or price.
///
/// The term is always bound, never spliced, so `%` and `_` stay literal.
fn build_filter_clause(term: &str) -> (String, Vec<Value>) {
    let text = Value::Text(term.to_string());
    let mut conditions = vec![
        "instr(name, ?) > 0",
        "instr(CAST(quantity AS TEXT), ?) > 0",
        "instr(CAST(price AS TEXT), ?) > 0",
    ];
    let mut values = vec![text.clone(), text.clone(), text];

    if let Ok(number) = term.parse::<f64>() {
        conditions.push("quantity = ?");
        conditions.push("price = ?");
        values.push(Value::Real(number));
        values.push(Value::Real(number));
    }

    (format!(" WHERE {}", conditions.join(" OR ")), values)
}

/// ORDER BY for the requested column, with `id` as the tie-breaker so equal
/// keys come back in insertion order.
fn order_clause(sort: Option<SortOrder>) -> String {
    match sort {
        Some(SortOrder { column, direction }) => {
            format!(" ORDER BY {} {}, id ASC", column.as_str(), direction.as_sql())
        }
        None => " ORDER BY id ASC".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, SortDirection};

    #[test]
    fn text_terms_only_get_substring_conditions() {
        let (clause, values) = build_filter_clause("bolt");
        assert_eq!(
            clause,
            " WHERE instr(name, ?) > 0 OR instr(CAST(quantity AS TEXT), ?) > 0 \
             OR instr(CAST(price AS TEXT), ?) > 0"
        );
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| *v == Value::Text("bolt".into())));
    }

    #[test]
    fn numeric_terms_add_equality_conditions() {
        let (clause, values) = build_filter_clause("0.05");
        assert!(clause.ends_with("OR quantity = ? OR price = ?"));
        assert_eq!(values.len(), 5);
        assert_eq!(values[3], Value::Real(0.05));
        assert_eq!(values[4], Value::Real(0.05));
    }

    #[test]
    fn blank_search_produces_no_where_clause() {
        let (sql, values) = build_select(&ProductQuery::all().with_search("  "));
        assert_eq!(sql, "SELECT id, name, quantity, price FROM products ORDER BY id ASC");
        assert!(values.is_empty());
    }

    #[test]
    fn sort_uses_allow_listed_identifier_and_direction() {
        let sort = Some(SortOrder {
            column: Column::Price,
            direction: SortDirection::Descending,
        });
        assert_eq!(order_clause(sort), " ORDER BY price DESC, id ASC");
    }
}
