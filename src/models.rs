//! Domain models that mirror the SQLite `products` table and get passed
//! throughout the TUI. The types stay light-weight data holders so the other
//! layers can focus on presentation and persistence logic.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// One row of the product table.
pub struct Product {
    /// Primary key assigned by SQLite. Edit and delete flows bubble the id back
    /// to the persistence layer, so it travels with every row even though the
    /// form never shows it as editable.
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    /// Non-negative by convention only; storage does not enforce it.
    pub price: f64,
}

impl Product {
    /// Copy the editable fields into a draft, used to pre-fill the update form.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            quantity: self.quantity,
            price: self.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Validated `(name, quantity, price)` triple ready to be written. Insert and
/// update both take a draft so the id never has to be faked for new rows.
pub struct ProductDraft {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, quantity: i64, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }
}

/// Storage type of a column, fixed when the column is defined rather than
/// re-derived from the database on every write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
}

impl ColumnKind {
    /// Declared SQLite type, exactly as written in the `CREATE TABLE`.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
        }
    }

    /// Whether raw user input converts to this kind. Text accepts anything;
    /// emptiness is checked separately by the form.
    pub fn accepts(self, raw: &str) -> bool {
        let raw = raw.trim();
        match self {
            ColumnKind::Text => true,
            ColumnKind::Integer => raw.parse::<i64>().is_ok(),
            ColumnKind::Real => raw.parse::<f64>().map(f64::is_finite).unwrap_or(false),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// The editable columns of the product table. This is also the allow-list for
/// anything that ends up as an identifier in generated SQL.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Quantity,
    Price,
}

impl Column {
    /// Columns in table order.
    pub const ALL: [Column; 3] = [Column::Name, Column::Quantity, Column::Price];

    /// SQL identifier of the column.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Quantity => "quantity",
            Column::Price => "price",
        }
    }

    /// Human-facing label used by the table header and the form.
    pub fn label(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Quantity => "Quantity",
            Column::Price => "Price",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Name => ColumnKind::Text,
            Column::Quantity => ColumnKind::Integer,
            Column::Price => ColumnKind::Real,
        }
    }

    /// Resolve a column identifier. Anything outside the allow-list, `id`
    /// included, yields `None`.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL
            .into_iter()
            .find(|column| column.as_str() == name.trim())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Only a case-insensitive `"asc"` means ascending; every other value,
    /// the empty string included, sorts descending.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("asc") {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow shown next to the sorted column header.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Build an order from loose strings. Unknown columns are ignored rather
    /// than rejected, which leaves the result unsorted.
    pub fn parse(column: &str, direction: &str) -> Option<Self> {
        Column::from_name(column).map(|column| SortOrder {
            column,
            direction: SortDirection::parse(direction),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Read request for the product table: an optional free-text filter term and
/// an optional single-column ordering.
pub struct ProductQuery {
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
}

impl ProductQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_sort(mut self, sort: Option<SortOrder>) -> Self {
        self.sort = sort;
        self
    }

    /// Trimmed search term, or `None` when there is nothing to filter by.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}
