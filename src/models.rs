//! Domain models mirroring the SQLite schema. These stay light-weight data
//! holders so the persistence and presentation layers can focus on their own
//! logic. The field enum doubles as the allow-list that keeps user-supplied
//! attribute names out of SQL text entirely.

use std::fmt;
use std::str::FromStr;

use crate::db::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single customer record. Free-form text everywhere except the primary
/// key; the store never enforces uniqueness or formats on the text fields.
pub struct Customer {
    /// Primary key assigned by SQLite on insert. Immutable once assigned and
    /// never reused, which the edit/delete flows rely on when they bubble the
    /// id back to the store.
    pub id: i64,
    /// Display name shown first in every list row.
    pub name: String,
    /// Contact email, stored as raw text.
    pub email: String,
    /// Contact phone, stored as raw text so formatting like "+1 (555)..."
    /// survives round trips.
    pub phone: String,
}

impl fmt::Display for Customer {
    /// Write the customer name so the type plays nicely with widgets that
    /// consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Customer {
    /// Case-insensitive substring test across all three text fields. The
    /// incremental search bar uses this on already-loaded rows so typing does
    /// not hit the database on every keystroke. Folds ASCII case only, the
    /// same comparison SQLite's LIKE applies in `CustomerStore::search`, so
    /// both paths agree on what a query matches.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_ascii_lowercase();
        self.name.to_ascii_lowercase().contains(&q)
            || self.email.to_ascii_lowercase().contains(&q)
            || self.phone.to_ascii_lowercase().contains(&q)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// The fixed set of attributes that filter, sort, and chart grouping may
/// reference. Anything outside this enum fails at parse time, so query
/// construction only ever sees one of these three column names.
pub enum CustomerField {
    Name,
    Email,
    Phone,
}

impl CustomerField {
    /// All fields in display order, used by the sort picker and chart cycling.
    pub const ALL: [CustomerField; 3] = [
        CustomerField::Name,
        CustomerField::Email,
        CustomerField::Phone,
    ];

    /// Column name used when building ORDER BY / GROUP BY clauses. Returning a
    /// static string makes it impossible to splice caller text into SQL here.
    pub fn column(self) -> &'static str {
        match self {
            CustomerField::Name => "name",
            CustomerField::Email => "email",
            CustomerField::Phone => "phone",
        }
    }

    /// Human-facing label for table headers and pickers.
    pub fn label(self) -> &'static str {
        match self {
            CustomerField::Name => "Name",
            CustomerField::Email => "Email",
            CustomerField::Phone => "Phone",
        }
    }

    /// The next field in cycling order, wrapping around.
    pub fn next(self) -> CustomerField {
        match self {
            CustomerField::Name => CustomerField::Email,
            CustomerField::Email => CustomerField::Phone,
            CustomerField::Phone => CustomerField::Name,
        }
    }
}

impl FromStr for CustomerField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(CustomerField::Name),
            "email" => Ok(CustomerField::Email),
            "phone" => Ok(CustomerField::Phone),
            other => Err(StoreError::InvalidField(other.to_string())),
        }
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
