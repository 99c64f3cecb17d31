//! Structured filter and ordering specifications. Free-form condition text
//! from the UI is parsed into typed values here, and the value side is always
//! bound as a parameter, so unvalidated text never reaches query construction.

use std::str::FromStr;

use crate::models::CustomerField;

use super::error::{Result, StoreError};

/// Comparison operators accepted by the filter form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterOp {
    Equals,
    NotEquals,
    Contains,
}

impl FilterOp {
    pub const ALL: [FilterOp; 3] = [FilterOp::Equals, FilterOp::NotEquals, FilterOp::Contains];

    /// Symbol shown in the filter form and accepted by the text parser.
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOp::Equals => "=",
            FilterOp::NotEquals => "!=",
            FilterOp::Contains => "~",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterOp::Equals => "equals",
            FilterOp::NotEquals => "not equals",
            FilterOp::Contains => "contains",
        }
    }

    pub fn next(self) -> FilterOp {
        match self {
            FilterOp::Equals => FilterOp::NotEquals,
            FilterOp::NotEquals => FilterOp::Contains,
            FilterOp::Contains => FilterOp::Equals,
        }
    }
}

/// A validated boolean condition over one customer field. The value is kept
/// verbatim and bound with `?1` by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: CustomerField,
    pub op: FilterOp,
    pub value: String,
}

impl Predicate {
    pub fn new(field: CustomerField, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            field,
            op,
            value: value.into(),
        }
    }
}

impl FromStr for Predicate {
    type Err = StoreError;

    /// Parse `field op value` text, e.g. `name = Ann` or `email ~ @x.com`.
    /// The field must pass the allow-list; everything after the operator is
    /// the literal value (leading/trailing whitespace trimmed).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (field_raw, rest) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| StoreError::InvalidField(trimmed.to_string()))?;
        let field: CustomerField = field_raw.parse()?;

        let rest = rest.trim_start();
        for op in FilterOp::ALL {
            if let Some(value) = rest.strip_prefix(op.symbol()) {
                return Ok(Predicate::new(field, op, value.trim()));
            }
        }
        Err(StoreError::InvalidField(format!(
            "missing operator in '{trimmed}' (use =, !=, or ~)"
        )))
    }
}

/// Ordering specification for the sort operation. Ties always break by id so
/// repeated sorts are stable regardless of direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: CustomerField,
    pub ascending: bool,
}

impl SortSpec {
    pub fn new(field: CustomerField, ascending: bool) -> Self {
        Self { field, ascending }
    }

    /// SQL direction keyword. Only ever "ASC"/"DESC", never caller text.
    pub(super) fn direction(self) -> &'static str {
        if self.ascending {
            "ASC"
        } else {
            "DESC"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_equals_predicate() {
        let p: Predicate = "name = Ann".parse().unwrap();
        assert_eq!(p, Predicate::new(CustomerField::Name, FilterOp::Equals, "Ann"));
    }

    #[test]
    fn parses_not_equals_before_equals() {
        let p: Predicate = "phone != 111".parse().unwrap();
        assert_eq!(p.op, FilterOp::NotEquals);
        assert_eq!(p.value, "111");
    }

    #[test]
    fn parses_contains_with_spaces_in_value() {
        let p: Predicate = "email ~ @x.com  ".parse().unwrap();
        assert_eq!(p.field, CustomerField::Email);
        assert_eq!(p.op, FilterOp::Contains);
        assert_eq!(p.value, "@x.com");
    }

    #[test]
    fn rejects_unknown_field() {
        let err = "id = 1".parse::<Predicate>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(_)));
    }

    #[test]
    fn rejects_missing_operator() {
        let err = "name Ann".parse::<Predicate>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(_)));
    }

    #[test]
    fn rejects_sql_injection_shaped_field() {
        let err = "name; DROP TABLE customers = x".parse::<Predicate>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(_)));
    }
}
