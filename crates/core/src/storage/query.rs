use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::convention::Timestamp;

use super::schema::ID;
use super::{FieldValue, RepositoryError, Result};

/// Point lookup of a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub column: &'static str,
    pub value: FieldValue,
    pub include_deleted: bool,
}

impl Lookup {
    /// Lookup by primary key. Tombstoned rows are returned.
    pub fn by_id(id: Uuid) -> Self {
        Self {
            column: ID,
            value: FieldValue::Id(id),
            include_deleted: true,
        }
    }

    /// Lookup by a secondary column. Only alive rows match; the most recently
    /// created one wins.
    pub fn by_column(column: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            column,
            value: value.into(),
            include_deleted: false,
        }
    }
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: FieldValue,
}

/// Keyset pagination boundary.
///
/// Rendered as `"{tm_create}"` or `"{tm_create}|{id}"`. The next page holds
/// rows strictly after the boundary in `(tm_create DESC, id DESC)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken {
    pub tm_create: Timestamp,
    pub id: Option<Uuid>,
}

impl PageToken {
    pub fn new(tm_create: Timestamp, id: Uuid) -> Self {
        Self {
            tm_create,
            id: Some(id),
        }
    }

    /// Parses a caller token. An empty token means "from the newest row".
    pub fn parse_opt(token: &str) -> Result<Option<Self>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        token.parse().map(Some)
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}|{}", self.tm_create, id),
            None => write!(f, "{}", self.tm_create),
        }
    }
}

impl FromStr for PageToken {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RepositoryError::InvalidData(format!("invalid page token '{s}'"));
        let (ts, id) = match s.split_once('|') {
            Some((ts, id)) => (ts, Some(Uuid::parse_str(id).map_err(|_| invalid())?)),
            None => (s, None),
        };
        let tm_create = ts.parse().map_err(|_| invalid())?;
        Ok(Self { tm_create, id })
    }
}

impl Serialize for PageToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parameters of a paginated list query.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub page_token: Option<PageToken>,
    pub limit: usize,
    pub include_deleted: bool,
}

impl ListQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            filters: Vec::new(),
            page_token: None,
            limit,
            include_deleted: false,
        }
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn after(mut self, token: Option<PageToken>) -> Self {
        self.page_token = token;
        self
    }

    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }
}

/// One page of a list query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Present only when the page was full; pass it back to get the next page.
    pub next_page_token: Option<PageToken>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> Timestamp {
        "2024-06-15 10:30:00.000000".parse().unwrap()
    }

    #[test]
    fn test_token_with_id() {
        let token = PageToken::new(ts(), Uuid::nil());
        let rendered = token.to_string();
        assert_eq!(
            rendered,
            "2024-06-15 10:30:00.000000|00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(rendered.parse::<PageToken>().unwrap(), token);
    }

    #[test]
    fn test_token_timestamp_only() {
        let token: PageToken = "2024-06-15 10:30:00.000000".parse().unwrap();
        assert_eq!(token.tm_create, ts());
        assert_eq!(token.id, None);
    }

    #[test]
    fn test_empty_token_is_none() {
        assert_eq!(PageToken::parse_opt("").unwrap(), None);
        assert_eq!(PageToken::parse_opt("  ").unwrap(), None);
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(
            "tomorrow".parse::<PageToken>(),
            Err(RepositoryError::InvalidData(_))
        ));
        assert!(matches!(
            "2024-06-15 10:30:00.000000|nope".parse::<PageToken>(),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_lookup_by_id_includes_deleted() {
        assert!(Lookup::by_id(Uuid::nil()).include_deleted);
        assert!(!Lookup::by_column("bridge_id", "b-1").include_deleted);
    }

    #[test]
    fn test_list_query_builder() {
        let query = ListQuery::new(10)
            .filter("customer_id", Uuid::nil())
            .include_deleted(true);
        assert_eq!(query.limit, 10);
        assert_eq!(query.filters.len(), 1);
        assert!(query.include_deleted);
        assert_eq!(query.page_token, None);
    }

    #[test]
    fn test_page_serializes_token_as_string() {
        let page = Page {
            items: vec![1, 2],
            next_page_token: Some(PageToken::new(ts(), Uuid::nil())),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json["next_page_token"],
            "2024-06-15 10:30:00.000000|00000000-0000-0000-0000-000000000000"
        );
    }
}
