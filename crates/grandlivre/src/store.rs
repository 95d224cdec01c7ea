use async_trait::async_trait;
use serde_json::Value;
use strum_macros::{AsRefStr, EnumString};
use thiserror::Error;

pub mod supabase;

#[cfg(test)]
pub mod mock;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Comparison operators accepted in filter objects, named as the REST layer
/// names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    Is,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read query against one record collection. Built the way the original
/// client chains its calls: columns, filters, order, limit.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn new<S: Into<String>>(table: S) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns<S: Into<String>>(mut self, columns: S) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn filter<S: Into<String>>(mut self, column: S, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value,
        });
        self
    }

    pub fn eq<S: Into<String>>(self, column: S, value: Value) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn order<S: Into<String>>(mut self, column: S, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read access to the accounting data store. The tools are written against
/// this trait so they can be exercised without a network.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, StoreError>;
}
