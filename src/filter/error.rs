use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid sort field: {0}")]
    InvalidSortField(String),

    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),

    #[error("Invalid filter value: {0}")]
    InvalidFilterValue(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}
