// src/api/summary.rs
// Current-month spending per category

use super::read_json;
use crate::error::Result;
use crate::gateway::{RequestOptions, SessionGateway, paths};
use serde::{Deserialize, Serialize};

/// Total for one category; `total` is a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: String,
}

/// Totals from the 1st of the current month up to today
pub async fn monthly(gateway: &SessionGateway) -> Result<Vec<CategoryTotal>> {
    let response = gateway.call(paths::EXPENSE_SUMMARY, RequestOptions::get()).await?;
    read_json(gateway, response, "fetch expense summary").await
}
