// src/api/expenses.rs
// Expense categories and per-user expense CRUD

use super::{mutating, read_ack, read_json};
use crate::error::Result;
use crate::gateway::{RequestOptions, SessionGateway, endpoints, paths};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// One expense as the backend stores it.
///
/// `amount` is a decimal string (e.g. `"12.50"`) and is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    /// `None` once the category has been deleted
    pub category: Option<i64>,
    pub amount: String,
    pub date: NaiveDate,
}

/// Body for creating an expense; the backend defaults `date` to today
#[derive(Debug, Clone, Serialize)]
pub struct NewExpense {
    pub category: Option<i64>,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Partial update; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ExpenseUpdate {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.amount.is_none() && self.date.is_none()
    }
}

/// Expenses sharing one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseDay {
    pub date: NaiveDate,
    pub expenses: Vec<Expense>,
}

pub async fn categories(gateway: &SessionGateway) -> Result<Vec<Category>> {
    let response = gateway.call(paths::CATEGORIES, RequestOptions::get()).await?;
    read_json(gateway, response, "fetch categories").await
}

/// The logged-in user's expenses, newest first
pub async fn list(gateway: &SessionGateway) -> Result<Vec<Expense>> {
    let response = gateway.call(paths::EXPENSES, RequestOptions::get()).await?;
    read_json(gateway, response, "fetch expenses").await
}

pub async fn get(gateway: &SessionGateway, id: i64) -> Result<Expense> {
    let response = gateway
        .call(&endpoints::expense_detail(id), RequestOptions::get())
        .await?;
    read_json(gateway, response, "fetch expense").await
}

pub async fn create(gateway: &SessionGateway, expense: &NewExpense) -> Result<Expense> {
    let options = mutating(gateway, RequestOptions::post()).await?.json(expense)?;
    let response = gateway.call(paths::EXPENSES, options).await?;
    read_json(gateway, response, "create expense").await
}

pub async fn update(gateway: &SessionGateway, id: i64, changes: &ExpenseUpdate) -> Result<Expense> {
    let options = mutating(gateway, RequestOptions::put()).await?.json(changes)?;
    let response = gateway.call(&endpoints::expense_detail(id), options).await?;
    read_json(gateway, response, "update expense").await
}

pub async fn delete(gateway: &SessionGateway, id: i64) -> Result<()> {
    let options = mutating(gateway, RequestOptions::delete()).await?;
    let response = gateway.call(&endpoints::expense_detail(id), options).await?;
    read_ack(gateway, response, "delete expense").await?;
    Ok(())
}

/// Group expenses by date, newest day first, keeping input order within a day
pub fn group_by_date(expenses: &[Expense]) -> Vec<ExpenseDay> {
    let mut days: BTreeMap<NaiveDate, Vec<Expense>> = BTreeMap::new();
    for expense in expenses {
        days.entry(expense.date).or_default().push(expense.clone());
    }
    days.into_iter()
        .rev()
        .map(|(date, expenses)| ExpenseDay { date, expenses })
        .collect()
}
