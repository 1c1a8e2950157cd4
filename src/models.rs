//! Finance list records as served by the backend
//!
//! Amounts arrive as decimal strings ("150000.00"); `rust_decimal` keeps
//! them exact.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Paginated list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuitionPayment {
    pub id: i64,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_matricule: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub id: i64,
    #[serde(default)]
    pub employee: Option<i64>,
    pub employee_name: String,
    pub month: u32,
    pub year: i32,
    pub base_salary: Decimal,
    #[serde(default)]
    pub bonuses: Decimal,
    #[serde(default)]
    pub deductions: Decimal,
    pub net_salary: Decimal,
    /// PENDING | PAID | CANCELLED
    pub status: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub payment_date: Option<NaiveDate>,
}

impl Salary {
    /// First day of the salary's month
    pub fn period_start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    /// SALARIES | UTILITIES | MAINTENANCE | EQUIPMENT | SUPPLIES | OTHER
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(deserialize_with = "strict_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub approved_by: Option<i64>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Row of the recovery list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingBalance {
    #[serde(default)]
    pub student_id: Option<i64>,
    pub student_name: String,
    pub student_matricule: String,
    pub balance: Decimal,
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part kept)
fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date_prefix))
}

fn strict_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date_prefix(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}
