use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::repo::Transaction;

/// Request body for create and update. Fields are optional and `amount` is a
/// raw JSON value so missing or malformed input uniformly becomes a 400
/// validation error rather than a body-rejection.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub text: Option<String>,
    pub amount: Option<Value>,
}

impl TransactionRequest {
    /// Validate presence and shape: non-blank text (trimmed) and a numeric
    /// amount. Numeric strings are accepted; zero is a legal amount.
    pub fn validate(self) -> Result<(String, f64), &'static str> {
        let text = match self.text {
            Some(t) => {
                let trimmed = t.trim().to_string();
                if trimmed.is_empty() {
                    return Err("Text and amount are required");
                }
                trimmed
            }
            None => return Err("Text and amount are required"),
        };
        let amount = match parse_amount(self.amount.as_ref()) {
            Some(a) => a,
            None => return Err("Text and amount are required"),
        };
        Ok((text, amount))
    }
}

fn parse_amount(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatedTransactionResponse {
    pub message: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UpdatedTransactionResponse {
    pub message: &'static str,
    pub transaction: Transaction,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
