// Sales listing shaping
// Folds joined sale/item rows into one record per transaction

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::SaleLine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_at_sale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleTransaction {
    pub transaction_id: i32,
    pub transaction_date: NaiveDateTime,
    pub customer_name: Option<String>,
    pub payment_method: Option<String>,
    pub total_amount: f64,
    pub items: Vec<SaleItem>,
}

/// Group rows by transaction, preserving the order in which each
/// transaction first appears. Rows from a LEFT JOIN with no item
/// contribute the transaction header but no item.
pub fn group_sale_lines(lines: Vec<SaleLine>) -> Vec<SaleTransaction> {
    let mut grouped: Vec<SaleTransaction> = Vec::new();

    for line in lines {
        let item = match (line.product_name, line.quantity, line.unit_price_at_sale) {
            (Some(product_name), Some(quantity), Some(unit_price_at_sale)) => Some(SaleItem {
                product_name,
                quantity,
                unit_price_at_sale,
            }),
            _ => None,
        };

        // Rows arrive ordered by transaction, so only the tail can match
        match grouped.last_mut() {
            Some(current) if current.transaction_id == line.transaction_id => {
                current.items.extend(item);
            }
            _ => grouped.push(SaleTransaction {
                transaction_id: line.transaction_id,
                transaction_date: line.transaction_date,
                customer_name: line.customer_name,
                payment_method: line.payment_method,
                total_amount: line.total_amount,
                items: item.into_iter().collect(),
            }),
        }
    }

    grouped
}
