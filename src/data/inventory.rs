// Inventory reorder recommendations
// Flags products at or below their reorder level and sizes a restock

use serde::{Deserialize, Serialize};

use super::InventoryLevel;

/// Window the `units_sold_30d` column covers
const VELOCITY_WINDOW_DAYS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventoryPolicy {
    /// Days of demand a restock should cover
    pub cover_days: u32,
}

impl Default for InventoryPolicy {
    fn default() -> Self {
        Self { cover_days: 14 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecommendation {
    pub product_id: i32,
    pub product_name: String,
    pub current_stock: i32,
    pub reorder_level: i32,
    pub recommended_reorder_quantity: i64,
    pub estimated_cost: f64,
}

/// Build reorder suggestions for every product at or below its reorder
/// level, largest shortfall first.
///
/// Target stock is the larger of twice the reorder level and the demand
/// expected over `cover_days` at the trailing 30-day sell rate.
pub fn recommend_reorders(
    levels: &[InventoryLevel],
    policy: InventoryPolicy,
) -> Vec<InventoryRecommendation> {
    let mut recommendations: Vec<InventoryRecommendation> = levels
        .iter()
        .filter(|level| level.current_stock <= level.reorder_level)
        .map(|level| {
            let velocity = level.units_sold_30d.max(0) as f64 / VELOCITY_WINDOW_DAYS;
            let demand = (velocity * policy.cover_days as f64).ceil() as i64;
            let target = (2 * level.reorder_level as i64).max(demand);
            let quantity = (target - level.current_stock as i64).max(1);

            InventoryRecommendation {
                product_id: level.product_id,
                product_name: level.product_name.clone(),
                current_stock: level.current_stock,
                reorder_level: level.reorder_level,
                recommended_reorder_quantity: quantity,
                estimated_cost: quantity as f64 * level.unit_price,
            }
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.recommended_reorder_quantity
            .cmp(&a.recommended_reorder_quantity)
            .then(a.product_id.cmp(&b.product_id))
    });

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(id: i32, stock: i32, reorder: i32, sold_30d: i64) -> InventoryLevel {
        InventoryLevel {
            product_id: id,
            product_name: format!("Product {}", id),
            current_stock: stock,
            reorder_level: reorder,
            unit_price: 2.5,
            units_sold_30d: sold_30d,
        }
    }

    #[test]
    fn test_healthy_stock_is_skipped() {
        let recs = recommend_reorders(&[level(1, 50, 10, 30)], InventoryPolicy::default());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_slow_mover_restocks_to_twice_reorder_level() {
        // 3 units/30d over 14 days is 2 units, below 2 * 10
        let recs = recommend_reorders(&[level(1, 4, 10, 3)], InventoryPolicy::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].recommended_reorder_quantity, 16);
        assert_eq!(recs[0].estimated_cost, 40.0);
    }

    #[test]
    fn test_fast_mover_restocks_to_cover_demand() {
        // 300 units/30d = 10/day, 14 days of cover = 140
        let recs = recommend_reorders(&[level(2, 5, 10, 300)], InventoryPolicy::default());
        assert_eq!(recs[0].recommended_reorder_quantity, 135);
    }

    #[test]
    fn test_at_reorder_level_with_no_sales_still_orders() {
        let recs = recommend_reorders(&[level(3, 0, 0, 0)], InventoryPolicy::default());
        assert_eq!(recs[0].recommended_reorder_quantity, 1);
    }

    #[test]
    fn test_sorted_by_largest_quantity() {
        let recs = recommend_reorders(
            &[level(1, 9, 10, 0), level(2, 0, 10, 0), level(3, 100, 10, 0)],
            InventoryPolicy::default(),
        );
        let ids: Vec<i32> = recs.iter().map(|r| r.product_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
