//! Weighted-average cost reconciliation for receiving and its reversal
//!
//! Both directions are pure functions over their documented inputs. Reversal
//! is best-effort: movements between a receive and its undo are not tracked,
//! so callers inspect [`Reconciliation`] to tell an exact inverse from a
//! fallback.

/// Result of applying a receive line to on-hand stock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardCost {
    pub new_qty: f64,
    /// `None` leaves the stored cost untouched
    pub new_cost: Option<f64>,
}

/// Blend newly received units into the on-hand quantity and unit cost.
pub fn apply_receipt(
    previous_qty: f64,
    previous_cost: f64,
    received_qty: i64,
    cost_per_item: Option<f64>,
) -> ForwardCost {
    let received = received_qty as f64;
    let new_qty = previous_qty + received;

    let new_cost = cost_per_item.map(|unit_cost| {
        if new_qty > 0.0 {
            (previous_qty * previous_cost + received * unit_cost) / new_qty
        } else {
            unit_cost
        }
    });

    ForwardCost { new_qty, new_cost }
}

/// How the reversed cost was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Weighted average algebraically inverted
    Inverted,
    /// No stock left; cost reset to zero
    ZeroStock,
    /// Inversion impossible or meaningless; recorded previous cost restored
    Fallback,
    /// Line carried no cost information; stored cost left as is
    Untouched,
}

/// What a receive line recorded, plus the current on-hand state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReversalInput {
    pub current_qty: f64,
    pub current_cost: f64,
    /// Units the line received
    pub quantity: i64,
    pub cost_per_item: Option<f64>,
    pub previous_cost: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReversedCost {
    pub new_qty: f64,
    /// `None` leaves the stored cost untouched
    pub new_cost: Option<f64>,
    pub reconciliation: Reconciliation,
    /// Fewer units were on hand than the line received
    pub quantity_clamped: bool,
}

impl ReversedCost {
    /// True when the result is not a faithful inverse of the receive
    pub fn is_approximate(&self) -> bool {
        self.quantity_clamped || self.reconciliation == Reconciliation::Fallback
    }
}

/// Take a receive line back out of on-hand stock.
///
/// Quantity never goes below zero. `current_qty == quantity` and
/// `current_qty < quantity` both land in the zero-stock branch, so a cost
/// fallback only happens when stock remains and the line had no usable cost.
pub fn reverse_receipt(input: ReversalInput) -> ReversedCost {
    let received = input.quantity as f64;
    let quantity_clamped = input.current_qty < received;
    let new_qty = (input.current_qty - received).max(0.0);

    if new_qty == 0.0 {
        return ReversedCost {
            new_qty,
            new_cost: Some(0.0),
            reconciliation: Reconciliation::ZeroStock,
            quantity_clamped,
        };
    }

    if let (Some(unit_cost), Some(previous_cost)) = (input.cost_per_item, input.previous_cost) {
        if input.current_qty > received {
            let inverted = (input.current_qty * input.current_cost - received * unit_cost) / new_qty;
            if inverted.is_finite() && inverted >= 0.0 {
                return ReversedCost {
                    new_qty,
                    new_cost: Some(inverted),
                    reconciliation: Reconciliation::Inverted,
                    quantity_clamped,
                };
            }
            return ReversedCost {
                new_qty,
                new_cost: Some(previous_cost),
                reconciliation: Reconciliation::Fallback,
                quantity_clamped,
            };
        }
    }

    match input.previous_cost {
        Some(previous_cost) => ReversedCost {
            new_qty,
            new_cost: Some(previous_cost),
            reconciliation: Reconciliation::Fallback,
            quantity_clamped,
        },
        None => ReversedCost {
            new_qty,
            new_cost: None,
            reconciliation: Reconciliation::Untouched,
            quantity_clamped,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_weighted_average_receipt() {
        let result = apply_receipt(10.0, 5.0, 5, Some(8.0));
        assert_eq!(result.new_qty, 15.0);
        assert!((result.new_cost.unwrap() - 6.0).abs() < EPS);
    }

    #[test]
    fn test_receipt_without_cost_leaves_cost_alone() {
        let result = apply_receipt(3.0, 7.0, 2, None);
        assert_eq!(result.new_qty, 5.0);
        assert_eq!(result.new_cost, None);
    }

    #[test]
    fn test_receipt_into_empty_stock_takes_unit_cost() {
        let result = apply_receipt(0.0, 0.0, 4, Some(2.25));
        assert_eq!(result.new_qty, 4.0);
        assert!((result.new_cost.unwrap() - 2.25).abs() < EPS);
    }

    #[test]
    fn test_reverse_inverts_weighted_average() {
        let result = reverse_receipt(ReversalInput {
            current_qty: 15.0,
            current_cost: 6.0,
            quantity: 5,
            cost_per_item: Some(8.0),
            previous_cost: Some(5.0),
        });
        assert_eq!(result.new_qty, 10.0);
        assert!((result.new_cost.unwrap() - 5.0).abs() < EPS);
        assert_eq!(result.reconciliation, Reconciliation::Inverted);
        assert!(!result.is_approximate());
    }

    #[test]
    fn test_reverse_round_trip_is_exact() {
        let forward = apply_receipt(7.0, 3.3, 11, Some(4.1));
        let reversed = reverse_receipt(ReversalInput {
            current_qty: forward.new_qty,
            current_cost: forward.new_cost.unwrap(),
            quantity: 11,
            cost_per_item: Some(4.1),
            previous_cost: Some(3.3),
        });
        assert_eq!(reversed.new_qty, 7.0);
        assert!((reversed.new_cost.unwrap() - 3.3).abs() < EPS);
    }

    #[test]
    fn test_reverse_floors_quantity_at_zero() {
        let result = reverse_receipt(ReversalInput {
            current_qty: 5.0,
            current_cost: 6.0,
            quantity: 10,
            cost_per_item: Some(8.0),
            previous_cost: Some(5.0),
        });
        assert_eq!(result.new_qty, 0.0);
        assert_eq!(result.new_cost, Some(0.0));
        assert_eq!(result.reconciliation, Reconciliation::ZeroStock);
        assert!(result.quantity_clamped);
        assert!(result.is_approximate());
    }

    #[test]
    fn test_reverse_exact_consumption_hits_zero_branch() {
        let result = reverse_receipt(ReversalInput {
            current_qty: 5.0,
            current_cost: 6.0,
            quantity: 5,
            cost_per_item: Some(8.0),
            previous_cost: Some(5.0),
        });
        assert_eq!(result.new_qty, 0.0);
        assert_eq!(result.reconciliation, Reconciliation::ZeroStock);
        assert!(!result.quantity_clamped);
    }

    #[test]
    fn test_reverse_negative_inversion_falls_back() {
        // Cost dropped after the receive, so the inverse goes negative
        let result = reverse_receipt(ReversalInput {
            current_qty: 12.0,
            current_cost: 1.0,
            quantity: 10,
            cost_per_item: Some(9.0),
            previous_cost: Some(4.0),
        });
        assert_eq!(result.new_qty, 2.0);
        assert_eq!(result.new_cost, Some(4.0));
        assert_eq!(result.reconciliation, Reconciliation::Fallback);
    }

    #[test]
    fn test_reverse_line_without_unit_cost_restores_previous() {
        let result = reverse_receipt(ReversalInput {
            current_qty: 8.0,
            current_cost: 3.0,
            quantity: 3,
            cost_per_item: None,
            previous_cost: Some(2.0),
        });
        assert_eq!(result.new_qty, 5.0);
        assert_eq!(result.new_cost, Some(2.0));
        assert_eq!(result.reconciliation, Reconciliation::Fallback);
    }

    #[test]
    fn test_reverse_without_any_cost_leaves_cost() {
        let result = reverse_receipt(ReversalInput {
            current_qty: 8.0,
            current_cost: 0.0,
            quantity: 3,
            cost_per_item: None,
            previous_cost: None,
        });
        assert_eq!(result.new_qty, 5.0);
        assert_eq!(result.new_cost, None);
        assert_eq!(result.reconciliation, Reconciliation::Untouched);
    }
}
