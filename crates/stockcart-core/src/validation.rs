//! # Validation Module
//!
//! Amount and stock rules shared by every cart operation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation                                                 │
//! │  └── Decrement button disabled at 1 (amount <= 0 never sent)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── validate_requested_amount  (amount > 0)                           │
//! │  └── check_stock                (amount <= available)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Snapshot load                                                │
//! │  └── validate_line_item         (persisted items keep amount >= 1)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockcart_core::validation::{check_stock, validate_requested_amount};
//! use stockcart_core::{ProductId, Stock};
//!
//! assert!(validate_requested_amount(3).is_ok());
//! assert!(validate_requested_amount(0).is_err());
//!
//! let stock = Stock::new(ProductId(1), 5);
//! assert!(check_stock(ProductId(1), 5, &stock).is_ok());
//! assert!(check_stock(ProductId(1), 6, &stock).is_err());
//! ```

use crate::cart::LineItem;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{ProductId, Stock};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates an absolute amount requested for a line item.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_requested_amount(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Checks that `requested` units of `product_id` fit in the reported stock.
pub fn check_stock(product_id: ProductId, requested: i64, stock: &Stock) -> CoreResult<()> {
    if !stock.covers(requested) {
        return Err(CoreError::InsufficientStock {
            product_id,
            available: stock.amount,
            requested,
        });
    }

    Ok(())
}

/// Validates a line item read back from a snapshot.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_requested_amount(item.amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requested_amount() {
        assert!(validate_requested_amount(1).is_ok());
        assert!(validate_requested_amount(100).is_ok());
        assert!(validate_requested_amount(0).is_err());
        assert!(validate_requested_amount(-3).is_err());
    }

    #[test]
    fn test_check_stock_reports_both_sides() {
        let stock = Stock::new(ProductId(4), 2);
        let err = check_stock(ProductId(4), 3, &stock).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product_id: ProductId(4),
                available: 2,
                requested: 3,
            }
        );
    }

    #[test]
    fn test_zero_stock_rejects_everything() {
        let stock = Stock::new(ProductId(1), 0);
        assert!(check_stock(ProductId(1), 1, &stock).is_err());
    }
}
