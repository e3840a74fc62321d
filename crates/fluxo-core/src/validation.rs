//! # Validation Module
//!
//! Input validation shared by the ledgers.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form checks (empty fields, number parsing)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rules, run BEFORE any mutation        │
//! │           │     so a rejected operation leaves no partial state        │
//! │           ▼                                                             │
//! │  Layer 3: SQLite CHECK / NOT NULL constraints in fluxo-db              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fluxo_core::validation::{validate_quantity, validate_required};
//!
//! validate_quantity(5).unwrap();
//! assert!(validate_required("reason", "  ").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ProductDraft;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ```rust
/// use fluxo_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Coca-Cola 350ml").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name)?;
    validate_max_len("name", name, MAX_NAME_LEN)
}

/// Validates a ledger description (required, at most 500 characters).
pub fn validate_description(description: &str) -> ValidationResult<()> {
    validate_required("description", description)?;
    validate_max_len("description", description, MAX_DESCRIPTION_LEN)
}

/// Validates a cancellation reason (required, at most 500 characters).
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    validate_required("reason", reason)?;
    validate_max_len("reason", reason, MAX_DESCRIPTION_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity rung up on one sale line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_positive_quantity(qty)?;

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Rejects zero and negative quantities, with no upper bound.
///
/// Used for stock receipts and ledger entries, where a pallet or an
/// imported line may exceed the per-sale cap.
pub fn validate_positive_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Rejects negative amounts; zero is allowed.
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects zero and negative amounts.
pub fn validate_positive(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects negative stock counts and thresholds.
pub fn validate_stock_level(field: &str, level: i64) -> ValidationResult<()> {
    if level < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a product form.
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_product_name(&draft.name)?;
    validate_max_len("category", &draft.category, MAX_CATEGORY_LEN)?;
    validate_non_negative("cost price", draft.cost_price)?;
    validate_non_negative("sell price", draft.sell_price)?;
    validate_stock_level("stock", draft.stock)?;
    validate_stock_level("minimum stock", draft.min_stock)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Salgado Assado".to_string(),
            category: "Lanches".to_string(),
            cost_price: Money::from_cents(300),
            sell_price: Money::from_cents(750),
            stock: 15,
            min_stock: 5,
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("reason", "erro").is_ok());
        assert!(validate_required("reason", "").is_err());
        assert!(validate_required("reason", "   ").is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Chiclete Trident").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_positive_quantity_has_no_cap() {
        assert!(validate_positive_quantity(1).is_ok());
        assert!(validate_positive_quantity(MAX_ITEM_QUANTITY + 1).is_ok());
        assert!(validate_positive_quantity(0).is_err());
        assert!(validate_positive_quantity(-5).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_non_negative("amount", Money::zero()).is_ok());
        assert!(validate_non_negative("amount", Money::from_cents(-1)).is_err());
        assert!(validate_positive("amount", Money::from_cents(1)).is_ok());
        assert!(validate_positive("amount", Money::zero()).is_err());
    }

    #[test]
    fn test_validate_product_draft() {
        assert!(validate_product_draft(&draft()).is_ok());

        let mut bad = draft();
        bad.stock = -1;
        assert_eq!(
            validate_product_draft(&bad),
            Err(ValidationError::MustNotBeNegative {
                field: "stock".to_string()
            })
        );

        let mut bad = draft();
        bad.sell_price = Money::from_cents(-100);
        assert!(validate_product_draft(&bad).is_err());

        let mut bad = draft();
        bad.name = " ".to_string();
        assert!(validate_product_draft(&bad).is_err());
    }
}
