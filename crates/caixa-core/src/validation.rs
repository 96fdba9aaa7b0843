//! # Validation Module
//!
//! Boundary validation for request input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Validation Layers                           │
//! │                                                                 │
//! │  Layer 1: serde (deserialization)                               │
//! │  └── Type/shape checks, rejects malformed JSON                  │
//! │           │                                                     │
//! │           ▼                                                     │
//! │  Layer 2: THIS MODULE                                           │
//! │  └── Business-shaped checks before any database work            │
//! │           │                                                     │
//! │           ▼                                                     │
//! │  Layer 3: SQLite constraints                                    │
//! │  └── NOT NULL, UNIQUE, CHECK (stock >= 0)                       │
//! │                                                                 │
//! │  Defense in depth: each layer catches different mistakes        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_AMOUNT_CENTS, MAX_LINE_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 50 characters
/// - Alphanumeric plus hyphen and underscore
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates the operator name given when opening the register.
pub fn validate_operator_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "operator_name".to_string(),
        });
    }

    if name.len() > 120 {
        return Err(ValidationError::TooLong {
            field: "operator_name".to_string(),
            max: 120,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Strictly positive
/// - At most [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or balance amount in cents. Zero is allowed (a register
/// can legally open with an empty drawer; a promotional item can be free).
///
/// The upper bound is [`MAX_AMOUNT_CENTS`]: with every amount below it, line
/// totals and balance sums stay exact in i64 arithmetic.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the shape of a sale's item list: non-empty and bounded.
pub fn validate_sale_lines(line_count: usize) -> ValidationResult<()> {
    if line_count == 0 {
        return Err(ValidationError::EmptySale);
    }

    if line_count > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("CAFE-500").is_ok());
        assert!(validate_product_code("abc123").is_ok());
        assert!(validate_product_code("produto_1").is_ok());

        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("   ").is_err());
        assert!(validate_product_code("has space").is_err());
        assert!(validate_product_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_operator_name() {
        assert!(validate_operator_name("Maria").is_ok());
        assert!(validate_operator_name("").is_err());
        assert!(validate_operator_name("  ").is_err());
        assert!(validate_operator_name(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("price", 0).is_ok());
        assert!(validate_amount_cents("price", 1099).is_ok());
        assert!(validate_amount_cents("price", MAX_AMOUNT_CENTS).is_ok());

        assert!(validate_amount_cents("price", -1).is_err());
        assert!(validate_amount_cents("price", MAX_AMOUNT_CENTS + 1).is_err());
        // A price anywhere near i64::MAX would overflow line-total math
        assert!(validate_amount_cents("price", i64::MAX).is_err());
    }

    #[test]
    fn test_validate_sale_lines() {
        assert!(validate_sale_lines(1).is_ok());
        assert!(validate_sale_lines(100).is_ok());

        assert!(validate_sale_lines(0).is_err());
        assert!(validate_sale_lines(101).is_err());
    }
}
