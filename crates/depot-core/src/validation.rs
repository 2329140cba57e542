//! # Validation Module
//!
//! Input validation utilities for Depot.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (UI / API)                                            │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  └── Every ValidationError rejects BEFORE any write                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints (quantity >= 0, capacity > 0)        │
//! │  └── UNIQUE constraint on barcode                                      │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::NewProduct;
use crate::MAX_MUTATION_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product barcode.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
/// - Digits, letters, hyphens only (covers EAN/UPC and internal codes)
///
/// ## Example
/// ```rust
/// use depot_core::validation::validate_barcode;
///
/// assert!(validate_barcode("8850999001234").is_ok());
/// assert!(validate_barcode("").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    if !barcode
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
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

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale/adjustment quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_MUTATION_QUANTITY
pub fn validate_sale_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_MUTATION_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_MUTATION_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock count (initial or patched quantity).
///
/// ## Rules
/// - Must be non-negative (>= 0); zero means out of stock
pub fn validate_stock_count(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a monetary amount in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free/zero-cost items)
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a location capacity.
///
/// ## Rules
/// - Must be strictly positive
pub fn validate_capacity(capacity: i64) -> ValidationResult<()> {
    if capacity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "capacity".to_string(),
        });
    }

    Ok(())
}

/// Validates a low-stock threshold.
///
/// ## Rules
/// - Must be non-negative; zero alerts only on fully depleted stock
pub fn validate_threshold(threshold: i64) -> ValidationResult<()> {
    if threshold < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "threshold".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a complete new-product payload.
///
/// Runs every field rule; the first failure wins. Called by the ledger
/// before any write so malformed input never reaches storage.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_barcode(&input.barcode)?;
    validate_product_name(&input.name)?;
    validate_stock_count(input.quantity)?;
    validate_amount_cents("cost", input.cost_cents)?;
    validate_amount_cents("price", input.price_cents)?;
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use depot_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> NewProduct {
        NewProduct {
            barcode: "8850999001234".to_string(),
            name: "Coke 330ml".to_string(),
            category_id: None,
            stock_location_id: None,
            quantity: 10,
            cost_cents: 900,
            price_cents: 1500,
        }
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("8850999001234").is_ok());
        assert!(validate_barcode("SKU-001").is_ok());

        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("   ").is_err());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode(&"9".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Coca-Cola 330ml").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_sale_quantity() {
        assert!(validate_sale_quantity(1).is_ok());
        assert!(validate_sale_quantity(10_000).is_ok());
        assert!(validate_sale_quantity(MAX_MUTATION_QUANTITY).is_ok());

        assert!(validate_sale_quantity(0).is_err());
        assert!(validate_sale_quantity(-1).is_err());
        assert!(validate_sale_quantity(MAX_MUTATION_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_stock_count() {
        assert!(validate_stock_count(0).is_ok());
        assert!(validate_stock_count(500).is_ok());
        assert!(validate_stock_count(-1).is_err());
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("price", 0).is_ok());
        assert!(validate_amount_cents("price", 1099).is_ok());
        assert!(validate_amount_cents("cost", -100).is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(-5).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&sample_product()).is_ok());

        let mut bad = sample_product();
        bad.barcode = String::new();
        assert!(validate_new_product(&bad).is_err());

        let mut bad = sample_product();
        bad.quantity = -1;
        assert!(validate_new_product(&bad).is_err());

        let mut bad = sample_product();
        bad.price_cents = -1;
        assert!(validate_new_product(&bad).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
