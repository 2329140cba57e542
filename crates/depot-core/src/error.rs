//! # Error Types
//!
//! Domain-specific error types for depot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  depot-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  depot-db errors (separate crate)                                      │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ← DbError (translated at services)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (name, id, counts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist in the store
    /// - Transaction ID doesn't exist
    /// - Product was deleted between lookup and mutation
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Insufficient stock to complete the requested mutation.
    ///
    /// ## When This Occurs
    /// - `sell` requests more than the available quantity
    /// - `adjust_quantity` with a delta that would drive the count negative
    ///
    /// ## User Workflow
    /// ```text
    /// sell(product, qty: 5)
    ///      │
    ///      ▼
    /// Conditional decrement fails: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Coke 330ml", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Coke 330ml in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Unique key collision (e.g., duplicate barcode).
    #[error("Duplicate {field}: '{value}' already exists")]
    DuplicateKey { field: String, value: String },

    /// Writing would push a storage location over its declared capacity.
    ///
    /// ## When This Occurs
    /// - `edit` raises a product quantity beyond what its assigned
    ///   location can hold (capacity minus the other products' stock)
    #[error("Location {location} over capacity: capacity {capacity}, attempted {attempted}")]
    CapacityExceeded {
        location: String,
        capacity: i64,
        attempted: i64,
    },

    /// No valid authenticated principal was supplied.
    ///
    /// The authentication collaborator hands us `{user_id, role_name}`;
    /// a role name that does not resolve fails closed to this variant.
    #[error("Unauthorized: no valid principal")]
    Unauthorized,

    /// Principal is authenticated but lacks the required permission key.
    #[error("Forbidden: missing permission '{permission}'")]
    Forbidden { permission: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Underlying storage failed, possibly after a prior step succeeded.
    ///
    /// Surfaced, never swallowed: a ledger write that fails mid-unit rolls
    /// back and reports through this variant.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a DuplicateKey error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::DuplicateKey {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a Forbidden error for a missing permission key.
    pub fn forbidden(permission: impl Into<String>) -> Self {
        CoreError::Forbidden {
            permission: permission.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs - every
/// ValidationError is rejected before any write.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed phone).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Coke 330ml".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Coke 330ml: available 3, requested 5"
        );

        let err = CoreError::duplicate("barcode", "8850999001234");
        assert_eq!(
            err.to_string(),
            "Duplicate barcode: '8850999001234' already exists"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");

        let err = ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_forbidden_carries_permission_key() {
        let err = CoreError::forbidden("products:delete");
        assert_eq!(
            err.to_string(),
            "Forbidden: missing permission 'products:delete'"
        );
    }
}
