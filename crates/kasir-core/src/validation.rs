//! # Validation Module
//!
//! Input validation for Kasir POS. Every check here runs before the
//! datastore is touched.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP binding (axum Json extractor)                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Malformed body → 400                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required names, length limits                                     │
//! │  ├── price >= 0, stock >= 0, quantity > 0                              │
//! │  └── Non-empty checkout                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0)                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::validation::{validate_product_name, validate_quantity};
//!
//! validate_product_name("Kopi Susu").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Category, CheckoutItem, NewCategory, NewProduct, Product};
use crate::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a category name.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

/// Validates a product name.
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Indomie Goreng").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

/// Validates a free-text description. Empty is allowed.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use kasir_core::money::Money;
/// use kasir_core::validation::validate_price;
///
/// assert!(validate_price(Money::new(3500)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::new(-1)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level. Stock may be zero, never negative.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a checkout quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /checkout { items: [{ product_id: 1, quantity: 0 }] }            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(0) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive" (400)         │
/// │       │                                                                 │
/// │       └── OK → checkout unit of work opens                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

pub fn validate_new_category(input: &NewCategory) -> ValidationResult<()> {
    validate_category_name(&input.name)?;
    validate_description(input.description.as_deref().unwrap_or_default())
}

/// Validates a category after a patch has been merged onto it.
pub fn validate_category(category: &Category) -> ValidationResult<()> {
    validate_category_name(&category.name)?;
    validate_description(&category.description)
}

pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_description(input.description.as_deref().unwrap_or_default())?;
    validate_price(input.price)?;
    validate_stock(input.stock)
}

/// Validates a product after a patch has been merged onto it.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_description(&product.description)?;
    validate_price(product.price)?;
    validate_stock(product.stock)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a checkout cart.
///
/// ## Rules
/// - At least one item
/// - Every quantity positive
///
/// Repeated product ids are allowed; each line decrements stock on its own.
pub fn validate_checkout_items(items: &[CheckoutItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    items
        .iter()
        .try_for_each(|item| validate_quantity(item.quantity))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_names() {
        assert!(validate_category_name("Minuman").is_ok());
        assert!(validate_product_name("Kopi Susu").is_ok());

        assert_eq!(
            validate_category_name("  "),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
        assert!(validate_product_name(&"A".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_product_name(&"A".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"x".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::new(-100)).is_err());

        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());

        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let input = NewProduct {
            name: "Teh Botol".to_string(),
            description: None,
            price: Money::new(5000),
            stock: 24,
            category_id: 1,
        };
        assert!(validate_new_product(&input).is_ok());

        let negative_stock = NewProduct {
            stock: -1,
            ..input.clone()
        };
        assert_eq!(
            validate_new_product(&negative_stock),
            Err(ValidationError::Negative {
                field: "stock".to_string()
            })
        );
    }

    #[test]
    fn test_validate_checkout_items() {
        assert!(validate_checkout_items(&[]).is_err());
        assert!(validate_checkout_items(&[CheckoutItem::new(1, 2)]).is_ok());
        assert!(validate_checkout_items(&[CheckoutItem::new(1, 2), CheckoutItem::new(2, 0)]).is_err());
    }
}
