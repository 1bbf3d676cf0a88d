//! Product catalog: categories, sub-categories and products.

mod category;
mod product;
mod service;

pub use category::{Category, NewSubCategory, SubCategory, SubCategoryUpdate, SubCategoryView};
pub use product::{NewProduct, Product, ProductStatus, ProductUpdate, ProductView};
pub use service::CatalogService;

use thiserror::Error;

use crate::order::Money;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required field was absent or blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// A category with the same name exists.
    #[error("Category with name '{name}' already exists")]
    DuplicateCategory { name: String },

    /// A sub-category with the same name exists in the category.
    #[error("SubCategory with name '{name}' already exists in this category")]
    DuplicateSubCategory { name: String },

    /// A money field was negative.
    #[error("Invalid {field}: {amount} (must not be negative)")]
    NegativeAmount { field: &'static str, amount: Money },

    /// Stock quantity was negative.
    #[error("Invalid quantity: {qty} (must not be negative)")]
    NegativeStock { qty: i64 },

    /// A product needs at least one image.
    #[error("At least one product image is required")]
    NoImages,

    /// Product status code outside {1, 2}.
    #[error("Invalid product status: {code}")]
    InvalidStatus { code: i64 },
}

fn required(field: &'static str, value: &str) -> Result<String, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CatalogError::MissingField { field })
    } else {
        Ok(value.to_string())
    }
}

fn not_negative(field: &'static str, amount: Money) -> Result<Money, CatalogError> {
    if amount.is_negative() {
        Err(CatalogError::NegativeAmount { field, amount })
    } else {
        Ok(amount)
    }
}
