//! Order and cart lifecycle.

mod aggregate;
mod commands;
mod service;
mod status;
mod value_objects;

pub use aggregate::Order;
pub use commands::{AddItemToCart, AddressUpdate, DeliveryDetails, ShippingUpdate, UpdateQuantity};
pub use service::OrderService;
pub use status::OrderStatus;
pub use value_objects::{CartItem, Money, OrderNo};

use common::DocumentId;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Quantity added to a cart must be positive.
    #[error("Invalid quantity: {qty} (must be greater than 0)")]
    InvalidQuantity { qty: i64 },

    /// Quantity set on a cart line must not be negative.
    #[error("Invalid quantity: {qty} (must not be negative)")]
    NegativeQuantity { qty: i64 },

    /// The product cannot be added because it is out of stock.
    #[error("Product {item_id} is out of stock")]
    ProductOutOfStock { item_id: DocumentId },

    /// Cart items can only change while the order is a cart.
    #[error("Order is not a cart (status {status})")]
    NotACart { status: OrderStatus },

    /// The cart has no line for the product.
    #[error("Item not found in order: {item_id}")]
    ItemNotFound { item_id: DocumentId },

    /// Checkout of a cart without items.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// Numeric status code outside 1..=5, or a target status that cannot be
    /// requested.
    #[error("Invalid order status: {code}")]
    InvalidStatus { code: i64 },

    /// The order is not in a status that allows the transition.
    #[error("Invalid status transition: cannot move from {from} to {to}")]
    InvalidStateTransition { from: OrderStatus, to: OrderStatus },

    /// Delivery details are frozen once the order has shipped.
    #[error("Delivery details cannot change once the order is {status}")]
    DeliveryLocked { status: OrderStatus },

    /// A money field was negative.
    #[error("Invalid {field}: {amount} (must not be negative)")]
    NegativeAmount { field: &'static str, amount: Money },

    /// A line total or order total does not fit in a money amount.
    #[error("Amount too large: order totals must fit in a 64-bit amount")]
    AmountOverflow,

    /// A quantity larger than a cart line can hold.
    #[error("Invalid quantity: {qty} (must not exceed {max})", max = u32::MAX)]
    QuantityTooLarge { qty: i64 },

    /// Every generated order number collided with an existing one.
    #[error("Could not generate a unique order number after {attempts} attempts")]
    OrderNumberExhausted { attempts: usize },
}
