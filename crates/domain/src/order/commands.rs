//! Request payloads for order operations.

use common::DocumentId;
use serde::Deserialize;

use super::Money;

/// Adds a product to a cart, opening a new cart when needed.
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemToCart {
    /// Existing cart to add to. A new cart is opened when absent or unknown.
    #[serde(default, alias = "orderNo")]
    pub order_no: Option<String>,

    /// Product to add.
    #[serde(alias = "itemId")]
    pub item_id: DocumentId,

    /// Quantity to add.
    pub qty: i64,

    /// Customer reference stored on a newly opened cart.
    #[serde(default)]
    pub customer: Option<String>,
}

impl AddItemToCart {
    /// Creates a request that opens a new cart.
    pub fn new(item_id: DocumentId, qty: i64) -> Self {
        Self {
            order_no: None,
            item_id,
            qty,
            customer: None,
        }
    }

    /// Targets an existing cart.
    pub fn to_cart(mut self, order_no: impl Into<String>) -> Self {
        self.order_no = Some(order_no.into());
        self
    }

    /// Sets the customer reference.
    pub fn for_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }
}

/// Sets the quantity of one cart line. Zero removes the line.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuantity {
    #[serde(alias = "itemId")]
    pub item_id: DocumentId,
    pub qty: i64,
}

/// Patch of the delivery fields of an order. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryDetails {
    pub customer: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact_no: Option<String>,
    pub shipping: Option<String>,
    pub shipping_fee: Option<Money>,
    pub discount: Option<Money>,
}

/// New delivery address of an order.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressUpdate {
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub contact_no: Option<String>,
}

/// Shipping method of an order.
///
/// When `city_id` names a city, its name and shipping fee are copied onto
/// the order and `shipping_fee` is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingUpdate {
    pub shipping: String,
    #[serde(default, alias = "cityId")]
    pub city_id: Option<DocumentId>,
    #[serde(default)]
    pub shipping_fee: Option<Money>,
}
