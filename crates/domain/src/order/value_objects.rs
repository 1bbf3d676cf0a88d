//! Value objects for the order domain.

use common::DocumentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderError;
use crate::catalog::Product;

/// Money amount in the currency's smallest unit.
///
/// Serialized as a plain integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new amount from minor units.
    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn amount(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, or `None` on overflow.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Subtracts `rhs`, or `None` on overflow.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Multiplies by a quantity, or `None` on overflow.
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

/// Human-facing order number, unique across all orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNo(String);

impl OrderNo {
    /// Prefix of every generated order number.
    pub const PREFIX: &'static str = "ORD-";

    /// Wraps an existing order number.
    pub fn new(order_no: impl Into<String>) -> Self {
        Self(order_no.into())
    }

    /// Generates a fresh order number: `ORD-` followed by 12 uppercase hex
    /// digits taken from a random UUID.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", Self::PREFIX, hex[..12].to_uppercase()))
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderNo {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OrderNo {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One line of a cart.
///
/// Name, image, price and cost are copied from the product when the line is
/// created; later product edits do not touch existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line identifier.
    pub id: DocumentId,

    /// The product this line refers to.
    #[serde(alias = "itemId")]
    pub item_id: DocumentId,

    /// Product name at the time the line was created.
    pub name: String,

    /// First product image at the time the line was created.
    #[serde(default)]
    pub image: Option<String>,

    /// Quantity ordered.
    pub qty: u32,

    /// Unit price snapshot.
    pub price: Money,

    /// Unit cost snapshot.
    #[serde(default)]
    pub cost: Money,

    /// `qty * price`.
    pub total: Money,
}

impl CartItem {
    /// Creates a line from explicit values.
    pub fn new(
        item_id: DocumentId,
        name: impl Into<String>,
        image: Option<String>,
        qty: u32,
        price: Money,
        cost: Money,
    ) -> Result<Self, OrderError> {
        Ok(Self {
            id: DocumentId::new(),
            item_id,
            name: name.into(),
            image,
            qty,
            price,
            cost,
            total: line_total(price, qty)?,
        })
    }

    /// Creates a line snapshotting a product.
    pub fn from_product(product: &Product, qty: u32) -> Result<Self, OrderError> {
        Self::new(
            product.id,
            product.name.clone(),
            product.images.first().cloned(),
            qty,
            product.price,
            product.cost,
        )
    }

    /// Sets the quantity and recomputes the line total. The line is left
    /// unchanged if the total does not fit.
    pub fn set_qty(&mut self, qty: u32) -> Result<(), OrderError> {
        self.total = line_total(self.price, qty)?;
        self.qty = qty;
        Ok(())
    }
}

fn line_total(price: Money, qty: u32) -> Result<Money, OrderError> {
    price.checked_mul(qty).ok_or(OrderError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_arithmetic() {
        let a = Money::new(1000);
        let b = Money::new(250);

        assert_eq!(a.checked_add(b), Some(Money::new(1250)));
        assert_eq!(a.checked_sub(b), Some(Money::new(750)));
        assert_eq!(b.checked_mul(3), Some(Money::new(750)));
        assert!(Money::new(-1).is_negative());
    }

    #[test]
    fn money_overflow_is_detected() {
        let huge = Money::new(i64::MAX / 2 + 1);
        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(Money::new(i64::MIN).checked_sub(Money::new(1)), None);
    }

    #[test]
    fn money_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Money::new(42)).unwrap(), "42");
        let money: Money = serde_json::from_str("17").unwrap();
        assert_eq!(money, Money::new(17));
    }

    #[test]
    fn generated_order_numbers_have_expected_shape() {
        let order_no = OrderNo::generate();
        let digits = order_no.as_str().strip_prefix("ORD-").unwrap();

        assert_eq!(digits.len(), 12);
        assert!(
            digits
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[test]
    fn generated_order_numbers_differ() {
        assert_ne!(OrderNo::generate(), OrderNo::generate());
    }

    #[test]
    fn cart_item_total_follows_quantity() {
        let mut item = CartItem::new(
            DocumentId::new(),
            "Widget",
            None,
            2,
            Money::new(10),
            Money::new(6),
        )
        .unwrap();
        assert_eq!(item.total, Money::new(20));

        item.set_qty(5).unwrap();
        assert_eq!(item.total, Money::new(50));
    }

    #[test]
    fn cart_item_rejects_overflowing_total() {
        let price = Money::new(4_611_686_018_427_387_904);
        assert!(matches!(
            CartItem::new(DocumentId::new(), "Widget", None, 2, price, Money::zero()),
            Err(OrderError::AmountOverflow)
        ));

        let mut item =
            CartItem::new(DocumentId::new(), "Widget", None, 1, price, Money::zero()).unwrap();
        assert!(matches!(item.set_qty(3), Err(OrderError::AmountOverflow)));
        assert_eq!(item.qty, 1);
        assert_eq!(item.total, price);
    }
}
