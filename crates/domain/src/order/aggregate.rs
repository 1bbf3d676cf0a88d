//! Order document.

use chrono::{DateTime, Utc};
use common::DocumentId;
use document_store::Version;
use serde::{Deserialize, Serialize};

use crate::document::Document;

use super::{
    AddressUpdate, CartItem, DeliveryDetails, Money, OrderError, OrderNo, OrderStatus,
};

/// Order with its cart lines.
///
/// The lines are embedded, so an order and its items are written and
/// deleted together. The order number is the collection-unique key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: DocumentId,

    #[serde(default)]
    version: Version,

    /// Absent only on documents written before numbers were assigned.
    #[serde(default)]
    order_no: Option<OrderNo>,

    #[serde(default)]
    items: Vec<CartItem>,

    #[serde(default)]
    customer: Option<String>,

    #[serde(default)]
    address: Option<String>,

    #[serde(default)]
    city: Option<String>,

    #[serde(default)]
    contact_no: Option<String>,

    #[serde(default)]
    shipping: Option<String>,

    #[serde(default)]
    shipping_fee: Money,

    #[serde(default)]
    total: Money,

    #[serde(default)]
    discount: Money,

    #[serde(default)]
    status: OrderStatus,

    #[serde(default)]
    order_date: Option<DateTime<Utc>>,

    #[serde(default)]
    delivery_date: Option<DateTime<Utc>>,

    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl Document for Order {
    fn collection() -> &'static str {
        "orders"
    }

    fn id(&self) -> DocumentId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn unique_key(&self) -> Option<String> {
        self.order_no.as_ref().map(|no| no.as_str().to_string())
    }
}

// Query methods
impl Order {
    pub fn order_no(&self) -> Option<&OrderNo> {
        self.order_no.as_ref()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the line for a product.
    pub fn get_item(&self, item_id: DocumentId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn contact_no(&self) -> Option<&str> {
        self.contact_no.as_deref()
    }

    pub fn shipping(&self) -> Option<&str> {
        self.shipping.as_deref()
    }

    pub fn shipping_fee(&self) -> Money {
        self.shipping_fee
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn order_date(&self) -> Option<DateTime<Utc>> {
        self.order_date
    }

    pub fn delivery_date(&self) -> Option<DateTime<Utc>> {
        self.delivery_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of the line totals.
    pub fn subtotal(&self) -> Result<Money, OrderError> {
        subtotal_of(&self.items)
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

// Mutations. Each either applies completely or leaves the order untouched.
impl Order {
    /// Opens an empty cart.
    pub fn new_cart(order_no: OrderNo, customer: Option<String>) -> Self {
        Self {
            id: DocumentId::new(),
            version: Version::initial(),
            order_no: Some(order_no),
            items: Vec::new(),
            customer,
            address: None,
            city: None,
            contact_no: None,
            shipping: None,
            shipping_fee: Money::zero(),
            total: Money::zero(),
            discount: Money::zero(),
            status: OrderStatus::Pending,
            order_date: None,
            delivery_date: None,
            created_at: Utc::now(),
        }
    }

    /// Replaces the order number. Used while picking a collision-free number.
    pub(super) fn renumber(&mut self, order_no: OrderNo) {
        self.order_no = Some(order_no);
    }

    fn ensure_cart(&self) -> Result<(), OrderError> {
        if self.status.can_modify_items() {
            Ok(())
        } else {
            Err(OrderError::NotACart {
                status: self.status,
            })
        }
    }

    fn ensure_delivery_editable(&self) -> Result<(), OrderError> {
        if self.status.can_edit_delivery() {
            Ok(())
        } else {
            Err(OrderError::DeliveryLocked {
                status: self.status,
            })
        }
    }

    fn ensure_not_negative(field: &'static str, amount: Money) -> Result<(), OrderError> {
        if amount.is_negative() {
            Err(OrderError::NegativeAmount { field, amount })
        } else {
            Ok(())
        }
    }

    fn ensure_has_items(&self) -> Result<(), OrderError> {
        if self.has_items() {
            Ok(())
        } else {
            Err(OrderError::EmptyCart)
        }
    }

    /// Edits a copy of the lines and commits it with its new total, so a
    /// failed edit or an overflowing total leaves the order untouched.
    fn edit_lines(
        &mut self,
        edit: impl FnOnce(&mut Vec<CartItem>) -> Result<(), OrderError>,
    ) -> Result<(), OrderError> {
        let mut items = self.items.clone();
        edit(&mut items)?;
        let total = total_of(&items, self.shipping_fee, self.discount)?;
        self.items = items;
        self.total = total;
        Ok(())
    }

    /// Adds a line, merging it into an existing line for the same product.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), OrderError> {
        self.ensure_cart()?;
        if item.qty == 0 {
            return Err(OrderError::InvalidQuantity { qty: 0 });
        }

        self.edit_lines(|items| {
            match items.iter_mut().find(|i| i.item_id == item.item_id) {
                Some(existing) => {
                    let qty = existing.qty.checked_add(item.qty).ok_or(
                        OrderError::QuantityTooLarge {
                            qty: i64::from(existing.qty) + i64::from(item.qty),
                        },
                    )?;
                    existing.set_qty(qty)?;
                }
                None => items.push(item),
            }
            Ok(())
        })
    }

    /// Sets the quantity of a line. A quantity of zero removes the line.
    pub fn set_item_qty(&mut self, item_id: DocumentId, qty: i64) -> Result<(), OrderError> {
        if qty < 0 {
            return Err(OrderError::NegativeQuantity { qty });
        }
        let qty = u32::try_from(qty).map_err(|_| OrderError::QuantityTooLarge { qty })?;
        self.ensure_cart()?;

        self.edit_lines(|items| {
            let position = items
                .iter()
                .position(|item| item.item_id == item_id)
                .ok_or(OrderError::ItemNotFound { item_id })?;

            if qty == 0 {
                items.remove(position);
                Ok(())
            } else {
                items[position].set_qty(qty)
            }
        })
    }

    /// Removes the line for a product.
    pub fn remove_item(&mut self, item_id: DocumentId) -> Result<CartItem, OrderError> {
        self.ensure_cart()?;

        let mut removed = None;
        self.edit_lines(|items| {
            let position = items
                .iter()
                .position(|item| item.item_id == item_id)
                .ok_or(OrderError::ItemNotFound { item_id })?;
            removed = Some(items.remove(position));
            Ok(())
        })?;
        removed.ok_or(OrderError::ItemNotFound { item_id })
    }

    /// Applies a patch of delivery fields.
    pub fn apply_details(&mut self, details: DeliveryDetails) -> Result<(), OrderError> {
        self.ensure_delivery_editable()?;
        if let Some(fee) = details.shipping_fee {
            Self::ensure_not_negative("shipping fee", fee)?;
        }
        if let Some(discount) = details.discount {
            Self::ensure_not_negative("discount", discount)?;
        }
        let total = total_of(
            &self.items,
            details.shipping_fee.unwrap_or(self.shipping_fee),
            details.discount.unwrap_or(self.discount),
        )?;

        if details.customer.is_some() {
            self.customer = details.customer;
        }
        if details.address.is_some() {
            self.address = details.address;
        }
        if details.city.is_some() {
            self.city = details.city;
        }
        if details.contact_no.is_some() {
            self.contact_no = details.contact_no;
        }
        if details.shipping.is_some() {
            self.shipping = details.shipping;
        }
        if let Some(fee) = details.shipping_fee {
            self.shipping_fee = fee;
        }
        if let Some(discount) = details.discount {
            self.discount = discount;
        }
        self.total = total;
        Ok(())
    }

    /// Sets the delivery address.
    pub fn set_address(&mut self, update: AddressUpdate) -> Result<(), OrderError> {
        self.ensure_delivery_editable()?;
        self.address = Some(update.address);
        if update.city.is_some() {
            self.city = update.city;
        }
        if update.contact_no.is_some() {
            self.contact_no = update.contact_no;
        }
        Ok(())
    }

    /// Sets the shipping method, and optionally the destination city and fee.
    pub fn set_shipping(
        &mut self,
        shipping: String,
        city: Option<String>,
        fee: Option<Money>,
    ) -> Result<(), OrderError> {
        self.ensure_delivery_editable()?;
        let fee = match fee {
            Some(fee) => {
                Self::ensure_not_negative("shipping fee", fee)?;
                fee
            }
            None => self.shipping_fee,
        };
        let total = total_of(&self.items, fee, self.discount)?;

        self.shipping_fee = fee;
        self.total = total;
        self.shipping = Some(shipping);
        if city.is_some() {
            self.city = city;
        }
        Ok(())
    }

    /// Checks the cart out: Pending to Placed.
    pub fn checkout(&mut self, at: DateTime<Utc>) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::Placed,
            });
        }
        self.ensure_has_items()?;
        let total = total_of(&self.items, self.shipping_fee, self.discount)?;

        self.status = OrderStatus::Placed;
        self.order_date = Some(at);
        self.total = total;
        Ok(())
    }

    /// Moves the order to `target` along the status state machine.
    pub fn transition_to(&mut self, target: OrderStatus, at: DateTime<Utc>) -> Result<(), OrderError> {
        if target == OrderStatus::Pending {
            return Err(OrderError::InvalidStatus {
                code: target.code(),
            });
        }
        if !self.status.can_transition_to(target) {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: target,
            });
        }

        match target {
            OrderStatus::Placed => {
                self.ensure_has_items()?;
                self.total = total_of(&self.items, self.shipping_fee, self.discount)?;
                self.order_date = Some(at);
            }
            OrderStatus::Delivered => self.delivery_date = Some(at),
            _ => {}
        }
        self.status = target;
        Ok(())
    }
}

fn subtotal_of(items: &[CartItem]) -> Result<Money, OrderError> {
    items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.total))
        .ok_or(OrderError::AmountOverflow)
}

/// Subtotal plus shipping fee minus discount.
fn total_of(items: &[CartItem], shipping_fee: Money, discount: Money) -> Result<Money, OrderError> {
    subtotal_of(items)?
        .checked_add(shipping_fee)
        .and_then(|total| total.checked_sub(discount))
        .ok_or(OrderError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, qty: u32) -> CartItem {
        CartItem::new(
            DocumentId::new(),
            "Widget",
            None,
            qty,
            Money::new(price),
            Money::new(price / 2),
        )
        .unwrap()
    }

    fn cart() -> Order {
        Order::new_cart(OrderNo::generate(), None)
    }

    fn placed_order() -> Order {
        let mut order = cart();
        order.add_item(item(10, 1)).unwrap();
        order.checkout(Utc::now()).unwrap();
        order
    }

    #[test]
    fn new_cart_is_pending_and_empty() {
        let order = cart();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(!order.has_items());
        assert_eq!(order.total(), Money::zero());
        assert_eq!(order.unique_key(), order.order_no().map(|n| n.to_string()));
    }

    #[test]
    fn adding_same_product_merges_lines() {
        let mut order = cart();
        let first = item(10, 2);
        let mut again = first.clone();
        again.id = DocumentId::new();
        again.set_qty(3).unwrap();

        order.add_item(first.clone()).unwrap();
        order.add_item(again).unwrap();

        assert_eq!(order.items().len(), 1);
        let line = order.get_item(first.item_id).unwrap();
        assert_eq!(line.qty, 5);
        assert_eq!(line.total, Money::new(50));
        assert_eq!(order.total(), Money::new(50));
    }

    #[test]
    fn zero_quantity_removes_line() {
        let mut order = cart();
        let line = item(10, 2);
        order.add_item(line.clone()).unwrap();

        order.set_item_qty(line.item_id, 0).unwrap();
        assert!(order.get_item(line.item_id).is_none());
        assert_eq!(order.total(), Money::zero());
    }

    #[test]
    fn set_quantity_validates() {
        let mut order = cart();
        let line = item(10, 2);
        order.add_item(line.clone()).unwrap();

        assert!(matches!(
            order.set_item_qty(line.item_id, -1),
            Err(OrderError::NegativeQuantity { qty: -1 })
        ));
        assert!(matches!(
            order.set_item_qty(DocumentId::new(), 1),
            Err(OrderError::ItemNotFound { .. })
        ));

        order.set_item_qty(line.item_id, 4).unwrap();
        assert_eq!(order.get_item(line.item_id).unwrap().total, Money::new(40));
    }

    #[test]
    fn items_frozen_after_checkout() {
        let mut order = placed_order();
        let line = order.items()[0].clone();

        assert!(matches!(
            order.add_item(item(5, 1)),
            Err(OrderError::NotACart { .. })
        ));
        assert!(matches!(
            order.set_item_qty(line.item_id, 3),
            Err(OrderError::NotACart { .. })
        ));
        assert!(matches!(
            order.remove_item(line.item_id),
            Err(OrderError::NotACart { .. })
        ));
    }

    #[test]
    fn checkout_stamps_date_and_total() {
        let mut order = cart();
        order.add_item(item(10, 3)).unwrap();
        order
            .apply_details(DeliveryDetails {
                shipping_fee: Some(Money::new(5)),
                discount: Some(Money::new(2)),
                ..Default::default()
            })
            .unwrap();

        let at = Utc::now();
        order.checkout(at).unwrap();

        assert_eq!(order.status(), OrderStatus::Placed);
        assert_eq!(order.order_date(), Some(at));
        assert_eq!(order.total(), Money::new(33));
    }

    #[test]
    fn checkout_rejects_empty_cart() {
        let mut order = cart();
        assert!(matches!(
            order.checkout(Utc::now()),
            Err(OrderError::EmptyCart)
        ));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn second_checkout_is_invalid_transition() {
        let mut order = placed_order();
        let result = order.checkout(Utc::now());
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition {
                from: OrderStatus::Placed,
                to: OrderStatus::Placed
            })
        ));
        assert_eq!(order.status(), OrderStatus::Placed);
    }

    #[test]
    fn full_lifecycle_stamps_dates() {
        let mut order = placed_order();
        order.transition_to(OrderStatus::Shipped, Utc::now()).unwrap();
        assert!(order.delivery_date().is_none());

        order.transition_to(OrderStatus::Delivered, Utc::now()).unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.delivery_date().is_some());
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let mut order = placed_order();
        assert!(matches!(
            order.transition_to(OrderStatus::Delivered, Utc::now()),
            Err(OrderError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            order.transition_to(OrderStatus::Pending, Utc::now()),
            Err(OrderError::InvalidStatus { code: 1 })
        ));
        assert_eq!(order.status(), OrderStatus::Placed);
    }

    #[test]
    fn cancelled_order_cannot_check_out() {
        let mut order = placed_order();
        order.transition_to(OrderStatus::Cancelled, Utc::now()).unwrap();
        assert!(matches!(
            order.checkout(Utc::now()),
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn delivery_fields_lock_once_shipped() {
        let mut order = placed_order();
        order
            .set_address(AddressUpdate {
                address: "12 Main St".to_string(),
                city: Some("Lahore".to_string()),
                contact_no: None,
            })
            .unwrap();
        assert_eq!(order.address(), Some("12 Main St"));

        order.transition_to(OrderStatus::Shipped, Utc::now()).unwrap();
        assert!(matches!(
            order.set_shipping("express".to_string(), None, None),
            Err(OrderError::DeliveryLocked { .. })
        ));
    }

    #[test]
    fn negative_fees_are_rejected() {
        let mut order = cart();
        let result = order.apply_details(DeliveryDetails {
            discount: Some(Money::new(-1)),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(OrderError::NegativeAmount {
                field: "discount",
                ..
            })
        ));
        assert_eq!(order.discount(), Money::zero());
    }

    #[test]
    fn admin_cannot_place_empty_cart() {
        let mut order = cart();
        assert!(matches!(
            order.transition_to(OrderStatus::Placed, Utc::now()),
            Err(OrderError::EmptyCart)
        ));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.order_date().is_none());
    }

    #[test]
    fn overflowing_totals_leave_order_untouched() {
        let half = i64::MAX / 2 + 1;
        let mut order = cart();
        let line = item(half, 1);
        order.add_item(line.clone()).unwrap();

        assert!(matches!(
            order.add_item(item(half, 1)),
            Err(OrderError::AmountOverflow)
        ));
        assert!(matches!(
            order.set_item_qty(line.item_id, 2),
            Err(OrderError::AmountOverflow)
        ));
        assert!(matches!(
            order.set_shipping("courier".to_string(), None, Some(Money::new(half))),
            Err(OrderError::AmountOverflow)
        ));

        assert_eq!(order.items().len(), 1);
        assert_eq!(order.get_item(line.item_id).unwrap().qty, 1);
        assert_eq!(order.total(), Money::new(half));
        assert_eq!(order.shipping_fee(), Money::zero());
        assert!(order.shipping().is_none());
    }

    #[test]
    fn merged_quantity_out_of_range_is_rejected() {
        let mut order = cart();
        let line = item(0, u32::MAX);
        order.add_item(line.clone()).unwrap();

        let mut again = line.clone();
        again.set_qty(1).unwrap();
        assert!(matches!(
            order.add_item(again),
            Err(OrderError::QuantityTooLarge { .. })
        ));
        assert_eq!(order.get_item(line.item_id).unwrap().qty, u32::MAX);

        assert!(matches!(
            order.set_item_qty(line.item_id, i64::from(u32::MAX) + 1),
            Err(OrderError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn legacy_document_without_number_decodes() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": DocumentId::new(),
            "status": 2,
            "items": []
        }))
        .unwrap();

        assert!(order.order_no().is_none());
        assert!(order.unique_key().is_none());
        assert_eq!(order.status(), OrderStatus::Placed);
    }
}
