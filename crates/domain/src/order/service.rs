//! Order service driving the cart and order lifecycle.

use std::cmp::Ordering;

use chrono::Utc;
use common::DocumentId;
use document_store::{DocumentStore, StoreError};
use futures_util::TryStreamExt;

use crate::catalog::Product;
use crate::city::City;
use crate::document::Document;
use crate::error::DomainError;
use crate::repository::Repository;

use super::{
    AddItemToCart, AddressUpdate, CartItem, DeliveryDetails, Order, OrderError, OrderNo,
    OrderStatus, ShippingUpdate, UpdateQuantity,
};

/// How many fresh order numbers are tried before giving up.
const ORDER_NO_ATTEMPTS: usize = 5;

/// Service for managing carts and orders.
///
/// Every mutation loads the order, applies the change to the in-memory
/// document and writes it back at the version it was read at. A racing
/// write surfaces as a concurrency conflict; nothing is retried.
pub struct OrderService<S: DocumentStore> {
    orders: Repository<S, Order>,
    products: Repository<S, Product>,
    cities: Repository<S, City>,
}

impl<S: DocumentStore + Clone> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            orders: Repository::new(store.clone()),
            products: Repository::new(store.clone()),
            cities: Repository::new(store),
        }
    }
}

impl<S: DocumentStore> OrderService<S> {
    /// Returns the order repository.
    pub fn orders(&self) -> &Repository<S, Order> {
        &self.orders
    }

    /// Loads an order by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: DocumentId) -> Result<Order, DomainError> {
        self.orders.load(id).await
    }

    /// Loads an order with its items by order number, whatever its status.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_cart(&self, order_no: &str) -> Result<Order, DomainError> {
        self.orders
            .find_by_unique_key(order_no)
            .await?
            .ok_or_else(|| DomainError::not_found(Order::collection(), order_no))
    }

    /// Adds a product to a cart.
    ///
    /// Opens a new cart with a fresh order number when `order_no` is absent
    /// or does not name an open cart.
    #[tracing::instrument(skip(self, cmd), fields(item_id = %cmd.item_id, qty = cmd.qty))]
    pub async fn add_item_to_cart(&self, cmd: AddItemToCart) -> Result<Order, DomainError> {
        if cmd.qty <= 0 {
            return Err(OrderError::InvalidQuantity { qty: cmd.qty }.into());
        }
        let qty =
            u32::try_from(cmd.qty).map_err(|_| OrderError::QuantityTooLarge { qty: cmd.qty })?;

        let product = self.products.load(cmd.item_id).await?;
        if !product.is_in_stock() {
            return Err(OrderError::ProductOutOfStock {
                item_id: cmd.item_id,
            }
            .into());
        }
        let item = CartItem::from_product(&product, qty)?;

        let open_cart = match cmd.order_no.as_deref() {
            Some(order_no) => self
                .orders
                .find_by_unique_key(order_no)
                .await?
                .filter(|order| order.status() == OrderStatus::Pending),
            None => None,
        };

        let order = match open_cart {
            Some(mut order) => {
                order.add_item(item)?;
                self.orders.save(&mut order).await?;
                order
            }
            None => {
                let mut order = Order::new_cart(OrderNo::generate(), cmd.customer);
                order.add_item(item)?;
                let order = self.insert_with_fresh_number(order).await?;
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(order_no = ?order.order_no(), "opened new cart");
                order
            }
        };

        metrics::counter!("cart_items_added_total").increment(1);
        Ok(order)
    }

    /// Sets the quantity of a cart line; zero removes it.
    #[tracing::instrument(skip(self, cmd), fields(item_id = %cmd.item_id, qty = cmd.qty))]
    pub async fn update_qty_of_items(
        &self,
        order_no: &str,
        cmd: UpdateQuantity,
    ) -> Result<Order, DomainError> {
        let mut order = self.get_user_cart(order_no).await?;
        order.set_item_qty(cmd.item_id, cmd.qty)?;
        self.orders.save(&mut order).await?;
        Ok(order)
    }

    /// Removes the line for a product from a cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item_from_cart(
        &self,
        order_id: DocumentId,
        item_id: DocumentId,
    ) -> Result<Order, DomainError> {
        self.orders
            .update(order_id, |order| order.remove_item(item_id).map(|_| ()))
            .await
    }

    /// Patches the delivery fields of an order found by number.
    #[tracing::instrument(skip(self, details))]
    pub async fn add_details_to_order(
        &self,
        order_no: &str,
        details: DeliveryDetails,
    ) -> Result<Order, DomainError> {
        let mut order = self.get_user_cart(order_no).await?;
        order.apply_details(details)?;
        self.orders.save(&mut order).await?;
        Ok(order)
    }

    /// Sets the delivery address of an order.
    #[tracing::instrument(skip(self, update))]
    pub async fn add_address_to_order(
        &self,
        id: DocumentId,
        update: AddressUpdate,
    ) -> Result<Order, DomainError> {
        self.orders
            .update(id, |order| order.set_address(update))
            .await
    }

    /// Sets the shipping method of an order.
    ///
    /// A referenced city supplies both the city name and the shipping fee.
    #[tracing::instrument(skip(self, update))]
    pub async fn add_shipping_to_order(
        &self,
        id: DocumentId,
        update: ShippingUpdate,
    ) -> Result<Order, DomainError> {
        let (city, fee) = match update.city_id {
            Some(city_id) => {
                let city = self.cities.load(city_id).await?;
                (Some(city.name), Some(city.shipping_fee))
            }
            None => (None, update.shipping_fee),
        };

        self.orders
            .update(id, |order| order.set_shipping(update.shipping, city, fee))
            .await
    }

    /// Checks a cart out (status 1 to 2).
    #[tracing::instrument(skip(self))]
    pub async fn update_status_to_placed(&self, id: DocumentId) -> Result<Order, DomainError> {
        let order = self
            .orders
            .update(id, |order| order.checkout(Utc::now()))
            .await?;

        metrics::counter!("orders_checked_out_total").increment(1);
        tracing::info!(order_no = ?order.order_no(), total = %order.total(), "order placed");
        Ok(order)
    }

    /// Moves an order to the status with the given code.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(&self, id: DocumentId, code: i64) -> Result<Order, DomainError> {
        let target = OrderStatus::from_code(code)
            .filter(|status| *status != OrderStatus::Pending)
            .ok_or(OrderError::InvalidStatus { code })?;

        let order = self
            .orders
            .update(id, |order| order.transition_to(target, Utc::now()))
            .await?;

        metrics::counter!("order_status_changes_total", "status" => target.as_str()).increment(1);
        Ok(order)
    }

    /// Lists all orders, newest first.
    ///
    /// Orders are ordered by order date; orders without one come last,
    /// newest created first.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_orders(&self) -> Result<Vec<Order>, DomainError> {
        let mut orders = self.orders.list().await?;
        orders.sort_by(newest_first);
        Ok(orders)
    }

    /// Lists the orders of a customer.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_customer(&self, customer: &str) -> Result<Vec<Order>, DomainError> {
        let mut orders = self
            .orders
            .find(self.orders.query().field_eq("customer", customer))
            .await?;
        orders.sort_by(newest_first);
        Ok(orders)
    }

    /// Deletes an order together with its items.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: DocumentId) -> Result<Order, DomainError> {
        let order = self.orders.take(id).await?;
        tracing::info!(order_no = ?order.order_no(), "order deleted");
        Ok(order)
    }

    /// Assigns an order number to every order lacking one.
    ///
    /// Idempotent; returns the number of orders updated. Concurrent sweeps
    /// cannot assign two numbers to one order because every write expects
    /// the version the order was read at.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_order_numbers(&self) -> Result<u64, DomainError> {
        let mut stream = self.orders.stream().await?;
        let mut updated = 0;

        while let Some(envelope) = stream.try_next().await? {
            if envelope.unique_key.is_some() {
                continue;
            }
            let order = Repository::<S, Order>::decode(&envelope)?;
            if order.order_no().is_some() {
                continue;
            }
            if self.assign_order_no(order).await? {
                updated += 1;
            }
        }

        metrics::counter!("order_numbers_assigned_total").increment(updated);
        tracing::info!(updated, "order number sweep finished");
        Ok(updated)
    }

    /// Gives `order` a fresh number. Returns false if the order was numbered
    /// or deleted concurrently.
    async fn assign_order_no(&self, mut order: Order) -> Result<bool, DomainError> {
        for attempt in 1..=ORDER_NO_ATTEMPTS {
            order.renumber(OrderNo::generate());
            match self.orders.save(&mut order).await {
                Ok(()) => return Ok(true),
                Err(DomainError::Store(StoreError::UniqueViolation { .. })) => {
                    tracing::warn!(attempt, "order number collision, regenerating");
                }
                Err(e) if e.is_concurrency_conflict() => {
                    // Someone else wrote the order; start over from its current state.
                    match self.orders.get(order.id()).await? {
                        Some(current) if current.order_no().is_none() => order = current,
                        _ => return Ok(false),
                    }
                }
                Err(DomainError::Store(StoreError::NotFound { .. })) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
        Err(OrderError::OrderNumberExhausted {
            attempts: ORDER_NO_ATTEMPTS,
        }
        .into())
    }

    /// Inserts a new order, regenerating its number on collision.
    async fn insert_with_fresh_number(&self, mut order: Order) -> Result<Order, DomainError> {
        for attempt in 1..=ORDER_NO_ATTEMPTS {
            match self.orders.insert(order.clone()).await {
                Ok(order) => return Ok(order),
                Err(DomainError::Store(StoreError::UniqueViolation { .. })) => {
                    tracing::warn!(attempt, "order number collision, regenerating");
                    order.renumber(OrderNo::generate());
                }
                Err(e) => return Err(e),
            }
        }
        Err(OrderError::OrderNumberExhausted {
            attempts: ORDER_NO_ATTEMPTS,
        }
        .into())
    }
}

fn newest_first(a: &Order, b: &Order) -> Ordering {
    match (a.order_date(), b.order_date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at().cmp(&a.created_at()),
    }
}
