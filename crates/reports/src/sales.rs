//! Top-selling product reports.

use std::time::Instant;

use common::DocumentId;
use document_store::DocumentStore;
use domain::{Money, Order, OrderStatus, Product, Repository};
use futures_util::TryStreamExt;
use serde::Serialize;

use crate::range::DateRange;
use crate::tally::{SalesTally, Tally};
use crate::Result;

/// Number of products in the all-time ranking.
const ALL_TIME_LIMIT: usize = 5;

/// Number of products in the delivered-orders rankings.
const DELIVERED_LIMIT: usize = 10;

/// All-time ranking entry, built from cart line snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSellingItem {
    pub item_id: DocumentId,
    pub name: String,
    pub image: Option<String>,
    pub price: Money,
    pub qty: u64,
}

/// Delivered-sales ranking entry, joined with the current product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: DocumentId,
    pub product_name: String,
    pub product_description: String,
    pub product_images: Vec<String>,
    pub product_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<DocumentId>,
    pub total_quantity_sold: u64,
    pub total_revenue: Money,
    pub order_count: u64,
    pub average_order_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl ProductSales {
    fn new(tally: &Tally, product: &Product, date_range: Option<DateRange>) -> Self {
        let average_order_value = if tally.lines == 0 {
            0.0
        } else {
            tally.revenue.amount() as f64 / tally.lines as f64
        };
        Self {
            product_id: tally.item_id,
            product_name: product.name.clone(),
            product_description: product.desc.clone(),
            product_images: product.images.clone(),
            product_price: product.price,
            category_id: product.cat_id,
            total_quantity_sold: tally.qty,
            total_revenue: tally.revenue,
            order_count: tally.lines,
            average_order_value,
            date_range,
        }
    }
}

/// Sales reports computed from the stored orders.
pub struct SalesReport<S: DocumentStore> {
    orders: Repository<S, Order>,
    products: Repository<S, Product>,
}

impl<S: DocumentStore + Clone> SalesReport<S> {
    pub fn new(store: S) -> Self {
        Self {
            orders: Repository::new(store.clone()),
            products: Repository::new(store),
        }
    }
}

impl<S: DocumentStore> SalesReport<S> {
    /// Ranks products by quantity over the lines of every order, whatever
    /// its status. Returns the top five with the first line's snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn top_selling(&self) -> Result<Vec<TopSellingItem>> {
        let started = Instant::now();
        let mut tally = SalesTally::new();

        let mut stream = self.orders.stream().await?;
        while let Some(envelope) = stream.try_next().await? {
            let order = Repository::<S, Order>::decode(&envelope)?;
            for line in order.items() {
                tally.record(line)?;
            }
        }

        let items = tally
            .top(ALL_TIME_LIMIT)
            .into_iter()
            .map(|t| TopSellingItem {
                item_id: t.item_id,
                name: t.first_line.name,
                image: t.first_line.image,
                price: t.first_line.price,
                qty: t.qty,
            })
            .collect();

        record_duration("all_time", started);
        Ok(items)
    }

    /// Ranks products over delivered orders placed within `range`.
    ///
    /// The ten best sellers are picked first; those whose product no longer
    /// exists are then dropped.
    #[tracing::instrument(skip(self))]
    pub async fn top_selling_between(&self, range: DateRange) -> Result<Vec<ProductSales>> {
        let started = Instant::now();
        let mut tally = SalesTally::new();

        for order in self.delivered_orders().await? {
            if order.order_date().is_some_and(|at| range.contains(at)) {
                for line in order.items() {
                    tally.record(line)?;
                }
            }
        }

        let mut sales = Vec::new();
        for t in tally.top(DELIVERED_LIMIT) {
            match self.products.get(t.item_id).await? {
                Some(product) => sales.push(ProductSales::new(&t, &product, Some(range))),
                None => tracing::debug!(item_id = %t.item_id, "skipping deleted product"),
            }
        }

        record_duration("date_range", started);
        Ok(sales)
    }

    /// Ranks the products of a category over all delivered orders.
    #[tracing::instrument(skip(self))]
    pub async fn top_selling_in_category(&self, category_id: DocumentId) -> Result<Vec<ProductSales>> {
        let started = Instant::now();
        let products: std::collections::HashMap<_, _> = self
            .products
            .find(self.products.query().field_eq("cat_id", category_id.to_string()))
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut tally = SalesTally::new();
        for order in self.delivered_orders().await? {
            for line in order
                .items()
                .iter()
                .filter(|line| products.contains_key(&line.item_id))
            {
                tally.record(line)?;
            }
        }

        let sales = tally
            .top(DELIVERED_LIMIT)
            .iter()
            .filter_map(|t| {
                products
                    .get(&t.item_id)
                    .map(|product| ProductSales::new(t, product, None))
            })
            .collect();

        record_duration("category", started);
        Ok(sales)
    }

    async fn delivered_orders(&self) -> Result<Vec<Order>> {
        let query = self
            .orders
            .query()
            .field_eq("status", OrderStatus::Delivered.code());
        Ok(self.orders.find(query).await?)
    }
}

fn record_duration(report: &'static str, started: Instant) {
    metrics::histogram!("report_duration_seconds", "report" => report)
        .record(started.elapsed().as_secs_f64());
}
