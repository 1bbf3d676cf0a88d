//! Integration tests: OrderService lifecycle → SalesReport rankings.

use chrono::Utc;
use common::DocumentId;
use document_store::InMemoryDocumentStore;
use domain::{AddItemToCart, CatalogService, Document, Money, NewProduct, OrderService};
use reports::{DateRange, SalesReport};

struct Shop {
    orders: OrderService<InMemoryDocumentStore>,
    catalog: CatalogService<InMemoryDocumentStore>,
    report: SalesReport<InMemoryDocumentStore>,
}

fn setup() -> Shop {
    let store = InMemoryDocumentStore::new();
    Shop {
        orders: OrderService::new(store.clone()),
        catalog: CatalogService::new(store.clone()),
        report: SalesReport::new(store),
    }
}

impl Shop {
    async fn product(&self, name: &str, price: i64, cat_id: Option<DocumentId>) -> DocumentId {
        self.catalog
            .create_product(NewProduct {
                name: name.to_string(),
                cat_id,
                desc: format!("{name} description"),
                images: vec![format!("https://img/{name}.png")],
                video: None,
                cost: Money::new(price / 2),
                price: Money::new(price),
                qty: 100,
                colors: vec![],
            })
            .await
            .unwrap()
            .id
    }

    /// Opens a cart with the given lines and returns its id.
    async fn cart(&self, lines: &[(DocumentId, i64)]) -> DocumentId {
        let (first, rest) = lines.split_first().unwrap();
        let order = self
            .orders
            .add_item_to_cart(AddItemToCart::new(first.0, first.1))
            .await
            .unwrap();
        let order_no = order.order_no().unwrap().to_string();
        for (item_id, qty) in rest {
            self.orders
                .add_item_to_cart(AddItemToCart::new(*item_id, *qty).to_cart(order_no.clone()))
                .await
                .unwrap();
        }
        order.id()
    }

    async fn delivered(&self, lines: &[(DocumentId, i64)]) -> DocumentId {
        let id = self.cart(lines).await;
        self.orders.update_status_to_placed(id).await.unwrap();
        self.orders.update_order_status(id, 3).await.unwrap();
        self.orders.update_order_status(id, 4).await.unwrap();
        id
    }
}

fn around_now() -> DateRange {
    let now = Utc::now().timestamp_millis();
    DateRange::new(now - 60_000, now + 60_000).unwrap()
}

#[tokio::test]
async fn all_time_ranking_counts_every_order() {
    let shop = setup();
    let a = shop.product("a", 10, None).await;
    let b = shop.product("b", 20, None).await;

    shop.cart(&[(a, 1), (b, 4)]).await;
    shop.delivered(&[(a, 2)]).await;

    let top = shop.report.top_selling().await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].item_id, b);
    assert_eq!(top[0].qty, 4);
    assert_eq!(top[1].item_id, a);
    assert_eq!(top[1].qty, 3);
    assert_eq!(top[1].name, "a");
    assert_eq!(top[1].price, Money::new(10));
}

#[tokio::test]
async fn all_time_ranking_keeps_top_five() {
    let shop = setup();
    let mut lines = Vec::new();
    for n in 0..7 {
        let id = shop.product(&format!("p{n}"), 10, None).await;
        lines.push((id, n + 1));
    }
    shop.cart(&lines).await;

    let top = shop.report.top_selling().await.unwrap();
    assert_eq!(top.len(), 5);
    assert_eq!(top[0].qty, 7);
    assert_eq!(top[4].qty, 3);
}

#[tokio::test]
async fn date_range_counts_only_delivered_orders() {
    let shop = setup();
    let a = shop.product("a", 10, None).await;
    let b = shop.product("b", 25, None).await;

    shop.delivered(&[(a, 2), (b, 1)]).await;
    shop.delivered(&[(a, 4)]).await;
    shop.cart(&[(b, 50)]).await;
    let placed = shop.cart(&[(b, 50)]).await;
    shop.orders.update_status_to_placed(placed).await.unwrap();

    let sales = shop.report.top_selling_between(around_now()).await.unwrap();
    assert_eq!(sales.len(), 2);

    let first = &sales[0];
    assert_eq!(first.product_id, a);
    assert_eq!(first.total_quantity_sold, 6);
    assert_eq!(first.total_revenue, Money::new(60));
    assert_eq!(first.order_count, 2);
    assert_eq!(first.average_order_value, 30.0);
    assert_eq!(first.product_name, "a");
    assert!(first.date_range.is_some());

    assert_eq!(sales[1].product_id, b);
    assert_eq!(sales[1].total_quantity_sold, 1);
}

#[tokio::test]
async fn date_range_outside_window_is_empty() {
    let shop = setup();
    let a = shop.product("a", 10, None).await;
    shop.delivered(&[(a, 2)]).await;

    let long_ago = DateRange::new(0, 1_000).unwrap();
    let sales = shop.report.top_selling_between(long_ago).await.unwrap();
    assert!(sales.is_empty());
}

#[tokio::test]
async fn deleted_products_drop_out_of_range_report() {
    let shop = setup();
    let a = shop.product("a", 10, None).await;
    let b = shop.product("b", 10, None).await;
    shop.delivered(&[(a, 5), (b, 1)]).await;

    shop.catalog.delete_product(a).await.unwrap();

    let sales = shop.report.top_selling_between(around_now()).await.unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].product_id, b);
}

#[tokio::test]
async fn category_report_filters_products() {
    let shop = setup();
    let lighting = shop.catalog.create_category("Lighting").await.unwrap();
    let garden = shop.catalog.create_category("Garden").await.unwrap();
    let lamp = shop.product("lamp", 30, Some(lighting.id)).await;
    let bulb = shop.product("bulb", 5, Some(lighting.id)).await;
    let hose = shop.product("hose", 40, Some(garden.id)).await;

    shop.delivered(&[(lamp, 1), (bulb, 6), (hose, 9)]).await;
    shop.cart(&[(lamp, 20)]).await;

    let sales = shop.report.top_selling_in_category(lighting.id).await.unwrap();
    let ranked: Vec<_> = sales.iter().map(|s| (s.product_id, s.total_quantity_sold)).collect();
    assert_eq!(ranked, vec![(bulb, 6), (lamp, 1)]);
    assert!(sales.iter().all(|s| s.category_id == Some(lighting.id)));
    assert!(sales.iter().all(|s| s.date_range.is_none()));
}
