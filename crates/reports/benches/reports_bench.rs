use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use document_store::InMemoryDocumentStore;
use domain::{AddItemToCart, CatalogService, Document, Money, NewProduct, OrderService};
use reports::{DateRange, SalesReport};

/// Builds a store with `orders` delivered orders spread over ten products.
fn populated(orders: usize) -> (tokio::runtime::Runtime, SalesReport<InMemoryDocumentStore>) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDocumentStore::new();
    let catalog = CatalogService::new(store.clone());
    let service = OrderService::new(store.clone());

    rt.block_on(async {
        let mut products = Vec::new();
        for n in 0..10 {
            let product = catalog
                .create_product(NewProduct {
                    name: format!("Product {n}"),
                    cat_id: None,
                    desc: "Bench".to_string(),
                    images: vec![format!("https://img/{n}.png")],
                    video: None,
                    cost: Money::new(100),
                    price: Money::new(250),
                    qty: 1_000,
                    colors: vec![],
                })
                .await
                .unwrap();
            products.push(product.id);
        }

        for i in 0..orders {
            let item_id = products[i % products.len()];
            let id = service
                .add_item_to_cart(AddItemToCart::new(item_id, (i % 5 + 1) as i64))
                .await
                .unwrap()
                .id();
            service.update_status_to_placed(id).await.unwrap();
            service.update_order_status(id, 3).await.unwrap();
            service.update_order_status(id, 4).await.unwrap();
        }
    });

    (rt, SalesReport::new(store))
}

fn bench_all_time(c: &mut Criterion) {
    let (rt, report) = populated(1_000);

    c.bench_function("reports/top_selling_1000_orders", |b| {
        b.iter(|| rt.block_on(async { report.top_selling().await.unwrap() }));
    });
}

fn bench_date_range(c: &mut Criterion) {
    let (rt, report) = populated(1_000);
    let now = Utc::now().timestamp_millis();
    let range = DateRange::new(now - 3_600_000, now + 3_600_000).unwrap();

    c.bench_function("reports/top_selling_between_1000_orders", |b| {
        b.iter(|| rt.block_on(async { report.top_selling_between(range).await.unwrap() }));
    });
}

criterion_group!(benches, bench_all_time, bench_date_range);
criterion_main!(benches);
