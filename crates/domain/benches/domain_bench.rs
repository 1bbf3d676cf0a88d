use common::DocumentId;
use criterion::{Criterion, criterion_group, criterion_main};
use document_store::InMemoryDocumentStore;
use domain::{
    AddItemToCart, CartItem, CatalogService, Document, Money, NewProduct, Order, OrderNo,
    OrderService,
};

fn setup() -> (
    tokio::runtime::Runtime,
    OrderService<InMemoryDocumentStore>,
    DocumentId,
) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDocumentStore::new();
    let catalog = CatalogService::new(store.clone());
    let product_id = rt.block_on(async {
        catalog
            .create_product(NewProduct {
                name: "Benchmark Widget".to_string(),
                cat_id: None,
                desc: "Widget".to_string(),
                images: vec!["https://img/widget.png".to_string()],
                video: None,
                cost: Money::new(500),
                price: Money::new(1000),
                qty: 1_000,
                colors: vec![],
            })
            .await
            .unwrap()
            .id
    });
    (rt, OrderService::new(store), product_id)
}

fn bench_open_cart(c: &mut Criterion) {
    let (rt, service, product_id) = setup();

    c.bench_function("domain/open_cart", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .add_item_to_cart(AddItemToCart::new(product_id, 1))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_add_to_existing_cart(c: &mut Criterion) {
    let (rt, service, product_id) = setup();
    let order_no = rt.block_on(async {
        service
            .add_item_to_cart(AddItemToCart::new(product_id, 1))
            .await
            .unwrap()
            .order_no()
            .unwrap()
            .to_string()
    });

    c.bench_function("domain/add_to_existing_cart", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .add_item_to_cart(AddItemToCart::new(product_id, 1).to_cart(order_no.clone()))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_full_cart_cycle(c: &mut Criterion) {
    let (rt, service, product_id) = setup();

    c.bench_function("domain/add_checkout_ship_deliver", |b| {
        b.iter(|| {
            rt.block_on(async {
                let order = service
                    .add_item_to_cart(AddItemToCart::new(product_id, 2))
                    .await
                    .unwrap();
                service.update_status_to_placed(order.id()).await.unwrap();
                service.update_order_status(order.id(), 3).await.unwrap();
                service.update_order_status(order.id(), 4).await.unwrap();
            });
        });
    });
}

fn bench_merge_lines_in_memory(c: &mut Criterion) {
    let products: Vec<_> = (0..50).map(|_| DocumentId::new()).collect();

    c.bench_function("domain/merge_500_lines", |b| {
        b.iter(|| {
            let mut order = Order::new_cart(OrderNo::generate(), None);
            for n in 0..500 {
                let item = CartItem::new(
                    products[n % products.len()],
                    "Widget",
                    None,
                    1,
                    Money::new(1000),
                    Money::new(500),
                )
                .unwrap();
                order.add_item(item).unwrap();
            }
            order
        });
    });
}

criterion_group!(
    benches,
    bench_open_cart,
    bench_add_to_existing_cart,
    bench_full_cart_cycle,
    bench_merge_lines_in_memory
);
criterion_main!(benches);
