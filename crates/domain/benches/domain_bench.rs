use chrono::Utc;
use common::{CustomerId, Money, OrderId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Address, Order, OrderItem, OrderStatus};

fn sample_order() -> Order {
    let address = Address::new("1 Main St", "Springfield", "IL", "62701", "US");
    let item =
        OrderItem::new("P-1", None, "SKU-001", "Widget", 2, Money::from_cents(1500)).unwrap();
    Order::new(
        OrderId::new(),
        "ORD-BENCH",
        CustomerId::new(),
        vec![item],
        Money::from_cents(3000),
        address.clone(),
        address,
        Utc::now(),
    )
    .unwrap()
}

fn bench_full_lifecycle(c: &mut Criterion) {
    c.bench_function("domain/full_lifecycle", |b| {
        b.iter(|| {
            let mut order = sample_order();
            for target in [
                OrderStatus::Paid,
                OrderStatus::Preparing,
                OrderStatus::ReadyToShip,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
            ] {
                order.transition(target, Utc::now()).unwrap();
            }
            order
        });
    });
}

fn bench_validate_transition(c: &mut Criterion) {
    let order = sample_order();

    c.bench_function("domain/validate_transition", |b| {
        b.iter(|| order.validate_transition(OrderStatus::Paid));
    });
}

criterion_group!(benches, bench_full_lifecycle, bench_validate_transition);
criterion_main!(benches);
