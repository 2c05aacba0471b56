use catalog_event_bus::{EventBus, EventBusError, EventReceiverExt};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
struct StockChanged(pub usize);

#[derive(Clone, Debug, PartialEq, Eq)]
struct PriceChanged(pub usize);

#[tokio::test]
async fn published_event_reaches_subscriber() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<StockChanged>().unwrap();

    assert_eq!(bus.publish(StockChanged(42)).unwrap(), 1);

    let received = rx.recv_lossy().await.unwrap();
    assert_eq!(*received, StockChanged(42));
}

#[tokio::test]
async fn publish_without_subscribers_is_not_an_error() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(StockChanged(1)).unwrap(), 0);
    assert_eq!(bus.subscriber_count::<StockChanged>(), 0);
}

#[tokio::test]
async fn lagged_receiver_recovers_at_buffer_tail() {
    let bus = EventBus::new();
    let capacity = 2;
    let mut rx = bus.subscribe_with_capacity::<StockChanged>(capacity).unwrap();

    let total = 100;
    for i in 0..total {
        bus.publish(StockChanged(i)).unwrap();
    }

    let first = rx.recv_lossy().await.unwrap();
    assert!(first.0 >= total - capacity, "expected the tail of the buffer, got {}", first.0);

    let second = rx.recv_lossy().await.unwrap();
    assert_eq!(second.0, first.0 + 1);
}

#[tokio::test]
async fn every_subscriber_gets_a_copy() {
    let bus = EventBus::new();
    let mut rx1 = bus.subscribe::<StockChanged>().unwrap();
    let mut rx2 = bus.clone().subscribe::<StockChanged>().unwrap();
    assert_eq!(bus.subscriber_count::<StockChanged>(), 2);

    bus.publish(StockChanged(100)).unwrap();

    assert_eq!(rx1.recv_lossy().await.unwrap().0, 100);
    assert_eq!(rx2.recv_lossy().await.unwrap().0, 100);
}

#[tokio::test]
async fn event_types_are_isolated() {
    let bus = EventBus::new();
    let mut stock = bus.subscribe::<StockChanged>().unwrap();
    let mut price = bus.subscribe::<PriceChanged>().unwrap();

    bus.publish(PriceChanged(13)).unwrap();
    bus.publish(StockChanged(7)).unwrap();

    assert_eq!(stock.recv_lossy().await.unwrap().0, 7);
    assert_eq!(price.recv_lossy().await.unwrap().0, 13);
}

#[tokio::test]
async fn zero_capacity_is_rejected() {
    let bus = EventBus::new();
    let err = bus.subscribe_with_capacity::<StockChanged>(0).unwrap_err();
    assert!(matches!(err, EventBusError::InvalidCapacity { .. }));
}

#[tokio::test]
async fn shutdown_closes_receivers() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<StockChanged>().unwrap();

    assert_eq!(bus.shutdown(), 1);

    let next = tokio::time::timeout(Duration::from_secs(1), rx.recv_lossy()).await.unwrap();
    assert!(next.is_none());
}

#[tokio::test]
async fn drain_returns_what_is_queued_and_skips_gaps() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe_with_capacity::<StockChanged>(4).unwrap();
    assert!(rx.drain().is_empty());

    for i in 0..10 {
        bus.publish(StockChanged(i)).unwrap();
    }

    let drained: Vec<_> = rx.drain().iter().map(|e| e.0).collect();
    assert_eq!(drained, [6, 7, 8, 9]);
    assert!(rx.drain().is_empty());
}
