use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use bytes::Bytes;
use localbus::{init_logging, Broker, LoggingConfig, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_logging(&LoggingConfig::from_settings(&settings))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        root_token = %settings.root_token,
        "localbus demo starting"
    );

    let broker = Broker::from_settings(&settings);

    let _all = broker.subscribe(">", |msg| {
        tracing::info!(topic = %msg.topic, bytes = msg.payload.len(), "tap");
    })?;
    let _orders = broker.subscribe("orders.*.created", |msg| {
        tracing::info!(topic = %msg.topic, "order created");
    })?;

    let per_worker: Arc<Vec<AtomicUsize>> =
        Arc::new((0..3).map(|_| AtomicUsize::new(0)).collect());
    let workers = (0..3)
        .map(|i| {
            let counts = per_worker.clone();
            broker.queue_subscribe("jobs.>", "workers", move |_| {
                counts[i].fetch_add(1, Ordering::Relaxed);
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    broker.publish("orders.eu.created", Bytes::from_static(b"#1001"))?;
    for n in 0..30 {
        broker.publish(&format!("jobs.resize.{n}"), Bytes::from(n.to_string()))?;
    }

    broker.publish_with_delay(
        "orders.us.created",
        Bytes::from_static(b"#1002"),
        Duration::from_millis(50),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;

    for (i, sub) in workers.iter().enumerate() {
        tracing::info!(
            worker = i,
            handled = per_worker[i].load(Ordering::Relaxed),
            "worker summary"
        );
        sub.unsubscribe()?;
    }

    let stats = broker.stats();
    tracing::info!(
        publishes = stats.publish_count,
        deliveries = stats.delivery_count,
        dropped = stats.dropped_queue_candidates,
        delayed_failures = stats.delayed_failures,
        live_subscriptions = broker.subscription_count(),
        "localbus demo finished"
    );

    Ok(())
}
