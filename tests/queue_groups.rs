use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use bytes::Bytes;

use localbus::{Broker, IndexSource, Message, SeededSource, Subscription};

fn counters(n: usize) -> Arc<Vec<AtomicUsize>> {
    Arc::new((0..n).map(|_| AtomicUsize::new(0)).collect())
}

fn queue_members(
    broker: &Broker,
    topic: &str,
    queue: &str,
    counts: &Arc<Vec<AtomicUsize>>,
) -> Vec<Subscription> {
    (0..counts.len())
        .map(|i| {
            let counts = counts.clone();
            broker
                .queue_subscribe(topic, queue, move |_: &Message| {
                    counts[i].fetch_add(1, Ordering::SeqCst);
                })
                .unwrap()
        })
        .collect()
}

fn total(counts: &[AtomicUsize]) -> usize {
    counts.iter().map(|c| c.load(Ordering::SeqCst)).sum()
}

/// Тест проверяет, что из N участников очереди каждое сообщение получает
/// ровно один, и ни один участник не голодает.
#[test]
fn test_exactly_one_member_per_publish_and_no_starvation() {
    let broker = Broker::builder()
        .index_source(Arc::new(SeededSource::new(2024)))
        .build();
    let counts = counters(4);
    let _subs = queue_members(&broker, "jobs.run", "workers", &counts);

    for n in 1..=400 {
        broker.publish("jobs.run", Bytes::new()).unwrap();
        assert_eq!(total(&counts), n);
    }

    for (i, c) in counts.iter().enumerate() {
        let got = c.load(Ordering::SeqCst);
        assert!(got > 0, "member {i} starved");
    }
}

/// Тест проверяет, что разные имена очередей получают по одному сообщению,
/// а широковещательные подписчики — каждый.
#[test]
fn test_queues_and_broadcast_mix() {
    let broker = Broker::new();
    let billing = counters(3);
    let audit = counters(2);
    let _b = queue_members(&broker, "orders.*", "billing", &billing);
    let _a = queue_members(&broker, "orders.>", "audit", &audit);

    let taps = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        let taps = taps.clone();
        broker
            .subscribe("orders.new", move |_| {
                taps.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }

    broker.publish("orders.new", Bytes::new()).unwrap();

    assert_eq!(total(&billing), 1);
    assert_eq!(total(&audit), 1);
    assert_eq!(taps.load(Ordering::SeqCst), 2);
    assert_eq!(broker.stats().delivery_count, 4);
}

/// Один и тот же участник очереди не должен получить сообщение дважды,
/// даже если очередь с этим именем встречается в нескольких узлах дерева.
#[test]
fn test_same_queue_across_patterns() {
    let broker = Broker::new();
    let counts = counters(3);
    let c0 = counts.clone();
    let c1 = counts.clone();
    let c2 = counts.clone();
    broker
        .queue_subscribe("a.b", "q", move |_| {
            c0[0].fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    broker
        .queue_subscribe("a.*", "q", move |_| {
            c1[1].fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    broker
        .queue_subscribe(">", "q", move |_| {
            c2[2].fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    for _ in 0..50 {
        broker.publish("a.b", Bytes::new()).unwrap();
    }
    assert_eq!(total(&counts), 50);
}

#[test]
fn test_unsubscribed_members_are_skipped() {
    let broker = Broker::new();
    let counts = counters(5);
    let subs = queue_members(&broker, "t", "q", &counts);
    for sub in &subs[..4] {
        sub.unsubscribe().unwrap();
    }

    for _ in 0..20 {
        broker.publish("t", Bytes::new()).unwrap();
    }
    assert_eq!(counts[4].load(Ordering::SeqCst), 20);
    assert_eq!(total(&counts), 20);
}

#[test]
fn test_empty_queue_after_all_unsubscribed() {
    let broker = Broker::new();
    let counts = counters(2);
    let subs = queue_members(&broker, "t", "q", &counts);
    subs.iter().for_each(|s| s.unsubscribe().unwrap());

    assert!(broker.publish("t", Bytes::new()).is_ok());
    assert_eq!(total(&counts), 0);
}

/// Источник, который отписывает первого кандидата прямо перед выбором,
/// имитируя гонку с конкурентной отпиской.
struct RacingSource {
    victim: parking_lot::Mutex<Option<Subscription>>,
}

impl IndexSource for RacingSource {
    fn pick(
        &self,
        len: usize,
    ) -> usize {
        if let Some(victim) = self.victim.lock().take() {
            victim.unsubscribe().unwrap();
        }
        len - 1
    }
}

#[test]
fn test_race_with_unsubscribe_is_tolerated() {
    let source = Arc::new(RacingSource {
        victim: parking_lot::Mutex::new(None),
    });
    let broker = Broker::builder().index_source(source.clone()).build();
    let counts = counters(2);
    let subs = queue_members(&broker, "t", "q", &counts);

    // Вторая подписка в списке кандидатов последняя; она и будет отписана.
    *source.victim.lock() = Some(subs[1].clone());

    broker.publish("t", Bytes::new()).unwrap();
    assert_eq!(counts[0].load(Ordering::SeqCst), 1);
    assert_eq!(counts[1].load(Ordering::SeqCst), 0);
    assert_eq!(broker.stats().dropped_queue_candidates, 1);
}

/// Тест проверяет параллельные публикации в очередь: общее число доставок
/// равно числу публикаций.
#[test]
fn test_concurrent_queue_publishes() {
    let broker = Broker::new();
    let counts = counters(6);
    let _subs = queue_members(&broker, "work.>", "pool", &counts);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let broker = broker.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    broker
                        .publish(&format!("work.{t}.{i}"), Bytes::new())
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(total(&counts), 1000);
}

/// Тест проверяет, что отписка из другого потока во время публикаций не
/// ломает доставку и не приводит к двойной доставке.
#[test]
fn test_unsubscribe_while_publishing() {
    let broker = Broker::new();
    let counts = counters(8);
    let subs = queue_members(&broker, "t", "q", &counts);

    let publisher = {
        let broker = broker.clone();
        thread::spawn(move || {
            for _ in 0..500 {
                broker.publish("t", Bytes::new()).unwrap();
            }
        })
    };
    for sub in &subs[1..] {
        sub.unsubscribe().unwrap();
    }
    publisher.join().unwrap();

    assert_eq!(total(&counts), 500);
}
