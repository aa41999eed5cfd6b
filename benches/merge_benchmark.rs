use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use findit_client::models::wire::parse_notifications;
use findit_client::models::{Notification, NotificationKind};
use findit_client::services::NotificationFeed;
use serde_json::json;
use std::hint::black_box;

fn notifications(prefix: &str, count: usize) -> Vec<Notification> {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| Notification {
            id: format!("{}{}", prefix, i),
            kind: NotificationKind::System,
            title: "Title".to_string(),
            message: format!("Message {}", i),
            read: i % 3 == 0,
            created_at: base + Duration::minutes(i as i64),
            match_id: None,
            similarity_score: None,
            lost_item_id: None,
            found_item_id: None,
            location: None,
        })
        .collect()
}

fn benchmark_merge(c: &mut Criterion) {
    // A feed that has been paged through, then a poll that mostly repeats it
    let mut existing = NotificationFeed::new();
    existing.merge(notifications("n", 500));
    let overlapping = notifications("n", 50)
        .into_iter()
        .chain(notifications("new", 10))
        .collect::<Vec<_>>();

    let mut group = c.benchmark_group("notification_merge");

    group.bench_function("poll_into_500", |b| {
        b.iter_batched(
            || (existing.clone(), overlapping.clone()),
            |(mut feed, incoming)| feed.merge(black_box(incoming)),
            BatchSize::SmallInput,
        )
    });

    let body = json!({
        "notifications": (0..100).map(|i| json!({
            "_id": format!("n{}", i),
            "type": if i % 4 == 0 { "item_reposted" } else { "match_found" },
            "message": "Your lost item matches",
            "itemDescription": "black umbrella",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "read": false
        })).collect::<Vec<_>>(),
        "hasMore": true
    });
    let received = Utc::now();

    group.bench_function("parse_page_of_100", |b| {
        b.iter(|| parse_notifications(black_box(&body), received))
    });

    group.finish();
}

criterion_group!(benches, benchmark_merge);
criterion_main!(benches);
