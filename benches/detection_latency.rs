use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use botwatch::domain::{AccountRecord, FeatureVector, MethodSet};
use botwatch::features::FeatureExtractor;
use botwatch::rules::{RuleConfig, RuleSet};
use botwatch::{BotDetector, ClassifierAdapter};

fn spam_account(i: usize) -> AccountRecord {
    AccountRecord::from_value(json!({
        "username": format!("ab{:02}cd{:04}", i % 100, i),
        "created_at": "2026-10-15T00:00:00Z",
        "has_profile_image": false,
        "bio": "",
        "follower_count": 2,
        "following_count": 900,
        "post_count": 400,
        "recent_posts": [
            {"content": "Win now https://spam.example/x #promo", "timestamp": "2026-10-15T10:00:00Z"},
            {"content": "Win now https://spam.example/x #promo", "timestamp": "2026-10-15T10:01:00Z"},
            {"content": "Win now https://spam.example/x #promo", "timestamp": "2026-10-15T10:02:00Z"}
        ],
        "avg_reply_time_seconds": 2.0,
        "interactions": {"replies": ["a", "a", "a", "a"], "mentions": ["a"]}
    }))
}

fn regular_account() -> AccountRecord {
    AccountRecord::from_value(json!({
        "username": "jane_doe",
        "created_at": "2019-03-01T00:00:00Z",
        "has_profile_image": true,
        "bio": "Gardener, reader, occasional baker.",
        "verified": true,
        "follower_count": 540,
        "following_count": 310,
        "post_count": 1200,
        "recent_posts": [
            {"content": "Tomatoes are finally in", "timestamp": "2026-10-01T08:00:00Z"},
            {"content": "Reading list for autumn", "timestamp": "2026-10-04T19:30:00Z"}
        ],
        "avg_reply_time_seconds": 1800.0,
        "interactions": {"replies": ["tom", "ana", "li"], "likes": ["sam", "tom"]}
    }))
}

fn bench_feature_extraction(c: &mut Criterion) {
    let extractor = FeatureExtractor::new();
    let record = spam_account(7);

    c.bench_function("feature_extraction", |b| {
        b.iter(|| extractor.extract(black_box(&record)))
    });
}

fn bench_rule_evaluation(c: &mut Criterion) {
    let rules = RuleSet::standard();
    let config = RuleConfig::default();
    let features = FeatureExtractor::new().extract(&spam_account(7));

    c.bench_function("rule_evaluation", |b| {
        b.iter(|| rules.evaluate(black_box(&features), &config))
    });
}

fn bench_heuristic_classifier(c: &mut Criterion) {
    let adapter = ClassifierAdapter::new();
    let features = FeatureVector::zeroed();

    c.bench_function("heuristic_classifier", |b| {
        b.iter(|| adapter.detect(black_box(&features)))
    });
}

fn bench_full_detection(c: &mut Criterion) {
    let detector = BotDetector::new();
    let spam = spam_account(7);
    let regular = regular_account();

    c.bench_function("full_detection_spam", |b| {
        b.iter(|| detector.detect_with(black_box(&spam), MethodSet::ALL))
    });

    c.bench_function("full_detection_regular", |b| {
        b.iter(|| detector.detect_with(black_box(&regular), MethodSet::ALL))
    });
}

fn bench_batch_detection(c: &mut Criterion) {
    let detector = BotDetector::builder()
        .batch_workers(4)
        .build()
        .expect("detector");
    let records: Vec<_> = (0..256).map(spam_account).collect();

    c.bench_function("batch_detection_256", |b| {
        b.iter(|| detector.detect_batch(black_box(&records)))
    });
}

criterion_group!(
    benches,
    bench_feature_extraction,
    bench_rule_evaluation,
    bench_heuristic_classifier,
    bench_full_detection,
    bench_batch_detection,
);
criterion_main!(benches);
