// tests/pipeline_e2e.rs
mod common;

use std::sync::Arc;

use brand_news_monitor::{
    ArticleFilter, FetchQuery, Monitor, MonitorOutcome, MonitorRequest, SourceAdapter,
};
use common::{article, enricher_with, KeywordClassifier, RecordingNotifier, StubAdapter};

fn three_sources() -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(StubAdapter::ok(
            "alpha",
            vec![
                article("2024-01-05 10:00:00", "DS7 road test", "A good long drive."),
                article("not-a-date", "DS3 recall", "Bad news for owners."),
            ],
        )),
        Box::new(StubAdapter::failing("beta")),
        Box::new(StubAdapter::ok(
            "gamma",
            vec![
                article("Fri, 01 Mar 2024 09:30:00 GMT", "DS7 sales record", "Good quarter."),
                article("2024-02-10T12:00:00Z", "Jules Verne concept", "Shown at the salon."),
                article("2023-12-24", "Brand update", "Plain corporate memo."),
            ],
        )),
    ]
}

fn request(filter: ArticleFilter, notify: bool) -> MonitorRequest {
    MonitorRequest {
        fetch: FetchQuery::new("DS Automobiles", 10),
        filter,
        notify,
    }
}

#[tokio::test]
async fn merges_enriches_sorts_and_filters() {
    let monitor = Monitor::new(three_sources(), enricher_with(Arc::new(KeywordClassifier::default())));
    assert_eq!(monitor.adapter_names(), ["alpha", "beta", "gamma"]);

    let out = monitor.run(&request(ArticleFilter::default(), false)).await;
    let MonitorOutcome::Articles { total, articles } = &out else {
        panic!("expected articles, got {out:?}");
    };
    assert_eq!(*total, 5);
    assert_eq!(articles.len(), 5);

    let catalog = monitor.enricher().catalog();
    let labels = monitor.enricher().labels();
    for a in articles {
        assert!(!a.summary.is_empty());
        assert!(catalog.contains(&a.model), "{}", a.model);
        assert!(labels.contains(&a.sentiment), "{}", a.sentiment);
    }

    let valid: Vec<_> = articles.iter().map_while(|a| a.published_at_ts).collect();
    assert_eq!(valid.len(), 4);
    assert!(valid.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(articles[4].article.title, "DS3 recall");
    assert_eq!(articles[0].article.title, "DS7 sales record");

    let only_ds7 = monitor
        .run(&request(ArticleFilter::new(Some("DS7"), None), false))
        .await;
    let kept = only_ds7.articles();
    assert_eq!(kept.len(), 2);
    assert!(kept.iter().all(|a| a.model == "DS7"));
    assert!(matches!(only_ds7, MonitorOutcome::Articles { total: 5, .. }));
}

#[tokio::test]
async fn notifies_every_article_before_filtering() {
    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = Monitor::new(three_sources(), enricher_with(Arc::new(KeywordClassifier::default())))
        .with_notifier(notifier.clone());

    let out = monitor
        .run(&request(ArticleFilter::new(Some("DS9"), None), true))
        .await;
    assert!(out.articles().is_empty());
    assert_eq!(notifier.sent.lock().expect("sent lock").len(), 5);
}

#[tokio::test]
async fn failing_notifier_does_not_change_the_result() {
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let monitor = Monitor::new(three_sources(), enricher_with(Arc::new(KeywordClassifier::default())))
        .with_notifier(notifier.clone());

    let out = monitor.run(&request(ArticleFilter::default(), true)).await;
    assert_eq!(out.articles().len(), 5);
    assert_eq!(notifier.sent.lock().expect("sent lock").len(), 5);
}

#[tokio::test]
async fn all_sources_empty_short_circuits() {
    let classifier = Arc::new(KeywordClassifier::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = Monitor::new(
        vec![
            Box::new(StubAdapter::ok("alpha", vec![])),
            Box::new(StubAdapter::failing("beta")),
        ],
        enricher_with(classifier.clone()),
    )
    .with_notifier(notifier.clone());

    let out = monitor.run(&request(ArticleFilter::default(), true)).await;
    assert_eq!(out, MonitorOutcome::NoResults);
    assert!(classifier.inputs.lock().expect("inputs lock").is_empty());
    assert!(notifier.sent.lock().expect("sent lock").is_empty());
}

#[tokio::test]
async fn no_results_serializes_with_status_tag() {
    let json = serde_json::to_value(MonitorOutcome::NoResults).expect("serialize");
    assert_eq!(json["status"], "no_results");
}
