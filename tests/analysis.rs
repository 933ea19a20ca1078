mod common;

use std::time::Duration;

use common::FakeLoader;
use earnings_lens::analysis::{AnalysisFacade, AnalysisOptions, TopicFocus};
use earnings_lens::error::{AnalysisError, PipelineError};
use earnings_lens::normalize::NormalizedInput;
use earnings_lens::registry::Role;
use earnings_lens::topics::{Topic, TopicSet};

const TRANSCRIPT: &str = "Revenue grew 8% year over year.\n\n  We raised prices twice, \
                          and demand held up, although gross margin   narrowed on freight.";

fn three_topics() -> TopicSet {
    TopicSet::from_topics(&[Topic::Pricing, Topic::Demand, Topic::Margins])
}

fn scored_loader() -> FakeLoader {
    FakeLoader::default().with_scores(&[("Margins", 0.95), ("Pricing", 0.9), ("Demand", 0.4)])
}

#[tokio::test]
async fn produces_all_three_views() -> anyhow::Result<()> {
    let (registry, counters) = scored_loader().into_registry();
    let facade = AnalysisFacade::new(registry);

    let report = facade.run(TRANSCRIPT, &three_topics()).await?;

    let verdict = report.sentiment?;
    assert!(!verdict.label.is_empty());
    assert!((0.0..=1.0).contains(&verdict.score));

    let focus = report.topics?;
    let labels: Vec<&str> = focus.scores().iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Margins", "Pricing", "Demand"]);
    assert!(focus.scores().windows(2).all(|w| w[0].score >= w[1].score));

    let summary = report.summary?;
    let bounds = facade.options().summary_bounds;
    assert!(!summary.text.is_empty());
    assert!(summary.tokens_generated >= bounds.min_length);
    assert!(summary.tokens_generated <= bounds.max_length);

    for role in Role::ALL {
        assert_eq!(counters.calls(role), 1, "{role} should run exactly once");
    }
    Ok(())
}

#[tokio::test]
async fn summary_failure_leaves_other_views_intact() -> anyhow::Result<()> {
    let loader = FakeLoader {
        fail_summary: true,
        ..scored_loader()
    };
    let (registry, _counters) = loader.into_registry();
    let facade = AnalysisFacade::new(registry);

    let report = facade.run(TRANSCRIPT, &three_topics()).await?;

    assert!(report.sentiment.is_ok());
    assert!(matches!(report.topics, Ok(TopicFocus::Ranked(ref s)) if s.len() == 3));

    let err = report.summary.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Inference {
            role: Role::Summarizer,
            source: PipelineError::Generation(_),
        }
    ));
    assert_eq!(err.user_message(), "Summarization failed. Try shorter text.");
    assert!(err.detail().unwrap().contains("NaN logits"));
    Ok(())
}

#[tokio::test]
async fn empty_topic_set_skips_the_classifier() -> anyhow::Result<()> {
    let (registry, counters) = scored_loader().into_registry();
    let facade = AnalysisFacade::new(registry);

    let report = facade.run(TRANSCRIPT, &TopicSet::default()).await?;

    let focus = report.topics?;
    assert_eq!(focus, TopicFocus::NoTopicsSelected);
    assert!(focus.warning().is_some());
    assert_eq!(counters.loads(Role::TopicClassifier), 0);
    assert_eq!(counters.calls(Role::TopicClassifier), 0);
    assert!(report.sentiment.is_ok());
    assert!(report.summary.is_ok());
    Ok(())
}

#[tokio::test]
async fn blank_input_is_rejected_before_loading() {
    let (registry, counters) = scored_loader().into_registry();
    let facade = AnalysisFacade::new(registry);

    let err = facade
        .run("  \n\t  \r\n ", &three_topics())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::EmptyInput));
    assert_eq!(err.user_message(), "Please paste some text.");
    assert_eq!(counters.total_loads(), 0);
    assert_eq!(counters.total_calls(), 0);
}

#[tokio::test]
async fn topic_focus_keeps_the_top_seven() -> anyhow::Result<()> {
    let scores: Vec<(&str, f32)> = Topic::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| (t.label(), 0.1 * i as f32))
        .collect();
    let (registry, _counters) = FakeLoader::default().with_scores(&scores).into_registry();
    let facade = AnalysisFacade::new(registry);

    let report = facade
        .run(TRANSCRIPT, &TopicSet::from_topics(&Topic::ALL))
        .await?;

    let focus = report.topics?;
    assert_eq!(focus.scores().len(), 7);
    assert_eq!(focus.scores()[0].label, Topic::Inflation.label());
    assert!(focus
        .scores()
        .iter()
        .all(|s| s.label != Topic::Pricing.label() && s.label != Topic::Demand.label()));
    Ok(())
}

#[tokio::test]
async fn slow_summary_times_out_alone() -> anyhow::Result<()> {
    let loader = FakeLoader {
        summary_delay: Duration::from_millis(400),
        ..scored_loader()
    };
    let (registry, _counters) = loader.into_registry();
    let options = AnalysisOptions {
        timeout: Some(Duration::from_millis(50)),
        ..AnalysisOptions::default()
    };
    let facade = AnalysisFacade::with_options(registry, options);

    let report = facade.run(TRANSCRIPT, &three_topics()).await?;

    assert!(matches!(
        report.summary,
        Err(AnalysisError::Timeout {
            role: Role::Summarizer,
            ..
        })
    ));
    assert!(report.sentiment.is_ok());
    assert!(report.topics.is_ok());
    Ok(())
}

#[tokio::test]
async fn construction_failure_stops_the_request() {
    let loader = FakeLoader {
        fail_construction: Some(Role::Summarizer),
        ..scored_loader()
    };
    let (registry, counters) = loader.into_registry();
    let facade = AnalysisFacade::new(registry);

    let err = facade.run(TRANSCRIPT, &three_topics()).await.unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::Construction {
            role: Role::Summarizer,
            ..
        }
    ));
    assert_eq!(counters.total_calls(), 0);
}

#[tokio::test]
async fn pipelines_load_once_across_requests() -> anyhow::Result<()> {
    let (registry, counters) = scored_loader().into_registry();
    let facade = AnalysisFacade::new(registry);

    for _ in 0..3 {
        facade.run(TRANSCRIPT, &three_topics()).await?;
    }

    for role in Role::ALL {
        assert_eq!(counters.loads(role), 1);
        assert_eq!(counters.calls(role), 3);
    }
    Ok(())
}

#[tokio::test]
async fn run_normalizes_before_inference() -> anyhow::Result<()> {
    let (registry, counters) = scored_loader().into_registry();
    let options = AnalysisOptions {
        max_chars: 20,
        ..AnalysisOptions::default()
    };
    let facade = AnalysisFacade::with_options(registry, options);

    facade.run(TRANSCRIPT, &TopicSet::default()).await?;

    let seen = counters.last_sentiment_text.lock().unwrap().clone().unwrap();
    assert_eq!(seen, NormalizedInput::new(TRANSCRIPT, 20).as_str());
    assert!(seen.chars().count() <= 20);
    assert!(!seen.contains("  ") && !seen.contains('\n'));
    Ok(())
}

#[tokio::test]
async fn analyze_accepts_prenormalized_input() -> anyhow::Result<()> {
    let (registry, counters) = scored_loader().into_registry();
    let facade = AnalysisFacade::new(registry);
    let input = NormalizedInput::new(TRANSCRIPT, 3500);

    let report = facade.analyze(&input, &three_topics()).await?;

    assert!(report.sentiment.is_ok());
    assert_eq!(
        counters.last_sentiment_text.lock().unwrap().as_deref(),
        Some(input.as_str())
    );
    Ok(())
}
