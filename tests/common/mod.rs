//! Counting stand-ins for the three pipelines.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use earnings_lens::analysis::{SentimentVerdict, Summary, TopicScore};
use earnings_lens::config::PipelineConfig;
use earnings_lens::error::{PipelineError, Result};
use earnings_lens::pipelines::summarization::SummaryBounds;
use earnings_lens::registry::{
    PipelineLoader, PipelineRegistry, Role, SentimentClassifier, Summarizer, TopicClassifier,
};

#[derive(Debug, Default)]
pub struct Counters {
    pub sentiment_loads: AtomicUsize,
    pub summarizer_loads: AtomicUsize,
    pub topic_loads: AtomicUsize,
    pub sentiment_calls: AtomicUsize,
    pub summarizer_calls: AtomicUsize,
    pub topic_calls: AtomicUsize,
    pub last_sentiment_text: Mutex<Option<String>>,
}

impl Counters {
    pub fn loads(&self, role: Role) -> usize {
        match role {
            Role::Sentiment => self.sentiment_loads.load(Ordering::SeqCst),
            Role::Summarizer => self.summarizer_loads.load(Ordering::SeqCst),
            Role::TopicClassifier => self.topic_loads.load(Ordering::SeqCst),
        }
    }

    pub fn calls(&self, role: Role) -> usize {
        match role {
            Role::Sentiment => self.sentiment_calls.load(Ordering::SeqCst),
            Role::Summarizer => self.summarizer_calls.load(Ordering::SeqCst),
            Role::TopicClassifier => self.topic_calls.load(Ordering::SeqCst),
        }
    }

    pub fn total_loads(&self) -> usize {
        Role::ALL.iter().map(|r| self.loads(*r)).sum()
    }

    pub fn total_calls(&self) -> usize {
        Role::ALL.iter().map(|r| self.calls(*r)).sum()
    }
}

pub struct FakeLoader {
    pub counters: Arc<Counters>,
    /// Time each construction takes.
    pub load_delay: Duration,
    /// Role whose construction fails.
    pub fail_construction: Option<Role>,
    pub fail_summary: bool,
    /// Time each summary takes.
    pub summary_delay: Duration,
    /// Score per topic label; unknown labels score 0.1.
    pub topic_scores: HashMap<String, f32>,
}

impl Default for FakeLoader {
    fn default() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            load_delay: Duration::ZERO,
            fail_construction: None,
            fail_summary: false,
            summary_delay: Duration::ZERO,
            topic_scores: HashMap::new(),
        }
    }
}

impl FakeLoader {
    pub fn with_scores(mut self, scores: &[(&str, f32)]) -> Self {
        self.topic_scores = scores.iter().map(|(l, s)| (l.to_string(), *s)).collect();
        self
    }

    /// Registry over this loader, plus the counters it updates.
    pub fn into_registry(self) -> (Arc<PipelineRegistry>, Arc<Counters>) {
        let counters = Arc::clone(&self.counters);
        let registry = PipelineRegistry::with_loader(PipelineConfig::default(), Arc::new(self));
        (Arc::new(registry), counters)
    }

    fn start_load(&self, role: Role, counter: &AtomicUsize) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            std::thread::sleep(self.load_delay);
        }
        if self.fail_construction == Some(role) {
            return Err(PipelineError::Download(format!("no such repo for {role}")));
        }
        Ok(())
    }
}

impl PipelineLoader for FakeLoader {
    fn load_sentiment(&self, _model_id: &str) -> Result<Arc<dyn SentimentClassifier>> {
        self.start_load(Role::Sentiment, &self.counters.sentiment_loads)?;
        Ok(Arc::new(FakeSentiment {
            counters: Arc::clone(&self.counters),
        }))
    }

    fn load_summarizer(&self, _model_id: &str) -> Result<Arc<dyn Summarizer>> {
        self.start_load(Role::Summarizer, &self.counters.summarizer_loads)?;
        Ok(Arc::new(FakeSummarizer {
            counters: Arc::clone(&self.counters),
            fail: self.fail_summary,
            delay: self.summary_delay,
        }))
    }

    fn load_topic_classifier(&self, _model_id: &str) -> Result<Arc<dyn TopicClassifier>> {
        self.start_load(Role::TopicClassifier, &self.counters.topic_loads)?;
        Ok(Arc::new(FakeTopics {
            counters: Arc::clone(&self.counters),
            scores: self.topic_scores.clone(),
        }))
    }
}

struct FakeSentiment {
    counters: Arc<Counters>,
}

impl SentimentClassifier for FakeSentiment {
    fn classify(&self, text: &str) -> Result<SentimentVerdict> {
        self.counters.sentiment_calls.fetch_add(1, Ordering::SeqCst);
        *self.counters.last_sentiment_text.lock().unwrap() = Some(text.to_string());
        Ok(SentimentVerdict {
            label: "positive".to_string(),
            score: 0.87,
        })
    }
}

struct FakeTopics {
    counters: Arc<Counters>,
    scores: HashMap<String, f32>,
}

impl TopicClassifier for FakeTopics {
    fn score_multi_label(&self, _text: &str, labels: &[&str]) -> Result<Vec<TopicScore>> {
        self.counters.topic_calls.fetch_add(1, Ordering::SeqCst);
        Ok(labels
            .iter()
            .map(|l| TopicScore {
                label: l.to_string(),
                score: self.scores.get(*l).copied().unwrap_or(0.1),
            })
            .collect())
    }
}

struct FakeSummarizer {
    counters: Arc<Counters>,
    fail: bool,
    delay: Duration,
}

impl Summarizer for FakeSummarizer {
    fn summarize(&self, _text: &str, bounds: SummaryBounds) -> Result<Summary> {
        self.counters.summarizer_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.fail {
            return Err(PipelineError::Generation(
                "decoder returned NaN logits".to_string(),
            ));
        }
        Ok(Summary {
            text: "Margins compressed on input costs while pricing held.".to_string(),
            tokens_generated: bounds.min_length + (bounds.max_length - bounds.min_length) / 2,
        })
    }
}
