//! Topic catalog and the ordered topic selection sent to the zero-shot classifier.

use std::fmt;
use std::str::FromStr;

/// Topics offered for zero-shot focus scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Pricing,
    Demand,
    Margins,
    Capex,
    SupplyChain,
    FxMacro,
    Regulatory,
    Competition,
    Inflation,
}

impl Topic {
    /// The full catalog, in display order.
    pub const ALL: [Topic; 9] = [
        Topic::Pricing,
        Topic::Demand,
        Topic::Margins,
        Topic::Capex,
        Topic::SupplyChain,
        Topic::FxMacro,
        Topic::Regulatory,
        Topic::Competition,
        Topic::Inflation,
    ];

    /// Label passed to the classifier and shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Topic::Pricing => "Pricing",
            Topic::Demand => "Demand",
            Topic::Margins => "Margins",
            Topic::Capex => "Capex",
            Topic::SupplyChain => "Supply Chain",
            Topic::FxMacro => "FX/Macro",
            Topic::Regulatory => "Regulatory",
            Topic::Competition => "Competition",
            Topic::Inflation => "Inflation",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Topic {
    type Err = String;

    /// Case-insensitive; spaces, dashes, underscores and slashes are ignored,
    /// so `supply-chain` and `fx_macro` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squash = |v: &str| -> String {
            v.chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_' | '/'))
                .flat_map(char::to_lowercase)
                .collect()
        };
        let wanted = squash(s);
        Topic::ALL
            .into_iter()
            .find(|t| squash(t.label()) == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Topic::ALL.iter().map(|t| t.label()).collect();
                format!("unknown topic '{s}'. Known topics: {}", known.join(", "))
            })
    }
}

/// Ordered, de-duplicated set of topic labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicSet {
    labels: Vec<String>,
}

impl TopicSet {
    /// Build from arbitrary labels. Duplicates after the first are dropped.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for label in labels {
            set.insert(label);
        }
        set
    }

    pub fn from_topics(topics: &[Topic]) -> Self {
        Self::new(topics.iter().map(|t| t.label()))
    }

    /// The selection offered before the user changes anything.
    pub fn default_selection() -> Self {
        Self::from_topics(&[
            Topic::Pricing,
            Topic::Demand,
            Topic::Margins,
            Topic::FxMacro,
            Topic::Inflation,
        ])
    }

    /// Returns `false` if the label was already present.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.labels.contains(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.labels.iter().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_spellings() {
        assert_eq!("supply-chain".parse::<Topic>().unwrap(), Topic::SupplyChain);
        assert_eq!("FX/Macro".parse::<Topic>().unwrap(), Topic::FxMacro);
        assert_eq!("fx_macro".parse::<Topic>().unwrap(), Topic::FxMacro);
        assert_eq!("MARGINS".parse::<Topic>().unwrap(), Topic::Margins);
    }

    #[test]
    fn unknown_topic_lists_catalog() {
        let err = "weather".parse::<Topic>().unwrap_err();
        assert!(err.contains("Supply Chain"));
    }

    #[test]
    fn set_keeps_first_occurrence_order() {
        let set = TopicSet::new(["Margins", "Pricing", "Margins", "Demand"]);
        assert_eq!(set.labels(), vec!["Margins", "Pricing", "Demand"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn default_selection_matches_catalog_labels() {
        let set = TopicSet::default_selection();
        assert_eq!(
            set.labels(),
            vec!["Pricing", "Demand", "Margins", "FX/Macro", "Inflation"]
        );
        assert!(TopicSet::default().is_empty());
    }
}
