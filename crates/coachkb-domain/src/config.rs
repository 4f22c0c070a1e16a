//! Per-domain configuration consumed by the adapters.

use serde::{Deserialize, Serialize};

pub const GENERAL_DOMAIN: &str = "general";
pub const LIFE_COACHING_DOMAIN: &str = "life-coaching";
pub const CAREER_COACHING_DOMAIN: &str = "career-coaching";

/// A named category detected by keyword-bag scoring, with the phrase
/// appended to queries when it applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeywordGroup {
    pub name: String,
    pub keywords: Vec<String>,
    pub query_phrase: String,
}

impl KeywordGroup {
    pub fn new(name: &str, keywords: &[&str], query_phrase: &str) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            query_phrase: query_phrase.to_string(),
        }
    }
}

/// Multiplicative boosts applied when result metadata matches the context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoostFactors {
    pub life_area: f32,
    pub methodology: f32,
    pub complexity: f32,
    pub research_based: f32,
}

impl Default for BoostFactors {
    fn default() -> Self {
        Self { life_area: 1.3, methodology: 1.2, complexity: 1.1, research_based: 1.15 }
    }
}

/// Increments added to the personalization score per matching signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersonalizationWeights {
    pub methodology: f32,
    pub life_area: f32,
    pub complexity: f32,
    pub research_based: f32,
}

impl Default for PersonalizationWeights {
    fn default() -> Self {
        Self { methodology: 0.3, life_area: 0.3, complexity: 0.2, research_based: 0.2 }
    }
}

/// `final = boosted * boosted_score + personalization * personalization_score`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub boosted: f32,
    pub personalization: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { boosted: 0.7, personalization: 0.3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DomainConfig {
    pub domain_id: String,
    /// Ordered: ties in detection go to the earlier entry.
    pub life_areas: Vec<KeywordGroup>,
    pub methodologies: Vec<KeywordGroup>,
    pub goal_keywords: Vec<String>,
    pub domain_keywords: Vec<String>,
    /// Results whose raw similarity is below this are dropped before scoring.
    pub minimum_relevance_score: f32,
    pub boosts: BoostFactors,
    pub personalization: PersonalizationWeights,
    pub score_weights: ScoreWeights,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self::general()
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl DomainConfig {
    pub fn general() -> Self {
        Self {
            domain_id: GENERAL_DOMAIN.to_string(),
            life_areas: vec![
                KeywordGroup::new("career", &["career", "job", "work", "promotion"], "career development"),
                KeywordGroup::new("relationships", &["relationship", "partner", "family", "friend"], "relationships"),
                KeywordGroup::new("health", &["health", "exercise", "sleep", "energy"], "health and wellbeing"),
                KeywordGroup::new("finance", &["money", "budget", "debt", "saving"], "financial wellbeing"),
            ],
            methodologies: vec![
                KeywordGroup::new("grow", &["grow model", "options", "way forward"], "GROW model"),
                KeywordGroup::new("cbt", &["cognitive", "thought", "reframe"], "cognitive behavioral techniques"),
            ],
            goal_keywords: words(&["goal", "achieve", "improve", "plan", "objective"]),
            domain_keywords: Vec::new(),
            minimum_relevance_score: 0.3,
            boosts: BoostFactors::default(),
            personalization: PersonalizationWeights::default(),
            score_weights: ScoreWeights::default(),
        }
    }

    pub fn life_coaching() -> Self {
        Self {
            domain_id: LIFE_COACHING_DOMAIN.to_string(),
            life_areas: vec![
                KeywordGroup::new(
                    "relationships",
                    &["relationship", "partner", "marriage", "family", "friend", "conflict"],
                    "healthy relationships and communication",
                ),
                KeywordGroup::new(
                    "health",
                    &["health", "exercise", "sleep", "nutrition", "energy", "fitness"],
                    "health and wellbeing habits",
                ),
                KeywordGroup::new(
                    "personal-growth",
                    &["confidence", "purpose", "values", "self-esteem", "habit", "mindset"],
                    "personal growth and self-development",
                ),
                KeywordGroup::new(
                    "finance",
                    &["money", "budget", "debt", "saving", "spending"],
                    "financial wellbeing",
                ),
                KeywordGroup::new(
                    "career",
                    &["career", "job", "work-life", "burnout"],
                    "work-life balance",
                ),
            ],
            methodologies: vec![
                KeywordGroup::new("grow", &["grow model", "way forward", "options"], "GROW coaching model"),
                KeywordGroup::new("cbt", &["cognitive", "reframe", "thought pattern", "belief"], "cognitive behavioral techniques"),
                KeywordGroup::new(
                    "positive-psychology",
                    &["strengths", "gratitude", "optimism", "flourish"],
                    "positive psychology practices",
                ),
                KeywordGroup::new("mindfulness", &["mindful", "meditation", "breathing", "present"], "mindfulness practice"),
            ],
            goal_keywords: words(&["goal", "achieve", "change", "improve", "habit", "resolution"]),
            domain_keywords: words(&["coaching", "wellbeing", "balance", "fulfilment", "fulfillment", "motivation"]),
            minimum_relevance_score: 0.4,
            ..Self::general()
        }
    }

    pub fn career_coaching() -> Self {
        Self {
            domain_id: CAREER_COACHING_DOMAIN.to_string(),
            life_areas: vec![
                KeywordGroup::new(
                    "job-search",
                    &["resume", "cv", "interview", "job search", "application", "cover letter"],
                    "job search strategy",
                ),
                KeywordGroup::new(
                    "leadership",
                    &["leader", "manager", "team", "delegate", "influence"],
                    "leadership development",
                ),
                KeywordGroup::new(
                    "career-transition",
                    &["career change", "transition", "pivot", "switch careers", "new field"],
                    "career transition planning",
                ),
                KeywordGroup::new(
                    "skills",
                    &["skill", "learning", "certification", "upskill", "training"],
                    "skill development",
                ),
            ],
            methodologies: vec![
                KeywordGroup::new("grow", &["grow model", "way forward", "options"], "GROW coaching model"),
                KeywordGroup::new("strengths-based", &["strengths", "talent", "strengthsfinder"], "strengths-based development"),
                KeywordGroup::new("okr", &["okr", "key result", "objective"], "objectives and key results"),
            ],
            goal_keywords: words(&["goal", "promotion", "raise", "achieve", "target", "advance"]),
            domain_keywords: words(&["career", "professional", "workplace", "employer", "salary", "networking"]),
            minimum_relevance_score: 0.4,
            ..Self::general()
        }
    }

    /// Built-in configuration for a known domain id.
    pub fn builtin(domain_id: &str) -> Option<Self> {
        match domain_id {
            GENERAL_DOMAIN => Some(Self::general()),
            LIFE_COACHING_DOMAIN => Some(Self::life_coaching()),
            CAREER_COACHING_DOMAIN => Some(Self::career_coaching()),
            _ => None,
        }
    }

    pub fn life_area(&self, name: &str) -> Option<&KeywordGroup> {
        self.life_areas.iter().find(|g| g.name.eq_ignore_ascii_case(name))
    }

    pub fn methodology(&self, name: &str) -> Option<&KeywordGroup> {
        self.methodologies.iter().find(|g| g.name.eq_ignore_ascii_case(name))
    }
}
