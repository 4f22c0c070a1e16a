//! The adapter trait and the built-in verticals.

use coachkb_core::keywords::keyword_hits;
use coachkb_core::types::{DomainContext, SearchResult};

use crate::config::DomainConfig;
use crate::scorer::{BaseScorer, EnhancedQuery, Personalization};

/// Per-vertical query enhancement and result re-scoring.
pub trait DomainAdapter: Send + Sync {
    fn domain_id(&self) -> &str;

    fn config(&self) -> &DomainConfig;

    fn enhance_query(&self, query: &str, context: &DomainContext) -> EnhancedQuery;

    /// Drop irrelevant results and re-rank the rest, best first.
    fn filter_results(&self, results: Vec<SearchResult>, context: &DomainContext) -> Vec<SearchResult>;
}

/// Fallback adapter: the base scorer with no vertical extras.
pub struct GeneralAdapter {
    scorer: BaseScorer,
}

impl GeneralAdapter {
    pub fn new(config: DomainConfig) -> Self {
        Self { scorer: BaseScorer::new(config) }
    }
}

impl DomainAdapter for GeneralAdapter {
    fn domain_id(&self) -> &str {
        &self.scorer.config().domain_id
    }

    fn config(&self) -> &DomainConfig {
        self.scorer.config()
    }

    fn enhance_query(&self, query: &str, context: &DomainContext) -> EnhancedQuery {
        self.scorer.enhance(query, context)
    }

    fn filter_results(&self, results: Vec<SearchResult>, context: &DomainContext) -> Vec<SearchResult> {
        self.scorer.filter(results, context, |_, _| Personalization::default())
    }
}

const EMOTIONAL_KEYWORDS: [&str; 8] =
    ["stress", "anxious", "anxiety", "overwhelmed", "stuck", "burnout", "lonely", "frustrated"];
const EMOTIONAL_CONFIDENCE: f32 = 0.05;
const GOAL_ALIGNMENT_BONUS: f32 = 0.1;

pub struct LifeCoachingAdapter {
    scorer: BaseScorer,
}

impl LifeCoachingAdapter {
    pub fn new(config: DomainConfig) -> Self {
        Self { scorer: BaseScorer::new(config) }
    }
}

impl DomainAdapter for LifeCoachingAdapter {
    fn domain_id(&self) -> &str {
        &self.scorer.config().domain_id
    }

    fn config(&self) -> &DomainConfig {
        self.scorer.config()
    }

    fn enhance_query(&self, query: &str, context: &DomainContext) -> EnhancedQuery {
        let mut enhanced = self.scorer.enhance(query, context);
        if keyword_hits(&query.to_lowercase(), &EMOTIONAL_KEYWORDS) > 0 {
            enhanced.add("coping strategies", "focus:emotional-wellbeing".to_string(), EMOTIONAL_CONFIDENCE);
        }
        enhanced
    }

    fn filter_results(&self, results: Vec<SearchResult>, context: &DomainContext) -> Vec<SearchResult> {
        self.scorer.filter(results, context, |result, ctx| {
            let goals: Vec<String> = ctx.user_goals.iter().map(|g| g.to_lowercase()).collect();
            let aligned = result
                .metadata
                .tags
                .iter()
                .any(|tag| goals.iter().any(|goal| goal.contains(&tag.to_lowercase())));
            if aligned {
                Personalization { increment: GOAL_ALIGNMENT_BONUS, reasons: vec!["goal alignment".to_string()] }
            } else {
                Personalization::default()
            }
        })
    }
}

const STAGE_CONFIDENCE: f32 = 0.05;
const INDUSTRY_CONFIDENCE: f32 = 0.05;
const CAREER_MATCH_BONUS: f32 = 0.1;

pub struct CareerCoachingAdapter {
    scorer: BaseScorer,
}

impl CareerCoachingAdapter {
    pub fn new(config: DomainConfig) -> Self {
        Self { scorer: BaseScorer::new(config) }
    }
}

impl DomainAdapter for CareerCoachingAdapter {
    fn domain_id(&self) -> &str {
        &self.scorer.config().domain_id
    }

    fn config(&self) -> &DomainConfig {
        self.scorer.config()
    }

    fn enhance_query(&self, query: &str, context: &DomainContext) -> EnhancedQuery {
        let mut enhanced = self.scorer.enhance(query, context);
        if let Some(stage) = context.career_stage.as_deref().filter(|s| !s.trim().is_empty()) {
            enhanced.add(&format!("{stage} professional"), format!("career_stage:{stage}"), STAGE_CONFIDENCE);
        }
        if let Some(industry) = context.industry.as_deref().filter(|s| !s.trim().is_empty()) {
            enhanced.add(industry, format!("industry:{industry}"), INDUSTRY_CONFIDENCE);
        }
        enhanced
    }

    fn filter_results(&self, results: Vec<SearchResult>, context: &DomainContext) -> Vec<SearchResult> {
        self.scorer.filter(results, context, |result, ctx| {
            let content = result.content.to_lowercase();
            let mut extra = Personalization::default();
            for (label, value) in [("industry match", &ctx.industry), ("career stage match", &ctx.career_stage)] {
                if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                    if content.contains(&value.to_lowercase()) {
                        extra.increment += CAREER_MATCH_BONUS;
                        extra.reasons.push(label.to_string());
                    }
                }
            }
            extra
        })
    }
}
