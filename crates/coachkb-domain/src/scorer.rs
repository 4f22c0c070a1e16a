//! Default enhancement and re-scoring shared by every vertical.

use serde::{Deserialize, Serialize};
use tracing::debug;

use coachkb_core::keywords::{best_bag, keyword_hits};
use coachkb_core::types::{DomainContext, EvidenceLevel, ScoreTrail, SearchResult};

use crate::config::{DomainConfig, KeywordGroup};

pub const BASE_CONFIDENCE: f32 = 0.5;
pub const LIFE_AREA_CONFIDENCE: f32 = 0.2;
pub const METHODOLOGY_CONFIDENCE: f32 = 0.15;
pub const GOAL_CONFIDENCE: f32 = 0.10;
pub const COMPLEXITY_CONFIDENCE: f32 = 0.05;
pub const DOMAIN_KEYWORD_CONFIDENCE: f32 = 0.10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedQuery {
    pub enhanced_query: String,
    pub original_query: String,
    pub added_context: Vec<String>,
    /// Heuristic signal in `[0.5, 1.0]`; exactly 0.5 when nothing matched.
    pub confidence: f32,
}

impl EnhancedQuery {
    pub fn unchanged(query: &str) -> Self {
        Self {
            enhanced_query: query.trim().to_string(),
            original_query: query.to_string(),
            added_context: Vec::new(),
            confidence: BASE_CONFIDENCE,
        }
    }

    /// Append `phrase` to the query text and record `context`.
    pub fn add(&mut self, phrase: &str, context: String, confidence: f32) {
        let phrase = phrase.trim();
        if !phrase.is_empty() && !self.enhanced_query.to_lowercase().contains(&phrase.to_lowercase()) {
            if !self.enhanced_query.is_empty() {
                self.enhanced_query.push(' ');
            }
            self.enhanced_query.push_str(phrase);
        }
        self.added_context.push(context);
        self.confidence = (self.confidence + confidence).min(1.0);
    }
}

/// Result of a vertical's extra personalization pass.
#[derive(Debug, Default)]
pub struct Personalization {
    pub increment: f32,
    pub reasons: Vec<String>,
}

/// Reusable scoring skeleton. Verticals hold one and layer their own
/// detectors on top of [`BaseScorer::enhance`] and [`BaseScorer::filter`].
#[derive(Debug, Clone)]
pub struct BaseScorer {
    config: DomainConfig,
}

fn detect<'a>(query: &str, groups: &'a [KeywordGroup]) -> Option<&'a KeywordGroup> {
    best_bag(query, groups.iter().map(|g| (g, g.keywords.as_slice())))
}

fn same(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.trim().eq_ignore_ascii_case(b.trim()))
}

impl BaseScorer {
    pub fn new(config: DomainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    pub fn enhance(&self, query: &str, context: &DomainContext) -> EnhancedQuery {
        let mut enhanced = EnhancedQuery::unchanged(query);
        let lower = query.to_lowercase();

        let life_area = match &context.life_area {
            Some(area) => Some((area.clone(), self.config.life_area(area).map(|g| g.query_phrase.clone()))),
            None => detect(query, &self.config.life_areas).map(|g| (g.name.clone(), Some(g.query_phrase.clone()))),
        };
        if let Some((area, phrase)) = life_area {
            enhanced.add(phrase.as_deref().unwrap_or(&area), format!("life_area:{area}"), LIFE_AREA_CONFIDENCE);
        }

        let methodology = match &context.preferred_methodology {
            Some(m) => Some((m.clone(), self.config.methodology(m).map(|g| g.query_phrase.clone()))),
            None => detect(query, &self.config.methodologies).map(|g| (g.name.clone(), Some(g.query_phrase.clone()))),
        };
        if let Some((name, phrase)) = methodology {
            enhanced.add(phrase.as_deref().unwrap_or(&name), format!("methodology:{name}"), METHODOLOGY_CONFIDENCE);
        }

        if !context.user_goals.is_empty() {
            let goals = context.user_goals.join(", ");
            enhanced.add(&goals, format!("goals:{goals}"), GOAL_CONFIDENCE);
        } else if keyword_hits(&lower, &self.config.goal_keywords) > 0 {
            enhanced.add("", "goals:query".to_string(), GOAL_CONFIDENCE);
        }

        if let Some(level) = context.complexity_level {
            enhanced.add(&format!("{level} level"), format!("complexity:{level}"), COMPLEXITY_CONFIDENCE);
        }

        let domain_hits = keyword_hits(&lower, &self.config.domain_keywords);
        if domain_hits > 0 {
            enhanced.add("", format!("domain_keywords:{domain_hits}"), DOMAIN_KEYWORD_CONFIDENCE);
        }
        enhanced
    }

    /// Threshold, personalize, boost and re-rank.
    ///
    /// `extra` lets a vertical contribute its own personalization increment.
    pub fn filter<F>(&self, results: Vec<SearchResult>, context: &DomainContext, extra: F) -> Vec<SearchResult>
    where
        F: Fn(&SearchResult, &DomainContext) -> Personalization,
    {
        let config = &self.config;
        let before = results.len();
        let mut kept: Vec<SearchResult> = results
            .into_iter()
            .filter(|r| r.similarity >= config.minimum_relevance_score)
            .map(|mut result| {
                let original = result.similarity;
                let meta = &result.metadata;
                let mut reasons = Vec::new();
                let mut personalization = 0.0;
                let mut boosted = original;

                if same(meta.methodology.as_deref(), context.preferred_methodology.as_deref()) {
                    personalization += config.personalization.methodology;
                    boosted *= config.boosts.methodology;
                    reasons.push("methodology match".to_string());
                }
                if same(meta.life_area.as_deref(), context.life_area.as_deref()) {
                    personalization += config.personalization.life_area;
                    boosted *= config.boosts.life_area;
                    reasons.push("life area match".to_string());
                }
                if meta.complexity_level.is_some() && meta.complexity_level == context.complexity_level {
                    personalization += config.personalization.complexity;
                    boosted *= config.boosts.complexity;
                    reasons.push("complexity match".to_string());
                }
                if meta.evidence_level == Some(EvidenceLevel::ResearchBased) {
                    personalization += config.personalization.research_based;
                    boosted *= config.boosts.research_based;
                    reasons.push("research-based".to_string());
                }
                let vertical = extra(&result, context);
                personalization += vertical.increment;
                reasons.extend(vertical.reasons);
                let personalization = personalization.clamp(0.0, 1.0);

                let final_score =
                    config.score_weights.boosted * boosted + config.score_weights.personalization * personalization;
                result.similarity = final_score.max(0.0);
                result.scoring = Some(ScoreTrail {
                    original_score: original,
                    boosted_score: boosted,
                    personalization_score: personalization,
                    filter_reasons: reasons,
                });
                result
            })
            .collect();
        kept.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        debug!(domain = %config.domain_id, before, after = kept.len(), "results filtered");
        kept
    }
}
