//! coachkb-domain
//!
//! Domain adapters re-shape queries and re-score results for one vertical
//! (life coaching, career coaching, ...). A shared [`BaseScorer`] carries the
//! default behavior; [`AdapterRegistry`] maps domain ids to cached adapters.

pub mod adapters;
pub mod config;
pub mod registry;
pub mod scorer;

pub use adapters::{CareerCoachingAdapter, DomainAdapter, GeneralAdapter, LifeCoachingAdapter};
pub use config::{DomainConfig, KeywordGroup};
pub use registry::{AdapterFactory, AdapterRegistry};
pub use scorer::{BaseScorer, EnhancedQuery, Personalization};
