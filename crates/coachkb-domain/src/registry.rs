//! Domain id → adapter, instantiated lazily and cached.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use coachkb_core::config::Config;
use coachkb_core::{Error, Result};

use crate::adapters::{CareerCoachingAdapter, DomainAdapter, GeneralAdapter, LifeCoachingAdapter};
use crate::config::{DomainConfig, CAREER_COACHING_DOMAIN, GENERAL_DOMAIN, LIFE_COACHING_DOMAIN};

pub type AdapterFactory = Arc<dyn Fn(DomainConfig) -> Arc<dyn DomainAdapter> + Send + Sync>;

struct Registration {
    config: DomainConfig,
    factory: AdapterFactory,
}

fn general_factory() -> AdapterFactory {
    Arc::new(|config: DomainConfig| -> Arc<dyn DomainAdapter> { Arc::new(GeneralAdapter::new(config)) })
}

/// Owns one adapter instance per domain. Unknown ids resolve to the
/// general adapter.
///
/// Lock order is registrations, then cache.
pub struct AdapterRegistry {
    registrations: RwLock<HashMap<String, Registration>>,
    cache: Mutex<HashMap<String, Arc<dyn DomainAdapter>>>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl AdapterRegistry {
    /// Registry with no registrations; every id falls back to a general
    /// adapter with the built-in general config.
    pub fn empty() -> Self {
        Self { registrations: RwLock::new(HashMap::new()), cache: Mutex::new(HashMap::new()) }
    }

    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        registry.register(GENERAL_DOMAIN, DomainConfig::general(), general_factory());
        registry.register(
            LIFE_COACHING_DOMAIN,
            DomainConfig::life_coaching(),
            Arc::new(|config: DomainConfig| -> Arc<dyn DomainAdapter> { Arc::new(LifeCoachingAdapter::new(config)) }),
        );
        registry.register(
            CAREER_COACHING_DOMAIN,
            DomainConfig::career_coaching(),
            Arc::new(|config: DomainConfig| -> Arc<dyn DomainAdapter> { Arc::new(CareerCoachingAdapter::new(config)) }),
        );
        registry
    }

    /// Built-ins overlaid with the `domains.<id>` tables of `config`.
    /// Ids without a built-in get a general adapter with their own config.
    pub fn with_config(config: &Config) -> anyhow::Result<Self> {
        let registry = Self::with_builtins();
        for domain_id in config.table_keys("domains") {
            let base = DomainConfig::builtin(&domain_id)
                .unwrap_or_else(|| DomainConfig { domain_id: domain_id.clone(), ..DomainConfig::general() });
            let mut domain_config = config.overlay(&format!("domains.{domain_id}"), base)?;
            domain_config.domain_id = domain_id.clone();
            if registry.is_registered(&domain_id) {
                registry.update_config(&domain_id, domain_config)?;
            } else {
                registry.register(&domain_id, domain_config, general_factory());
            }
            info!(domain = %domain_id, "domain configured");
        }
        Ok(registry)
    }

    /// Add or replace a domain. Any cached instance is dropped.
    pub fn register(&self, domain_id: &str, config: DomainConfig, factory: AdapterFactory) {
        let mut registrations = self.registrations.write();
        registrations.insert(domain_id.to_string(), Registration { config, factory });
        self.cache.lock().remove(domain_id);
    }

    pub fn is_registered(&self, domain_id: &str) -> bool {
        self.registrations.read().contains_key(domain_id)
    }

    pub fn domains(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.registrations.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// The cached adapter for `domain_id`, created on first access.
    ///
    /// Check-then-create runs under the cache lock, so concurrent first
    /// accesses share one instance.
    pub fn get_adapter(&self, domain_id: &str) -> Arc<dyn DomainAdapter> {
        let registrations = self.registrations.read();
        let key = if registrations.contains_key(domain_id) { domain_id } else { GENERAL_DOMAIN };
        let mut cache = self.cache.lock();
        if let Some(adapter) = cache.get(key) {
            return Arc::clone(adapter);
        }
        let adapter = match registrations.get(key) {
            Some(registration) => (registration.factory)(registration.config.clone()),
            None => Arc::new(GeneralAdapter::new(DomainConfig::general())) as Arc<dyn DomainAdapter>,
        };
        info!(domain = key, requested = domain_id, "adapter instantiated");
        cache.insert(key.to_string(), Arc::clone(&adapter));
        adapter
    }

    /// Replace a registered domain's config; the next access re-instantiates.
    pub fn update_config(&self, domain_id: &str, config: DomainConfig) -> Result<()> {
        let mut registrations = self.registrations.write();
        let registration = registrations
            .get_mut(domain_id)
            .ok_or_else(|| Error::NotFound(format!("domain '{domain_id}' is not registered")))?;
        registration.config = config;
        self.cache.lock().remove(domain_id);
        debug!(domain = domain_id, "adapter config updated");
        Ok(())
    }

    /// Drop the cached instance for `domain_id`, if any.
    pub fn invalidate(&self, domain_id: &str) {
        if self.cache.lock().remove(domain_id).is_some() {
            debug!(domain = domain_id, "adapter invalidated");
        }
    }
}
