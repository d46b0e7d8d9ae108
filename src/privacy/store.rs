//! Lock-free configuration store with hot-swapping

use crate::config::{ConfigUpdate, ValidatorConfig};
use crate::error::Result;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Holds the active [`ValidatorConfig`] snapshot.
///
/// Readers get an `Arc` to an immutable snapshot. Updates build a new
/// snapshot and swap it in, so a reader sees either the old or the new
/// configuration in full.
pub struct ConfigStore {
    current: ArcSwap<ValidatorConfig>,
    generation: AtomicU64,
}

impl ConfigStore {
    /// Create a store holding the given configuration
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            current: ArcSwap::from_pointee(config),
            generation: AtomicU64::new(0),
        })
    }

    /// Current configuration snapshot
    pub fn snapshot(&self) -> Arc<ValidatorConfig> {
        self.current.load_full()
    }

    /// Number of successful updates applied so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Merge the supplied fields into the current configuration.
    ///
    /// Invalid updates are rejected and leave the configuration untouched.
    /// Concurrent updates are applied one after another; none is lost.
    pub fn update(&self, update: &ConfigUpdate) -> Result<Arc<ValidatorConfig>> {
        update.validate()?;

        self.current.rcu(|current| update.apply(current));
        self.generation.fetch_add(1, Ordering::Release);

        let snapshot = self.snapshot();
        tracing::info!(
            generation = self.generation(),
            max_data_size = snapshot.max_data_size,
            encrypt_threshold = snapshot.encrypt_threshold,
            log_violations = snapshot.log_violations,
            "Validator configuration updated"
        );
        Ok(snapshot)
    }

    /// Replace the whole configuration
    pub fn replace(&self, config: ValidatorConfig) -> Result<Arc<ValidatorConfig>> {
        config.validate()?;
        let config = Arc::new(config);
        self.current.store(Arc::clone(&config));
        self.generation.fetch_add(1, Ordering::Release);
        Ok(config)
    }

    /// Restore the default configuration
    pub fn reset(&self) -> Arc<ValidatorConfig> {
        let config = Arc::new(ValidatorConfig::default());
        self.current.store(Arc::clone(&config));
        self.generation.fetch_add(1, Ordering::Release);
        config
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            current: ArcSwap::from_pointee(ValidatorConfig::default()),
            generation: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_update_and_snapshot() {
        let store = ConfigStore::default();
        let before = store.snapshot();

        let after = store
            .update(&ConfigUpdate {
                max_data_size: Some(100),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(after.max_data_size, 100);
        assert_eq!(store.snapshot().max_data_size, 100);
        assert_eq!(after.strict_mode, before.strict_mode);
        assert_eq!(after.allowed_data_types, before.allowed_data_types);
        assert_eq!(after.require_encryption, before.require_encryption);
        assert_eq!(after.log_violations, before.log_violations);
        assert_eq!(store.generation(), 1);
        // Old snapshots are unaffected
        assert_eq!(before.max_data_size, ValidatorConfig::default().max_data_size);
    }

    #[test]
    fn test_invalid_update_keeps_previous_config() {
        let store = ConfigStore::default();
        store
            .update(&ConfigUpdate {
                max_data_size: Some(64),
                ..Default::default()
            })
            .unwrap();

        let err = store.update(&ConfigUpdate {
            max_data_size: Some(-5),
            log_violations: Some(false),
            ..Default::default()
        });
        assert!(err.is_err());
        assert_eq!(store.snapshot().max_data_size, 64);
        assert!(store.snapshot().log_violations);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ValidatorConfig {
            max_data_size: 0,
            ..Default::default()
        };
        assert!(ConfigStore::new(config).is_err());
    }

    #[test]
    fn test_replace_and_reset() {
        let store = ConfigStore::default();
        store
            .replace(ValidatorConfig {
                strict_mode: false,
                ..Default::default()
            })
            .unwrap();
        assert!(!store.snapshot().strict_mode);

        store.reset();
        assert_eq!(*store.snapshot(), ValidatorConfig::default());
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(ConfigStore::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let update = if i % 2 == 0 {
                        ConfigUpdate {
                            strict_mode: Some(false),
                            ..Default::default()
                        }
                    } else {
                        ConfigUpdate {
                            log_violations: Some(false),
                            ..Default::default()
                        }
                    };
                    store.update(&update).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert!(!snapshot.strict_mode);
        assert!(!snapshot.log_violations);
        assert_eq!(store.generation(), 8);
    }
}
