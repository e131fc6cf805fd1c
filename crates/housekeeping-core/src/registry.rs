//! The rule registry: the fixed, ordered set of predicates applied together.
//!
//! A registry is assembled once at startup and never changes afterwards.
//! Rule names are the keys of every verdict record, so the registry rejects
//! empty and duplicate names at construction time.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use housekeeping_contracts::error::{HousekeepingError, HousekeepingResult};

use crate::traits::Predicate;

/// An ordered, immutable collection of predicates.
///
/// Share it across tasks with `Arc<RuleRegistry>`; it is read-only.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Predicate>>,
}

impl RuleRegistry {
    /// Build a registry from `rules`, keeping their order.
    ///
    /// Returns `HousekeepingError::ConfigError` if any rule has an empty name
    /// or if two rules share a name.
    pub fn new(rules: Vec<Box<dyn Predicate>>) -> HousekeepingResult<Self> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(rules.len());

        for (position, rule) in rules.iter().enumerate() {
            let name = rule.name();
            if name.trim().is_empty() {
                return Err(HousekeepingError::ConfigError {
                    reason: format!("rule at position {position} has an empty name"),
                });
            }
            if !seen.insert(name) {
                return Err(HousekeepingError::ConfigError {
                    reason: format!("duplicate rule name '{name}'"),
                });
            }
        }

        debug!(rule_count = rules.len(), "rule registry assembled");

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }

    /// The rules themselves, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Predicate> {
        self.rules.iter().map(|r| r.as_ref())
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use housekeeping_contracts::error::HousekeepingError;

    use super::RuleRegistry;
    use crate::traits::{FnPredicate, Predicate};

    fn rule(name: &str) -> Box<dyn Predicate> {
        Box::new(FnPredicate::new(name, |_s, _now| true))
    }

    #[test]
    fn preserves_declaration_order() {
        let registry =
            RuleRegistry::new(vec![rule("zeta"), rule("alpha"), rule("mid")]).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = RuleRegistry::new(vec![rule("image_prefix"), rule("other"), rule("image_prefix")]);

        match result {
            Err(HousekeepingError::ConfigError { reason }) => {
                assert!(reason.contains("duplicate"), "unexpected reason: {reason}");
                assert!(reason.contains("image_prefix"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = RuleRegistry::new(vec![rule("ok"), rule("  ")]);

        match result {
            Err(HousekeepingError::ConfigError { reason }) => {
                assert!(reason.contains("position 1"), "unexpected reason: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn empty_registry_is_allowed() {
        let registry = RuleRegistry::new(Vec::new()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(format!("{registry:?}"), "RuleRegistry { rules: [] }");
    }
}
