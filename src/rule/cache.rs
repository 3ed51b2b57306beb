//! Rule parsing cache

use crate::config::EngineConfig;
use crate::error::Result;
use crate::rule::ast::Node;
use crate::rule::evaluator;
use crate::rule::parser;
use crate::rule::value::Record;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

/// Upper bound on cached rules; a full cache is emptied before the next insert
pub const MAX_CACHED_RULES: usize = 1024;

/// Global rule cache keyed by exact rule text
static RULE_CACHE: Lazy<RwLock<AHashMap<String, Node>>> = Lazy::new(|| {
    let map = AHashMap::with_capacity(256);
    RwLock::new(map)
});

/// Get or parse a rule string, using the cache for repeated rules.
/// Parse failures are not cached.
#[inline]
pub fn get_or_parse(rule: &str) -> Result<Node> {
    {
        let cache = RULE_CACHE.read();
        if let Some(ast) = cache.get(rule) {
            return Ok(ast.clone());
        }
    }

    debug!(rule, "rule cache miss");
    let ast = parser::parse(rule)?;

    {
        let mut cache = RULE_CACHE.write();
        if cache.len() >= MAX_CACHED_RULES {
            debug!(size = cache.len(), "rule cache full, evicting all entries");
            cache.clear();
        }
        cache.insert(rule.to_string(), ast.clone());
    }

    Ok(ast)
}

/// Parse (cached) and evaluate a rule string against a record
#[inline]
pub fn check_rule(rule: &str, record: &Record, config: &EngineConfig) -> Result<bool> {
    let ast = get_or_parse(rule)?;
    evaluator::evaluate_with(&ast, record, config)
}

/// Clear the rule cache
pub fn clear_cache() {
    RULE_CACHE.write().clear();
}

/// Number of cached rules
pub fn cache_size() -> usize {
    RULE_CACHE.read().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingFieldPolicy;
    use crate::error::RuleError;
    use crate::rule::value::record;

    // The cache is process-wide and tests run in parallel: each test uses
    // its own keys, and any test may trigger an eviction, so presence of an
    // entry is never asserted.
    #[test]
    fn test_cache_hit() {
        let rec = record([("cache_hit_field", 10)]);
        let config = EngineConfig::default();

        assert!(check_rule("cache_hit_field > 5", &rec, &config).unwrap());
        assert!(check_rule("cache_hit_field > 5", &rec, &config).unwrap());
        assert!(!check_rule("cache_hit_field > 50", &rec, &config).unwrap());
        assert_eq!(
            get_or_parse("cache_hit_field > 5").unwrap(),
            parser::parse("cache_hit_field > 5").unwrap()
        );
    }

    #[test]
    fn test_errors_not_cached() {
        assert!(matches!(get_or_parse("cache_err_field >"), Err(RuleError::Syntax(_))));
        assert!(!RULE_CACHE.read().contains_key("cache_err_field >"));
    }

    #[test]
    fn test_clear_cache() {
        get_or_parse("cache_clear_field == 1").unwrap();
        clear_cache();
        assert!(!RULE_CACHE.read().contains_key("cache_clear_field == 1"));
    }

    #[test]
    fn test_cache_is_bounded() {
        for i in 0..(MAX_CACHED_RULES * 3) {
            get_or_parse(&format!("cache_bound_field > {}", i)).unwrap();
            assert!(cache_size() <= MAX_CACHED_RULES);
        }
    }

    #[test]
    fn test_check_rule_uses_config() {
        let rec = record([("cache_other_field", 1)]);

        let strict = EngineConfig::default();
        assert!(matches!(
            check_rule("cache_policy_field == 1", &rec, &strict),
            Err(RuleError::Evaluation(_))
        ));

        let lenient = EngineConfig::default().with_missing_field(MissingFieldPolicy::NoMatch);
        assert!(!check_rule("cache_policy_field == 1", &rec, &lenient).unwrap());
        assert!(check_rule("cache_policy_field != 1", &rec, &lenient).unwrap());
    }
}
