//! Static registry with round-robin instance selection.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ServiceConfig;
use crate::discovery::ServiceResolver;

/// Instances of one service plus a rotation counter.
#[derive(Debug, Default)]
struct InstanceSet {
    instances: Vec<String>,
    counter: AtomicUsize,
}

impl InstanceSet {
    fn next(&self) -> Option<String> {
        if self.instances.is_empty() {
            return None;
        }
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % self.instances.len();
        Some(self.instances[index].clone())
    }
}

/// Resolver backed by the `[services]` configuration table.
#[derive(Debug, Default)]
pub struct StaticResolver {
    services: HashMap<String, InstanceSet>,
}

impl StaticResolver {
    pub fn new(services: &BTreeMap<String, ServiceConfig>) -> Self {
        let services = services
            .iter()
            .map(|(name, config)| {
                let set = InstanceSet {
                    instances: config.instances.clone(),
                    counter: AtomicUsize::new(0),
                };
                (name.to_ascii_uppercase(), set)
            })
            .collect();
        Self { services }
    }
}

impl ServiceResolver for StaticResolver {
    fn resolve(&self, service: &str) -> Option<String> {
        let resolved = self
            .services
            .get(&service.to_ascii_uppercase())
            .and_then(InstanceSet::next);
        if resolved.is_none() {
            tracing::debug!(service = %service, "No instances registered for service");
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin() {
        let mut services = BTreeMap::new();
        services.insert(
            "VIDEO-SERVICE".to_string(),
            ServiceConfig {
                instances: vec!["127.0.0.1:8080".into(), "127.0.0.1:8081".into()],
            },
        );
        let resolver = StaticResolver::new(&services);

        assert_eq!(resolver.resolve("VIDEO-SERVICE").unwrap(), "127.0.0.1:8080");
        assert_eq!(resolver.resolve("VIDEO-SERVICE").unwrap(), "127.0.0.1:8081");
        assert_eq!(resolver.resolve("VIDEO-SERVICE").unwrap(), "127.0.0.1:8080");
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut services = BTreeMap::new();
        services.insert(
            "user-service".to_string(),
            ServiceConfig {
                instances: vec!["10.0.0.1:9001".into()],
            },
        );
        let resolver = StaticResolver::new(&services);
        assert_eq!(resolver.resolve("USER-SERVICE").unwrap(), "10.0.0.1:9001");
        assert!(resolver.resolve("ANALYTICS-SERVICE").is_none());
    }
}
