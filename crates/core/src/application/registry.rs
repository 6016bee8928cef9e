// Queue Registry
//
// Written only through `&mut` during the discovery pass, then published
// immutably by RegistryLifecycle. Readers never contend with writers.

use crate::domain::{QueueId, Role, TypeBinding, TypeName};
use std::collections::HashMap;

/// Type -> queue mapping, partitioned by role
#[derive(Debug, Clone, Default)]
pub struct QueueRegistry {
    workflows: HashMap<TypeName, QueueId>,
    activities: HashMap<TypeName, QueueId>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a type to a queue if it is not bound yet (first writer wins)
    ///
    /// Returns `false` when the type was already bound in either partition;
    /// the existing binding is left untouched.
    pub fn bind(&mut self, type_name: &str, queue: &str, role: Role) -> bool {
        if self.contains(type_name) {
            return false;
        }

        let partition = match role {
            Role::Workflow => &mut self.workflows,
            Role::Activity => &mut self.activities,
        };
        partition.insert(type_name.to_string(), queue.to_string());
        true
    }

    /// Look up a type: workflow partition first, then activity partition
    pub fn resolve(&self, type_name: &str) -> Option<&str> {
        self.workflows
            .get(type_name)
            .or_else(|| self.activities.get(type_name))
            .map(String::as_str)
    }

    pub fn binding(&self, type_name: &str) -> Option<TypeBinding> {
        if let Some(queue) = self.workflows.get(type_name) {
            return Some(TypeBinding::new(type_name, queue, Role::Workflow));
        }
        self.activities
            .get(type_name)
            .map(|queue| TypeBinding::new(type_name, queue, Role::Activity))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.workflows.contains_key(type_name) || self.activities.contains_key(type_name)
    }

    /// All bindings, sorted by role then type name
    pub fn bindings(&self) -> Vec<TypeBinding> {
        let mut all: Vec<TypeBinding> = self
            .workflows
            .iter()
            .map(|(t, q)| TypeBinding::new(t, q, Role::Workflow))
            .chain(
                self.activities
                    .iter()
                    .map(|(t, q)| TypeBinding::new(t, q, Role::Activity)),
            )
            .collect();
        all.sort_by(|a, b| {
            (a.role == Role::Activity, &a.type_name).cmp(&(b.role == Role::Activity, &b.type_name))
        });
        all
    }

    pub fn len(&self) -> usize {
        self.workflows.len() + self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_bind_first_writer_wins() {
        let mut registry = QueueRegistry::new();
        assert!(registry.bind("X", "Q1", Role::Workflow));
        assert!(!registry.bind("X", "Q2", Role::Workflow));
        assert_eq!(registry.resolve("X"), Some("Q1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_type_lives_in_one_partition_only() {
        let mut registry = QueueRegistry::new();
        assert!(registry.bind("X", "Q1", Role::Activity));
        assert!(!registry.bind("X", "Q2", Role::Workflow));
        assert_eq!(
            registry.binding("X"),
            Some(TypeBinding::new("X", "Q1", Role::Activity))
        );
    }

    #[test]
    fn test_resolve_falls_back_to_activity_partition() {
        let mut registry = QueueRegistry::new();
        registry.bind("KitchenActivities", "KITCHEN_QUEUE", Role::Activity);
        assert_eq!(registry.resolve("KitchenActivities"), Some("KITCHEN_QUEUE"));
        assert_eq!(registry.resolve("Unknown"), None);
    }

    #[test]
    fn test_bindings_sorted_workflows_first() {
        let mut registry = QueueRegistry::new();
        registry.bind("b", "Q", Role::Activity);
        registry.bind("z", "Q", Role::Workflow);
        registry.bind("a", "Q", Role::Workflow);
        let names: Vec<_> = registry
            .bindings()
            .into_iter()
            .map(|b| b.type_name)
            .collect();
        assert_eq!(names, vec!["a", "z", "b"]);
    }

    #[test]
    fn test_concurrent_reads_after_publish() {
        let mut registry = QueueRegistry::new();
        for i in 0..100 {
            registry.bind(&format!("Type{}", i), &format!("Q{}", i % 7), Role::Workflow);
        }
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let expected = format!("Q{}", i % 7);
                        assert_eq!(registry.resolve(&format!("Type{}", i)), Some(expected.as_str()));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
