// Component Source Port
// The dependency container that supplies already-classified candidates

use crate::domain::{simple_name, Candidate};

/// Supplies every component known at discovery time
pub trait ComponentSource: Send + Sync {
    /// All components, classified as workflow, activity or neither
    fn candidates(&self) -> Vec<Candidate>;

    /// Find a component by implementation identifier, then by declared interface
    fn lookup(&self, type_name: &str) -> Option<Candidate> {
        let candidates = self.candidates();
        let by_implementation = candidates.iter().position(|c| c.matches(type_name));
        let index = by_implementation.or_else(|| {
            candidates
                .iter()
                .position(|c| {
                    c.interfaces()
                        .iter()
                        .any(|i| i == type_name || simple_name(i) == type_name)
                })
        })?;
        candidates.into_iter().nth(index)
    }
}

impl ComponentSource for Vec<Candidate> {
    fn candidates(&self) -> Vec<Candidate> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lookup_by_implementation_then_interface() {
        let source = vec![
            Candidate::workflow("shop::PizzaWorkflowImpl", ["PizzaWorkflow"]),
            Candidate::activity("KitchenActivitiesImpl", ["KitchenActivities"], Arc::new(())),
        ];

        let by_simple = source.lookup("PizzaWorkflowImpl").unwrap();
        assert_eq!(by_simple.type_name(), "shop::PizzaWorkflowImpl");

        let by_interface = source.lookup("KitchenActivities").unwrap();
        assert_eq!(by_interface.type_name(), "KitchenActivitiesImpl");

        assert!(source.lookup("Missing").is_none());
    }

    #[test]
    fn test_lookup_by_short_interface_name() {
        let source = vec![Candidate::workflow(
            "shop::pizza::PizzaWorkflowImpl",
            ["shop::pizza::PizzaWorkflow"],
        )];

        let found = source.lookup("PizzaWorkflow").unwrap();
        assert_eq!(found.type_name(), "shop::pizza::PizzaWorkflowImpl");
        assert!(source.lookup("pizza::PizzaWorkflow").is_none());
    }
}
