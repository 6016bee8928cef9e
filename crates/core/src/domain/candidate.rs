// Discovery Candidate Domain Model
//
// The component source classifies its components before handing them over;
// the core never inspects runtime type metadata itself.

use super::binding::{Role, TypeName};
use super::naming::simple_name;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque activity implementation, passed through to the engine untouched
pub type ActivityObject = Arc<dyn Any + Send + Sync>;

/// Workflow implementation type offered by the component source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowComponent {
    /// Concrete implementation type (e.g. `PizzaWorkflowImpl`)
    pub implementation: TypeName,
    /// Declared workflow interfaces (e.g. `PizzaWorkflow`)
    pub interfaces: Vec<TypeName>,
}

/// Activity implementation instance offered by the component source
#[derive(Clone)]
pub struct ActivityComponent {
    pub implementation: TypeName,
    pub interfaces: Vec<TypeName>,
    pub instance: ActivityObject,
}

impl fmt::Debug for ActivityComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityComponent")
            .field("implementation", &self.implementation)
            .field("interfaces", &self.interfaces)
            .field("instance", &"<instance>")
            .finish()
    }
}

/// Classified component handed to discovery
#[derive(Debug, Clone)]
pub enum Candidate {
    Workflow(WorkflowComponent),
    Activity(ActivityComponent),
    Unclassified(TypeName),
}

impl Candidate {
    pub fn workflow<I, S>(implementation: impl Into<String>, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Candidate::Workflow(WorkflowComponent {
            implementation: implementation.into(),
            interfaces: interfaces.into_iter().map(Into::into).collect(),
        })
    }

    pub fn activity<I, S>(
        implementation: impl Into<String>,
        interfaces: I,
        instance: ActivityObject,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Candidate::Activity(ActivityComponent {
            implementation: implementation.into(),
            interfaces: interfaces.into_iter().map(Into::into).collect(),
            instance,
        })
    }

    /// Implementation type identifier
    pub fn type_name(&self) -> &str {
        match self {
            Candidate::Workflow(w) => &w.implementation,
            Candidate::Activity(a) => &a.implementation,
            Candidate::Unclassified(name) => name,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Candidate::Workflow(_) => Some(Role::Workflow),
            Candidate::Activity(_) => Some(Role::Activity),
            Candidate::Unclassified(_) => None,
        }
    }

    /// Declared interfaces (empty for unclassified components)
    pub fn interfaces(&self) -> &[TypeName] {
        match self {
            Candidate::Workflow(w) => &w.interfaces,
            Candidate::Activity(a) => &a.interfaces,
            Candidate::Unclassified(_) => &[],
        }
    }

    /// True if the identifier lies inside `base` (`base` or `base::...`)
    pub fn is_within(&self, base: &str) -> bool {
        let name = self.type_name();
        let base = base.trim_end_matches("::");
        name == base
            || name
                .strip_prefix(base)
                .is_some_and(|rest| rest.starts_with("::"))
    }

    /// Name matches either the full identifier or its last path segment
    pub fn matches(&self, type_name: &str) -> bool {
        let own = self.type_name();
        own == type_name || simple_name(own) == type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_scope_matching() {
        let c = Candidate::workflow("shop::pizza::PizzaWorkflowImpl", ["PizzaWorkflow"]);
        assert!(c.is_within("shop"));
        assert!(c.is_within("shop::pizza"));
        assert!(c.is_within("shop::pizza::"));
        assert!(!c.is_within("sho"));
        assert!(!c.is_within("billing"));
    }

    #[test]
    fn test_matches_simple_or_full_name() {
        let c = Candidate::Unclassified("shop::Clock".to_string());
        assert!(c.matches("Clock"));
        assert!(c.matches("shop::Clock"));
        assert!(!c.matches("Clocks"));
        assert_eq!(c.role(), None);
        assert!(c.interfaces().is_empty());
    }

    #[test]
    fn test_activity_candidate_accessors() {
        let c = Candidate::activity("KitchenActivitiesImpl", ["KitchenActivities"], Arc::new(()));
        assert_eq!(c.type_name(), "KitchenActivitiesImpl");
        assert_eq!(c.role(), Some(Role::Activity));
        assert_eq!(c.interfaces(), ["KitchenActivities".to_string()]);
    }
}
