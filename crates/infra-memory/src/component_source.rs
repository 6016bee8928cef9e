// Static component source
// Components are registered up front by the composition root

use std::any::Any;
use std::sync::Arc;
use steward_core::domain::{Candidate, TypeName};
use steward_core::port::ComponentSource;

#[derive(Debug, Clone, Default)]
pub struct StaticComponentSource {
    candidates: Vec<Candidate>,
}

impl StaticComponentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workflow<I, S>(mut self, implementation: impl Into<String>, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates
            .push(Candidate::workflow(implementation, interfaces));
        self
    }

    pub fn with_activity<I, S, T>(
        mut self,
        implementation: impl Into<String>,
        interfaces: I,
        instance: T,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: Any + Send + Sync,
    {
        self.candidates.push(Candidate::activity(
            implementation,
            interfaces,
            Arc::new(instance),
        ));
        self
    }

    /// A component that is neither workflow nor activity
    pub fn with_other(mut self, type_name: impl Into<TypeName>) -> Self {
        self.candidates.push(Candidate::Unclassified(type_name.into()));
        self
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl ComponentSource for StaticComponentSource {
    fn candidates(&self) -> Vec<Candidate> {
        self.candidates.clone()
    }
}
