//! Program builder: resolves the component graph reachable from entry names
//!
//! Resolution is driven by an explicit work queue rather than recursion, so
//! deep or cyclic reference graphs never grow the call stack. Each name moves
//! through `Unvisited -> InProgress -> Resolved` at most once per build, which
//! means the provider is asked for any given component at most once.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::error::CoreError;
use crate::program::{Component, Program};
use crate::provider::DeclarationProvider;
use crate::resolver::PropertyResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum VisitState {
    #[default]
    Unvisited,
    InProgress,
    Resolved,
}

/// Per-build resolution state, dropped when the build returns
#[derive(Debug, Default)]
struct BuildState {
    visits: HashMap<String, VisitState>,
    queued: HashSet<String>,
    queue: VecDeque<String>,
    components: BTreeMap<String, Component>,
}

impl BuildState {
    fn state(&self, name: &str) -> VisitState {
        self.visits.get(name).copied().unwrap_or_default()
    }

    fn enqueue(&mut self, name: &str) {
        if self.queued.insert(name.to_string()) {
            tracing::debug!("ProgramBuilder: queued component '{}'", name);
            self.queue.push_back(name.to_string());
        }
    }
}

/// Builds [`Program`]s from a [`DeclarationProvider`]
pub struct ProgramBuilder<'a, P: DeclarationProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: DeclarationProvider + ?Sized> ProgramBuilder<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Resolve every component reachable from `entry_names`.
    ///
    /// Entry names become the program's local component names, in the given
    /// order with repeats collapsed. Fails only when the provider cannot
    /// produce declarations for a requested component; no partial program is
    /// returned in that case.
    pub fn build<I, N>(&self, entry_names: I) -> Result<Program, CoreError>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let mut local_component_names: Vec<String> = Vec::new();
        for name in entry_names {
            let name = name.into();
            if !local_component_names.contains(&name) {
                local_component_names.push(name);
            }
        }
        if local_component_names.is_empty() {
            return Err(CoreError::EmptyEntrySet);
        }

        tracing::debug!(
            "ProgramBuilder: building from {:?} with provider '{}'",
            local_component_names,
            self.provider.name()
        );

        let mut state = BuildState::default();
        for name in &local_component_names {
            state.enqueue(name);
        }

        let resolver = PropertyResolver::new(self.provider);

        while let Some(name) = state.queue.pop_front() {
            if state.state(&name) == VisitState::Resolved {
                continue;
            }
            state.visits.insert(name.clone(), VisitState::InProgress);

            let declarations = self.provider.lookup(&name).map_err(|err| {
                tracing::error!("ProgramBuilder: provider failed for '{}': {}", name, err);
                CoreError::from(err)
            })?;
            tracing::debug!(
                "ProgramBuilder: resolving '{}' ({} declarations)",
                name,
                declarations.len()
            );

            let component = resolver.resolve_component(&name, &declarations);

            for referenced in component.referenced_components() {
                match state.state(referenced) {
                    VisitState::Unvisited => state.enqueue(referenced),
                    VisitState::InProgress => {
                        tracing::trace!("ProgramBuilder: '{}' references itself", name);
                    }
                    VisitState::Resolved => {
                        tracing::trace!(
                            "ProgramBuilder: '{}' already resolved, referenced from '{}'",
                            referenced,
                            name
                        );
                    }
                }
            }

            state.visits.insert(name.clone(), VisitState::Resolved);
            state.components.insert(name, component);
        }

        let program = Program::new(state.components, local_component_names);
        tracing::info!(
            "Resolved {} component(s), {} ambiguous property type(s)",
            program.len(),
            program.diagnostics().count()
        );
        Ok(program)
    }
}
