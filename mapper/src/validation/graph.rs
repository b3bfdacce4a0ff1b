//! Group dependency graph.
//!
//! Built from the registry by unioning the `depends_on` sets of every
//! validator in a group. Before a session validates anything the graph is
//! checked: every dependency must name a registered group, and the graph
//! must be acyclic. Cycle detection is an iterative depth-first search so
//! deep chains cannot exhaust the stack.

use std::collections::{BTreeSet, HashMap};

use crate::error::{ConfigError, ConfigResult};

use super::registry::ValidatorRegistry;
use super::DependencyValidator;

/// Mapping from group name to the groups it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Group names in registration order.
    groups: Vec<String>,
    /// Dependencies, aligned with `groups`.
    depends_on: Vec<BTreeSet<String>>,
    node_map: HashMap<String, usize>,
}

/// Per-node traversal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl DependencyGraph {
    /// Derive the graph from the registry's row and cell validators.
    pub fn build(registry: &ValidatorRegistry) -> Self {
        let mut graph = Self::default();
        for group in registry.groups() {
            let row_deps = group.row_validators().iter().map(|v| v.depends_on());
            let cell_deps = group.cell_validators().iter().map(|v| v.depends_on());
            let deps = row_deps
                .chain(cell_deps)
                .flat_map(|set| set.iter().cloned())
                .collect();
            graph.insert(group.name().to_string(), deps);
        }
        graph
    }

    /// Build a graph directly from `(group, dependencies)` pairs, in order.
    pub fn from_edges<I, G, D, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (G, D)>,
        G: Into<String>,
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::default();
        for (group, deps) in edges {
            graph.insert(group.into(), deps.into_iter().map(Into::into).collect());
        }
        graph
    }

    fn insert(&mut self, group: String, deps: BTreeSet<String>) {
        match self.node_map.get(&group) {
            Some(&idx) => self.depends_on[idx].extend(deps),
            None => {
                self.node_map.insert(group.clone(), self.groups.len());
                self.groups.push(group);
                self.depends_on.push(deps);
            }
        }
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn contains(&self, group: &str) -> bool {
        self.node_map.contains_key(group)
    }

    /// Direct dependencies of `group`.
    pub fn dependencies(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.node_map.get(group).map(|&idx| &self.depends_on[idx])
    }

    /// Groups that directly depend on `group`.
    pub fn dependents(&self, group: &str) -> Vec<&str> {
        self.groups
            .iter()
            .zip(&self.depends_on)
            .filter(|(_, deps)| deps.contains(group))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Check referential integrity, then acyclicity.
    pub fn check(&self) -> ConfigResult<()> {
        self.check_references()?;
        match self.find_cycle() {
            Some(cycle) => Err(ConfigError::CyclicDependencyGroup { cycle }),
            None => Ok(()),
        }
    }

    fn check_references(&self) -> ConfigResult<()> {
        for (group, deps) in self.groups.iter().zip(&self.depends_on) {
            if let Some(missing) = deps.iter().find(|d| !self.contains(d)) {
                return Err(ConfigError::MissingDependencyGroup {
                    group: group.clone(),
                    missing: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Adjacency list by node index, dropping references to unknown groups.
    fn adjacency(&self) -> Vec<Vec<usize>> {
        self.depends_on
            .iter()
            .map(|deps| deps.iter().filter_map(|d| self.node_map.get(d).copied()).collect())
            .collect()
    }

    /// Return the members of the first cycle found, closed on its first group
    /// (`[a, b, a]`), or `None` when the graph is acyclic.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let adj = self.adjacency();
        let mut marks = vec![Mark::Unvisited; self.groups.len()];

        for start in 0..self.groups.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }

            // (node, index of the next edge to follow)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            marks[start] = Mark::InProgress;

            while let Some(top) = stack.len().checked_sub(1) {
                let (node, next) = stack[top];
                if next < adj[node].len() {
                    stack[top].1 += 1;
                    let dep = adj[node][next];
                    match marks[dep] {
                        Mark::Unvisited => {
                            marks[dep] = Mark::InProgress;
                            stack.push((dep, 0));
                        }
                        Mark::InProgress => {
                            if let Some(pos) = stack.iter().position(|&(n, _)| n == dep) {
                                let mut cycle: Vec<String> = stack[pos..]
                                    .iter()
                                    .map(|&(n, _)| self.groups[n].clone())
                                    .collect();
                                cycle.push(self.groups[dep].clone());
                                return Some(cycle);
                            }
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }

        None
    }

    /// Groups ordered so that every group follows its dependencies.
    ///
    /// Among groups that are ready at the same time, the one registered
    /// first runs first.
    pub fn execution_order(&self) -> ConfigResult<Vec<String>> {
        self.check()?;

        let adj = self.adjacency();
        let mut pending: Vec<usize> = adj.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.groups.len()];
        for (node, deps) in adj.iter().enumerate() {
            for &dep in deps {
                dependents[dep].push(node);
            }
        }

        let mut ready: BTreeSet<usize> =
            (0..self.groups.len()).filter(|&n| pending[n] == 0).collect();
        let mut order = Vec::with_capacity(self.groups.len());

        while let Some(node) = ready.pop_first() {
            order.push(self.groups[node].clone());
            for &dependent in &dependents[node] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != self.groups.len() {
            let cycle = (0..self.groups.len())
                .filter(|&n| pending[n] > 0)
                .map(|n| self.groups[n].clone())
                .collect();
            return Err(ConfigError::CyclicDependencyGroup { cycle });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::builtin::{FieldValidator, Required};

    const NONE: [&str; 0] = [];

    #[test]
    fn test_build_unions_group_dependencies() {
        let registry = ValidatorRegistry::new()
            .with_cell(FieldValidator::new("name", Required).in_group("required"))
            .with_cell(FieldValidator::new("code", Required).in_group("format"))
            .with_cell(FieldValidator::new("age", Required).in_group("age").requires(["required"]))
            .with_cell(FieldValidator::new("age", Required).in_group("age").requires(["format"]));

        let graph = DependencyGraph::build(&registry);
        let deps: Vec<&str> =
            graph.dependencies("age").unwrap().iter().map(String::as_str).collect();
        assert_eq!(deps, vec!["format", "required"]);
        assert!(graph.dependencies("required").unwrap().is_empty());
        assert_eq!(graph.dependents("required"), vec!["age"]);
    }

    #[test]
    fn test_missing_dependency() {
        let graph = DependencyGraph::from_edges([("age", vec!["required"])]);
        assert_eq!(
            graph.check(),
            Err(ConfigError::MissingDependencyGroup {
                group: "age".into(),
                missing: "required".into(),
            })
        );
    }

    #[test]
    fn test_three_node_cycle() {
        let graph =
            DependencyGraph::from_edges([("a", vec!["b"]), ("b", vec!["c"]), ("c", vec!["a"])]);
        match graph.check() {
            Err(ConfigError::CyclicDependencyGroup { cycle }) => {
                assert_eq!(cycle, vec!["a", "b", "c", "a"]);
            }
            other => panic!("Expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = DependencyGraph::from_edges([("a", vec!["a"])]);
        assert!(matches!(graph.check(), Err(ConfigError::CyclicDependencyGroup { .. })));
    }

    #[test]
    fn test_cycle_reported_deterministically() {
        let graph = DependencyGraph::from_edges([
            ("root", vec![]),
            ("x", vec!["root", "y"]),
            ("y", vec!["x"]),
        ]);
        let first = graph.check();
        for _ in 0..5 {
            assert_eq!(graph.check(), first);
        }
        assert!(matches!(first, Err(ConfigError::CyclicDependencyGroup { .. })));
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let graph = DependencyGraph::from_edges([
            ("setup", vec![]),
            ("left", vec!["setup"]),
            ("right", vec!["setup"]),
            ("join", vec!["left", "right"]),
        ]);
        assert!(graph.check().is_ok());
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn test_execution_order_respects_dependencies() {
        let graph = DependencyGraph::from_edges([
            ("age", vec!["required"]),
            ("date", vec!["required"]),
            ("required", vec![]),
        ]);
        let order = graph.execution_order().unwrap();
        assert_eq!(order, vec!["required", "age", "date"]);
    }

    #[test]
    fn test_independent_groups_keep_registration_order() {
        let graph = DependencyGraph::from_edges([("zeta", NONE), ("alpha", NONE), ("mid", NONE)]);
        assert_eq!(graph.execution_order().unwrap(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let edges: Vec<(String, Vec<String>)> = (0..50_000)
            .map(|i| {
                let deps = if i == 49_999 { vec![] } else { vec![format!("g{}", i + 1)] };
                (format!("g{}", i), deps)
            })
            .collect();
        let graph = DependencyGraph::from_edges(edges);
        assert!(graph.check().is_ok());
        let order = graph.execution_order().unwrap();
        assert_eq!(order.first().map(String::as_str), Some("g49999"));
        assert_eq!(order.last().map(String::as_str), Some("g0"));
    }
}
