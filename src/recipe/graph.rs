// src/recipe/graph.rs

//! Recipe dependency graph for build ordering
//!
//! A directed graph over recipe names. An edge `a -> b` means `a` reads
//! `b`'s install tree while building, so `b` must be committed (or skipped
//! as cached) before `a` starts configuring.
//!
//! # Example
//!
//! ```
//! use larder::recipe::RecipeGraph;
//!
//! let mut graph = RecipeGraph::new();
//! graph.add_recipe("libbtc", &["mpir"]);
//! graph.add_recipe("libwebsockets", &["openssl"]);
//! graph.add_recipe("mpir", &[]);
//! graph.add_recipe("openssl", &[]);
//!
//! let order = graph.topological_sort().unwrap();
//! assert_eq!(order, vec!["mpir", "openssl", "libbtc", "libwebsockets"]);
//! ```
//!
//! Unlike bootstrap toolchains, native dependency recipes never need
//! circular builds: a cycle is a configuration error.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A directed graph representing recipe dependencies
#[derive(Debug, Default, Clone)]
pub struct RecipeGraph {
    /// Key: recipe name, Value: recipes it depends on
    edges: BTreeMap<String, BTreeSet<String>>,
    /// Key: recipe name, Value: recipes that depend on it
    reverse_edges: BTreeMap<String, BTreeSet<String>>,
}

impl RecipeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe with its dependencies
    ///
    /// If the recipe already exists, this merges the dependencies.
    pub fn add_recipe(&mut self, name: &str, dependencies: &[&str]) {
        self.edges.entry(name.to_string()).or_default();
        self.reverse_edges.entry(name.to_string()).or_default();

        for dep in dependencies {
            self.edges.entry(dep.to_string()).or_default();
            self.edges
                .entry(name.to_string())
                .or_default()
                .insert(dep.to_string());
            self.reverse_edges
                .entry(dep.to_string())
                .or_default()
                .insert(name.to_string());
        }
    }

    pub fn recipe_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Direct dependencies of a recipe
    pub fn dependencies(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(name)
    }

    /// Recipes that directly depend on this recipe
    pub fn dependents(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.reverse_edges.get(name)
    }

    /// Topological order using Kahn's algorithm (dependencies first)
    ///
    /// Ties are broken by name so the order is stable between runs.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        Ok(self.levels()?.into_iter().flatten().collect())
    }

    /// Group recipes into waves of mutually independent recipes
    ///
    /// Every recipe in wave `n` only depends on recipes in waves `< n`, so
    /// each wave can be cooked in parallel once the previous one finished.
    pub fn levels(&self) -> Result<Vec<Vec<String>>> {
        let mut in_degrees: BTreeMap<&str, usize> = self
            .edges
            .iter()
            .map(|(name, deps)| (name.as_str(), deps.len()))
            .collect();

        let mut current: Vec<String> = in_degrees
            .iter()
            .filter(|&(_, deg)| *deg == 0)
            .map(|(name, _)| name.to_string())
            .collect();

        let mut levels = Vec::new();
        let mut placed = 0;

        while !current.is_empty() {
            let mut next = BTreeSet::new();
            for node in &current {
                if let Some(dependents) = self.reverse_edges.get(node) {
                    for dependent in dependents {
                        if let Some(deg) = in_degrees.get_mut(dependent.as_str()) {
                            *deg = deg.saturating_sub(1);
                            if *deg == 0 {
                                next.insert(dependent.clone());
                            }
                        }
                    }
                }
            }
            placed += current.len();
            levels.push(current);
            current = next.into_iter().collect();
        }

        if placed != self.edges.len() {
            let cycles = self.find_cycles();
            let description = match cycles.first() {
                Some(cycle) => {
                    let mut path = cycle.clone();
                    path.push(cycle[0].clone());
                    path.join(" -> ")
                }
                None => "unresolvable recipes remain".to_string(),
            };
            return Err(Error::CycleError(description));
        }

        Ok(levels)
    }

    /// Find all cycles in the graph
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited = BTreeSet::new();
        let mut rec_stack = BTreeSet::new();
        let mut path = Vec::new();

        for start in self.edges.keys() {
            if !visited.contains(start) {
                self.find_cycles_dfs(start, &mut visited, &mut rec_stack, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn find_cycles_dfs(
        &self,
        node: &str,
        visited: &mut BTreeSet<String>,
        rec_stack: &mut BTreeSet<String>,
        path: &mut Vec<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(node.to_string());
        rec_stack.insert(node.to_string());
        path.push(node.to_string());

        if let Some(deps) = self.edges.get(node) {
            for dep in deps {
                if !visited.contains(dep) {
                    self.find_cycles_dfs(dep, visited, rec_stack, path, cycles);
                } else if rec_stack.contains(dep)
                    && let Some(cycle_start) = path.iter().position(|x| x == dep)
                {
                    cycles.push(path[cycle_start..].to_vec());
                }
            }
        }

        path.pop();
        rec_stack.remove(node);
    }

    /// All recipes a given recipe transitively depends on
    pub fn transitive_dependencies(&self, name: &str) -> BTreeSet<String> {
        Self::walk(&self.edges, name)
    }

    /// All recipes that transitively depend on a given recipe
    pub fn transitive_dependents(&self, name: &str) -> BTreeSet<String> {
        Self::walk(&self.reverse_edges, name)
    }

    fn walk(edges: &BTreeMap<String, BTreeSet<String>>, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&String> = VecDeque::new();

        if let Some(direct) = edges.get(name) {
            queue.extend(direct);
        }

        while let Some(next) = queue.pop_front() {
            if seen.insert(next.clone())
                && let Some(indirect) = edges.get(next)
            {
                queue.extend(indirect.iter().filter(|n| !seen.contains(*n)));
            }
        }

        seen
    }

    /// The subgraph containing `roots` and everything they depend on
    pub fn closure(&self, roots: &[&str]) -> Self {
        let mut keep: BTreeSet<String> = BTreeSet::new();
        for root in roots {
            keep.insert(root.to_string());
            keep.extend(self.transitive_dependencies(root));
        }

        let mut sub = Self::new();
        for name in &keep {
            let deps: Vec<&str> = self
                .edges
                .get(name)
                .map(|d| d.iter().map(String::as_str).collect())
                .unwrap_or_default();
            sub.add_recipe(name, &deps);
        }
        sub
    }
}
