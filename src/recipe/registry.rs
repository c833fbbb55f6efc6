// src/recipe/registry.rs

//! Static registry of known recipes
//!
//! All concrete recipes are constructed once from the shared settings and
//! looked up by name. Build order is derived from the dependency graph, never
//! from registration order.

use crate::error::{Error, Result};
use crate::recipe::{Recipe, RecipeGraph};
use crate::recipes;
use crate::settings::ProjectSettings;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub struct RecipeRegistry {
    recipes: BTreeMap<String, Arc<dyn Recipe>>,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recipe this crate ships, built for `settings`
    pub fn standard(settings: &Arc<ProjectSettings>) -> Self {
        let mut registry = Self::new();
        for recipe in recipes::all(settings) {
            registry.register(recipe);
        }
        registry
    }

    /// Add a recipe, replacing any recipe with the same name
    pub fn register(&mut self, recipe: Arc<dyn Recipe>) {
        debug!("Registering recipe {}", recipe.name());
        self.recipes.insert(recipe.name().to_string(), recipe);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Recipe>> {
        self.recipes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRecipe(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.recipes.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Dependency graph over every registered recipe
    pub fn graph(&self) -> RecipeGraph {
        let mut graph = RecipeGraph::new();
        for recipe in self.recipes.values() {
            let deps = recipe.dependencies();
            let names: Vec<&str> = deps.iter().map(|d| d.name()).collect();
            graph.add_recipe(recipe.name(), &names);
        }
        graph
    }

    /// The requested recipes plus everything they depend on, in build order
    ///
    /// An empty `targets` selects every registered recipe.
    pub fn build_order(&self, targets: &[String]) -> Result<Vec<Arc<dyn Recipe>>> {
        let mut graph = self.graph();

        if !targets.is_empty() {
            if let Some(unknown) = targets.iter().find(|t| !self.recipes.contains_key(*t)) {
                return Err(Error::UnknownRecipe(unknown.clone()));
            }
            let roots: Vec<&str> = targets.iter().map(String::as_str).collect();
            graph = graph.closure(&roots);
        }

        graph
            .topological_sort()?
            .into_iter()
            .map(|name| self.get(&name))
            .collect()
    }
}
