//! # Dependency Resolver
//!
//! Orders named items so that every item comes after everything it depends on.
//!
//! Uses Kahn's algorithm. Items with no ordering constraint between them keep
//! their registration order, which makes build order reproducible.

use std::collections::{HashMap, VecDeque};

use crate::error::{TerrainError, TerrainResult};

/// Topological sorter over string-named items.
#[derive(Debug, Default, Clone)]
pub struct DependencyResolver {
    /// Item name -> index.
    indices: HashMap<String, usize>,
    /// Index -> item name, in registration order.
    names: Vec<String>,
    /// For each item, the items that depend on it (dependency -> dependent edges).
    dependents: Vec<Vec<usize>>,
    /// For each item, the items it depends on.
    dependencies: Vec<Vec<usize>>,
}

impl DependencyResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an item. Re-adding a known item is a no-op.
    pub fn add_item(&mut self, name: &str) {
        if self.indices.contains_key(name) {
            return;
        }
        self.indices.insert(name.to_owned(), self.names.len());
        self.names.push(name.to_owned());
        self.dependents.push(Vec::new());
        self.dependencies.push(Vec::new());
    }

    /// Returns true if `name` has been registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Records that `dependent` must come after `dependency`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` if either name was never added.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> TerrainResult<()> {
        let dependent = self.index_of(dependent)?;
        let dependency = self.index_of(dependency)?;

        if !self.dependents[dependency].contains(&dependent) {
            self.dependents[dependency].push(dependent);
        }
        if !self.dependencies[dependent].contains(&dependency) {
            self.dependencies[dependent].push(dependency);
        }
        Ok(())
    }

    /// Records several dependencies of `dependent` at once.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` on the first unknown name.
    pub fn add_dependencies<I, S>(&mut self, dependent: &str, dependencies: I) -> TerrainResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dependency in dependencies {
            self.add_dependency(dependent, dependency.as_ref())?;
        }
        Ok(())
    }

    /// Returns the direct dependencies of `dependent`, in the order they were declared.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` if `dependent` was never added.
    pub fn dependencies(&self, dependent: &str) -> TerrainResult<Vec<&str>> {
        let index = self.index_of(dependent)?;
        Ok(self.dependencies[index]
            .iter()
            .map(|&i| self.names[i].as_str())
            .collect())
    }

    /// Produces a build order in which every item follows its dependencies.
    ///
    /// # Errors
    ///
    /// Returns `CircularDependency` with a full dump of items, adjacency lists and
    /// the partial order if the graph has a cycle.
    pub fn solve(&self) -> TerrainResult<Vec<String>> {
        let mut in_degree = vec![0usize; self.names.len()];
        for dependents in &self.dependents {
            for &dependent in dependents {
                in_degree[dependent] += 1;
            }
        }

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(index, _)| index)
            .collect();

        let mut resolved = Vec::with_capacity(self.names.len());

        while let Some(index) = queue.pop_front() {
            resolved.push(self.names[index].clone());

            for &dependent in &self.dependents[index] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if resolved.len() != self.names.len() {
            return Err(TerrainError::CircularDependency {
                items: self.names.clone(),
                adjacency: self
                    .names
                    .iter()
                    .zip(&self.dependents)
                    .map(|(name, dependents)| {
                        (
                            name.clone(),
                            dependents.iter().map(|&i| self.names[i].clone()).collect(),
                        )
                    })
                    .collect(),
                resolved,
            });
        }

        Ok(resolved)
    }

    fn index_of(&self, name: &str) -> TerrainResult<usize> {
        self.indices
            .get(name)
            .copied()
            .ok_or_else(|| TerrainError::UnknownItem(name.to_owned()))
    }
}
