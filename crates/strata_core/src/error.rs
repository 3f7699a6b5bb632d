//! # Terrain Error Types
//!
//! All errors that can occur while building or querying a generator.

use thiserror::Error;

/// Errors that can occur in the terrain engine.
///
/// None of these are transient: every variant is a configuration or call-site
/// mistake that the caller has to fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    /// The dependency graph contains a cycle.
    #[error(
        "circular dependency found\nitems: {}\nadjacency lists:\n{}resolved: {}\nresolved {} of {} items",
        .items.join(", "),
        format_adjacency(.adjacency),
        .resolved.join(", "),
        .resolved.len(),
        .items.len()
    )]
    CircularDependency {
        /// Every registered item, in registration order.
        items: Vec<String>,
        /// For each item, the items that depend on it.
        adjacency: Vec<(String, Vec<String>)>,
        /// The partial order reached before the cycle stalled the sort.
        resolved: Vec<String>,
    },

    /// A name was used with the resolver before being added to it.
    #[error("'{0}' has not been added to this dependency resolver")]
    UnknownItem(String),

    /// A layer or feature refers to a dependency that was never registered.
    #[error("'{dependent}' depends on '{dependency}', which is not registered")]
    UnknownDependency {
        /// The item declaring the dependency.
        dependent: String,
        /// The missing dependency.
        dependency: String,
    },

    /// Feature lookup by name failed.
    #[error("there is no feature named '{0}'")]
    UnknownFeature(String),

    /// Layer lookup by name failed.
    #[error("there is no layer named '{0}'")]
    UnknownLayer(String),

    /// Two layers of one feature, or two features of one generator, share a name.
    #[error("duplicate name: '{0}'")]
    DuplicateName(String),

    /// Modifier/blend counts or option values do not fit together.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Lattice-refinement noise needs square chunks whose side is a power of two plus one.
    #[error("invalid chunk dimension {width}x{height}: lattice refinement needs square chunks of side 2^n + 1")]
    InvalidDimension {
        /// Requested chunk width.
        width: usize,
        /// Requested chunk height.
        height: usize,
    },

    /// A compute step or blend produced a grid that is not chunk-sized.
    #[error("grid is {}x{}, expected {}x{}", .found.0, .found.1, .expected.0, .expected.1)]
    DimensionMismatch {
        /// Expected (width, height).
        expected: (usize, usize),
        /// Actual (width, height).
        found: (usize, usize),
    },

    /// The chunk cache cannot grow to cover this coordinate.
    #[error("chunk [{x},{y}] is outside the range a chunk cache can cover")]
    ChunkOutOfRange {
        /// Requested chunk X.
        x: i32,
        /// Requested chunk Y.
        y: i32,
    },
}

/// Result type for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;

fn format_adjacency(adjacency: &[(String, Vec<String>)]) -> String {
    adjacency
        .iter()
        .map(|(item, dependents)| format!("{item}: [ {} ]\n", dependents.join(" ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_dependency_dump() {
        let err = TerrainError::CircularDependency {
            items: vec!["a".into(), "b".into(), "c".into()],
            adjacency: vec![
                ("a".into(), vec!["b".into()]),
                ("b".into(), vec!["a".into()]),
                ("c".into(), vec![]),
            ],
            resolved: vec!["c".into()],
        };

        let text = err.to_string();
        assert!(text.contains("items: a, b, c"), "{text}");
        assert!(text.contains("a: [ b ]"), "{text}");
        assert!(text.contains("b: [ a ]"), "{text}");
        assert!(text.contains("resolved: c"), "{text}");
        assert!(text.contains("resolved 1 of 3 items"), "{text}");
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = TerrainError::DimensionMismatch {
            expected: (17, 17),
            found: (16, 17),
        };
        assert_eq!(err.to_string(), "grid is 16x17, expected 17x17");
    }
}
