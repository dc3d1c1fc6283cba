//! Merge strategies
//!
//! Three deterministic, total strategies combine two ordered identifier
//! sequences. No conflict state exists: the result is always defined, so
//! merges never stop for interactive resolution.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Current order first, then novel incoming items in incoming order
    #[default]
    Union,
    /// Every incoming item appended; identity is per-uri, so duplicates
    /// collapse and this behaves like union
    Append,
    /// Items present on both sides, in current order
    Intersection,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Union => "union",
            MergeStrategy::Append => "append",
            MergeStrategy::Intersection => "intersection",
        }
    }

    /// Combine two ordered uri sequences
    pub fn combine(&self, current: &[String], incoming: &[String]) -> Vec<String> {
        match self {
            MergeStrategy::Union | MergeStrategy::Append => {
                let known: HashSet<&String> = current.iter().collect();
                current
                    .iter()
                    .cloned()
                    .chain(incoming.iter().filter(|uri| !known.contains(uri)).cloned())
                    .collect()
            }
            MergeStrategy::Intersection => {
                let incoming_set: HashSet<&String> = incoming.iter().collect();
                current
                    .iter()
                    .filter(|uri| incoming_set.contains(uri))
                    .cloned()
                    .collect()
            }
        }
    }
}

impl std::str::FromStr for MergeStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(MergeStrategy::Union),
            "append" => Ok(MergeStrategy::Append),
            "intersection" => Ok(MergeStrategy::Intersection),
            other => Err(anyhow::anyhow!("unknown merge strategy: {}", other)),
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
