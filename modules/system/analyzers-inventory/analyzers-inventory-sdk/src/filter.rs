//! Target node selection.

use std::collections::BTreeSet;

use crate::error::AnalyzersInventoryError;

/// Which nodes an inventory request is dispatched to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeFilter {
    /// Every live node.
    #[default]
    All,
    /// An explicit set of node identifiers.
    Ids(BTreeSet<String>),
}

impl NodeFilter {
    /// Builds an explicit filter from node identifiers.
    #[must_use]
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Ids(ids.into_iter().map(Into::into).collect())
    }

    /// Parses the comma-delimited `{nodeId}` path segment.
    ///
    /// An absent or blank value, `_all` and `*` select every node.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzersInventoryError::InvalidFilter`] when a segment is
    /// empty or contains whitespace or control characters, or when `_all`
    /// is mixed with explicit ids.
    pub fn parse(raw: Option<&str>) -> Result<Self, AnalyzersInventoryError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::All);
        };

        let mut ids = BTreeSet::new();
        let mut select_all = false;
        for segment in raw.split(',') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(AnalyzersInventoryError::InvalidFilter(format!(
                    "empty node id in '{raw}'"
                )));
            }
            if segment.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(AnalyzersInventoryError::InvalidFilter(format!(
                    "node id '{segment}' contains whitespace or control characters"
                )));
            }
            if segment == "_all" || segment == "*" {
                select_all = true;
            } else {
                ids.insert(segment.to_owned());
            }
        }

        match (select_all, ids.is_empty()) {
            (true, true) => Ok(Self::All),
            (true, false) => Err(AnalyzersInventoryError::InvalidFilter(format!(
                "'_all' cannot be combined with explicit node ids in '{raw}'"
            ))),
            (false, _) => Ok(Self::Ids(ids)),
        }
    }

    /// Resolves the filter against the live node set.
    ///
    /// The result is sorted and free of duplicates. Requested ids that are
    /// not live are dropped.
    #[must_use]
    pub fn resolve(&self, live_nodes: &[String]) -> Vec<String> {
        let live: BTreeSet<&String> = live_nodes.iter().collect();
        match self {
            Self::All => live.into_iter().cloned().collect(),
            Self::Ids(ids) => ids.iter().filter(|id| live.contains(id)).cloned().collect(),
        }
    }

    /// Requested ids that are absent from the live node set.
    #[must_use]
    pub fn unknown_ids(&self, live_nodes: &[String]) -> Vec<String> {
        match self {
            Self::All => Vec::new(),
            Self::Ids(ids) => ids
                .iter()
                .filter(|id| !live_nodes.contains(*id))
                .cloned()
                .collect(),
        }
    }
}
