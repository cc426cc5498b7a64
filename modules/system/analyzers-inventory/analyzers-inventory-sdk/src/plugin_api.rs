//! Contract for extension modules that contribute analysis components.

use std::fmt;
use std::sync::Arc;

use crate::error::IntrospectionError;

/// An installed extension module contributing analysis components.
///
/// Every accessor defaults to "contributes nothing", so a plugin only
/// overrides the categories it actually provides.
pub trait AnalysisPlugin: Send + Sync {
    fn analyzers(&self) -> Vec<String> {
        Vec::new()
    }

    fn tokenizers(&self) -> Vec<String> {
        Vec::new()
    }

    fn token_filters(&self) -> Vec<String> {
        Vec::new()
    }

    fn char_filters(&self) -> Vec<String> {
        Vec::new()
    }

    fn hunspell_dictionaries(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A plugin together with the stable identifier it was registered under.
#[derive(Clone)]
pub struct RegisteredPlugin {
    pub id: String,
    pub plugin: Arc<dyn AnalysisPlugin>,
}

impl fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Enumerates the analysis plugins installed on the local node.
pub trait AnalysisPluginSource: Send + Sync {
    /// # Errors
    /// Returns [`IntrospectionError`] if module enumeration is unavailable.
    fn analysis_plugins(&self) -> Result<Vec<RegisteredPlugin>, IntrospectionError>;
}
