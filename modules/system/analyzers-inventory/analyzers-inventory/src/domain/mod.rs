pub mod collector;
pub mod dispatcher;
pub mod error;
pub mod plugin_registry;

pub use collector::NodeCollector;
pub use dispatcher::RequestDispatcher;
pub use error::DomainError;
pub use plugin_registry::PluginRegistry;
