pub mod membership;
pub mod transport;
pub mod wire;

pub use membership::StaticMembership;
pub use transport::{LocalTransport, NodeRequestHandler, NodeTransport, TransportError};
