pub mod connection;
pub mod protocol;
pub mod sofia;
pub mod status;
pub mod types;

pub use connection::{Connector, EslConnection, EslConnector, Transport};
pub use protocol::Command;
