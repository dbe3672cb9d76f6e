mod algorithms;
mod error;
mod gateway;

pub use algorithms::{HashingAlgorithm, SigningAlgorithmSpec};
pub use error::{GatewayError, GatewayResult};
pub use gateway::RemoteCryptoGateway;
