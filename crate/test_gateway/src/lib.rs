mod test_gateway;

pub use test_gateway::{GatewayCalls, TestGateway};
