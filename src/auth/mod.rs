pub mod flow;
pub mod gateway;
pub mod validation;

pub use flow::{LoginFlow, LoginState};
pub use gateway::AuthGateway;
