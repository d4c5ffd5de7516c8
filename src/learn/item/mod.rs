pub mod agent;
pub mod brain;
pub mod environment;
