pub mod integration;
pub mod message;
pub mod relay;
pub mod shutdown;
pub mod store;
