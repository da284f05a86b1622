// src/queue/mod.rs
pub mod mock;
pub mod traits;
pub mod unix;

pub use mock::MockQueue;
pub use traits::{ExecutionQueue, TransportError};
pub use unix::UnixQueue;
