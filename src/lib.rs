pub mod api;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod observability;
pub mod policy;
pub mod queue;

pub use config::Config;
pub use dispatch::{dispatch, DispatchError, Dispatcher};
pub use domain::{ActiveResponse, AlertEvent, Disposition, Locality, ResponsePolicy};
pub use queue::{ExecutionQueue, TransportError};
