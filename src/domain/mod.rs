pub mod disposition;
pub mod event;
pub mod field;
pub mod policy;
pub mod response;

pub use disposition::{Disposition, SuppressReason};
pub use event::{AlertEvent, EventId};
pub use field::FieldError;
pub use policy::ResponsePolicy;
pub use response::{ActiveResponse, Locality};
