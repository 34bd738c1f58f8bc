//! CLI command implementations
//!
//! Every command runs inside one session: the device is opened, the request
//! is dispatched, and the handle is dropped (closing the session) on return.

mod list;
pub mod transfer;

pub use list::list_backends;
