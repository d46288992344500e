//! Core data structures for `viaStart`
//!
//! - [`SessionRequest`] - what the caller asked for
//! - [`Credentials`] - transient secret material for one connect attempt
//! - [`SessionHandle`] / [`SessionRecord`] - an established session

mod credentials;
mod request;
mod session;

pub use credentials::Credentials;
pub use request::{PipedParameters, SessionRequest};
pub use session::{DEFAULT_SESSION_NAME, SessionHandle, SessionRecord};
