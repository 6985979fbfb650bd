//! Library portion of the server binary, exposed so integration tests
//! can drive the router directly.

pub mod http;
