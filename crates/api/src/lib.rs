//! Library surface of the prediction API, exposed so integration tests
//! can drive the real router without a listening socket.

pub mod api;
pub mod config;
