#![forbid(unsafe_code)]

//! Explicit observable stores.

pub mod observable;

pub use observable::{Observable, Subscription};
