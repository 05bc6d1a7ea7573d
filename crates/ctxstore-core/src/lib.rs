pub mod compact;
pub mod config;
pub mod delta;
pub mod error;
pub mod io;
pub mod journal;
pub mod paths;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod validate;

pub use error::{CtxError, Result};
