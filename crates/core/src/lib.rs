pub mod colour;
pub mod config;
pub mod error;
pub mod humanize;
pub mod ids;
pub mod layout;
pub mod model;
pub mod order;
pub mod query;
pub mod time;
pub mod view;

pub use error::{Result, TraceWebError};
