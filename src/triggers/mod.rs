//! Entry points that run the pipeline: an HTTP endpoint answering any
//! request and a fixed-interval timer.

pub mod http;
pub mod timer;

pub use http::router;
pub use timer::{run_scheduled, spawn_schedule};
