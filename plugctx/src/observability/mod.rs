//! Observability utilities.

mod logging;

pub use logging::{init_json_tracing, init_tracing};
