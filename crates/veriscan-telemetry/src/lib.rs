pub mod scanner_metrics;

pub use scanner_metrics::*;
