//! Consumer-side sinks for the finished paths.

pub mod svg;
