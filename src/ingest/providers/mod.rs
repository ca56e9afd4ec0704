// src/ingest/providers/mod.rs
pub mod fixture;
pub mod http;

pub use fixture::FixturePageSource;
pub use http::HttpPageSource;
