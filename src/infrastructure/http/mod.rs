//! HTTP client abstraction shared by all outbound adapters

mod client;

pub use client::{HttpClient, HttpClientTrait};

#[cfg(test)]
pub use client::mock::MockHttpClient;
