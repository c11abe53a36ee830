//! Shared fixtures for behaviour tests.

#![allow(dead_code)]

use homeval_core::{Credential, PropertyAddress, UpstreamConfig};

pub use homeval_core::testing::ScriptedHttpClient;

pub const ENDPOINT: &str = "https://avm.example.test/v1/estimate";
pub const CREDENTIAL: &str = "test-key-123";

pub fn upstream_config() -> UpstreamConfig {
    UpstreamConfig::new(ENDPOINT, Credential::new(CREDENTIAL)).expect("valid upstream config")
}

pub fn springfield() -> PropertyAddress {
    PropertyAddress::new("1 Main St", "Springfield", "IL").expect("valid address")
}
