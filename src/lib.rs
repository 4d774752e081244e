// ABOUTME: Library root for beanstalk-deploy - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod build;
pub mod ci;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod provider;
pub mod types;
