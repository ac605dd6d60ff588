//! Sociaux - one interface over many social-media services
//!
//! This library maps each provider's client onto a shared facade
//! ([`microblogs::MicroBlog`]), a shared set of records ([`types`]) and a
//! shared error taxonomy ([`error::MicroBlogError`]). Twitter is the
//! provider that ships today.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod microblogs;
pub mod types;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use error::{MicroBlogError, Result, SociauxError};
pub use microblogs::{connect, MicroBlog, MicroBlogDms, MicroBlogUsers};
pub use types::{Comment, Dm, Post, ServiceHandle, User};
