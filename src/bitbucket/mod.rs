//! Bitbucket integration module
//!
//! This module provides:
//! - Credential validation and storage for Bitbucket Cloud and Server
//! - An authenticated API client for either flavour

pub mod client;
pub mod credentials;

pub use client::{BitbucketClient, ClientOptions, CloneLink, RepositoryInfo};
pub use credentials::{validate_username, BitbucketCredentials, ClientType, DEFAULT_URL};
