pub mod bitbucket;
pub mod cli;
pub mod config;
pub mod errors;
pub mod git;
pub mod utils;

pub use bitbucket::{BitbucketClient, BitbucketCredentials, ClientType};
pub use errors::{FetchError, Result};
pub use git::BitbucketRepository;
