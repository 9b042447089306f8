pub mod columns;
pub mod config;
pub mod counter_store;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod rate_limiter;
pub mod response;
pub mod search;
pub mod server;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use rate_limiter::{Decision, RateLimiter};
pub use search::{PagedResult, SearchEngine, TenantQuery};
pub use server::{build_state, create_app};
