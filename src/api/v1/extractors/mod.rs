mod auth_ctx;
mod utc_instant;

pub use auth_ctx::CurrentIdentity;
pub use utc_instant::UtcInstant;
