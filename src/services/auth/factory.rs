/// Factory: build auth services from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{IdentityBinder, IdentityResolver, TokenCodec, UserLookup};

fn build_token_codec(config: &Config) -> TokenCodec {
    TokenCodec::new(
        &config.jwt_secret,
        config.auth_issuer.as_deref(),
        config.auth_audience.as_deref(),
    )
}

pub fn build_identity_binder(config: &Config, users: Arc<dyn UserLookup>) -> Arc<IdentityBinder> {
    let codec = Arc::new(build_token_codec(config));
    let resolver = IdentityResolver::new(users, config.user_lookup_timeout);

    Arc::new(IdentityBinder::new(codec, resolver))
}
