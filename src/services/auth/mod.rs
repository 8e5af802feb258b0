pub mod binder;
pub mod claims;
pub mod factory;
pub mod identity;
pub mod policy;
pub mod token_codec;
pub mod token_issuer;

pub use binder::IdentityBinder;
pub use claims::ClaimSet;
pub use factory::build_identity_binder;
pub use identity::{IdentityResolver, RequestIdentity, ResolvedIdentity, UserLookup};
pub use policy::{EndpointPolicy, RoutePolicies};
pub use token_codec::{TokenCodec, VerificationError};
pub use token_issuer::TokenIssuer;
