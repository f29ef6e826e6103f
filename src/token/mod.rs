//! Token minting, validation, and introspection.

pub mod codec;
pub mod introspection;
pub mod issuer;

pub use codec::{AccessTokenClaims, TokenCodec, TokenCodecError, TokenUse};
pub use introspection::{
    AccessGuard, IntrospectionError, IntrospectionRequest, IntrospectionResponse,
    IntrospectionService,
};
pub use issuer::{IssuanceError, TokenGrant, TokenGrantRequest, TokenIssuer};
