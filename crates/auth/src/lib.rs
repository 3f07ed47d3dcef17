//! `clinicore-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. The only IO-ish
//! piece is the HS256 token codec, which works on in-memory byte secrets.

pub mod claims;
pub mod gate;
pub mod permissions;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{Credential, TokenValidationError, validate_claims};
pub use gate::{AuthzError, Gate, authorize, evaluate_all};
pub use permissions::Permission;
pub use policy::{AccessPolicy, PolicyEntry};
pub use roles::{Role, RoleDefinition};
pub use token::{Hs256TokenCodec, TokenError};
