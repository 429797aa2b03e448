//! JWT bearer credentials
//!
//! Tokens are HS256-signed with the shared gateway secret and carry the subject plus
//! the role names the policy store grants rules through.

mod handler;
pub mod types;


pub use handler::JwtHandler;
pub use types::Claims;
