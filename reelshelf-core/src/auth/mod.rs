pub mod crypto;
pub mod service;

pub use crypto::{AuthCrypto, AuthCryptoError};
pub use service::{AuthService, AuthenticatedUser};
