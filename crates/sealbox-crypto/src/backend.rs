//! Implementations of [`Crypto`](crate::Crypto).

pub mod rustcrypto;

pub use self::rustcrypto::Backend as RustCryptoBackend;
