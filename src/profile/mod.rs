pub mod encryption;
pub mod store;
pub mod types;

pub use store::{ProfileStore, StoreError};
pub use types::{FingerprintProfile, ProfileStatus};
