//! Lock-guarded registries backing the admin listings.
//!
//! Each store owns one `OrderedRegistry` behind its own `RwLock`. The two
//! stores are never locked together. Mutations take the write lock, reads
//! take the read lock, and both hold it for the whole call, so a listing
//! never observes a half-applied mutation.

mod clients;
mod subscriptions;

pub use clients::ClientStore;
pub use subscriptions::{SubscriptionKey, SubscriptionStore};
