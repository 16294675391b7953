//! In-memory hub state: who is connected, and who belongs to which conversation.
//!
//! Both maps are sharded (`dashmap`), so operations on unrelated users or
//! conversations do not contend on a single lock.

pub mod connection;
pub mod membership;

pub use connection::ConnectionRegistry;
pub use membership::MembershipCache;
