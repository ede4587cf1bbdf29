//! Waitlist persistence
//!
//! This module owns the read-modify-write cycle that appends registrations
//! to the waitlist stored under a single key.

pub mod codec;
pub mod service;

pub use codec::{decode_waitlist, encode_waitlist};
pub use service::WaitlistService;
