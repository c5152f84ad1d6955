//! Wire Types
//!
//! Payloads exchanged with HubSpot.

pub mod contact;
pub mod token;

pub use contact::*;
pub use token::*;
