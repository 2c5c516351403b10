//! Identity assignment module.
//!
//! Gives every host a unique MAC address and every switch a unique device
//! id. Values are derived from the digits in entity names when possible and
//! allocated otherwise; collisions are never reported as errors.

pub mod allocator;
pub mod mac;
pub mod resolver;

pub use allocator::{device_seed, IdAllocator};
pub use mac::{Mac, MacParseError};
pub use resolver::IdentityResolver;
