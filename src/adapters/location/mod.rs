//! Page location adapters.

mod in_memory_location;

pub use in_memory_location::InMemoryLocation;
