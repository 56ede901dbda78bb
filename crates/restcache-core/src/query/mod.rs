//! Query canonicalization: description input, normalized descriptor, cache
//! keys, fingerprint, and the row filter derived from a descriptor.

mod description;
mod descriptor;
mod filter;
mod fingerprint;
pub mod key;

#[cfg(test)]
mod tests;

pub use description::{CountMode, QueryDescription, Target, TextSearchKind};
pub use descriptor::QueryDescriptor;
pub use filter::QueryFilter;
pub use fingerprint::QueryFingerprint;
