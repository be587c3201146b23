//! # immutable-collections
//!
//! Persistent (immutable) collections with structural sharing.
//!
//! ## Overview
//!
//! Every operation that looks like a mutation returns a new collection and
//! leaves the receiver untouched. Versions share whatever they have in
//! common, so keeping old versions around is cheap.
//!
//! - **Hash collections**: [`ImmutableMap`](persistent::ImmutableMap) and
//!   [`ImmutableSet`](persistent::ImmutableSet), backed by a hash array
//!   mapped trie
//! - **Sequential collections**: [`ImmutableList`](persistent::ImmutableList),
//!   [`ImmutableStack`](persistent::ImmutableStack),
//!   [`ImmutableQueue`](persistent::ImmutableQueue)
//! - **Lazy views**: [`IndexedSequence`](persistent::IndexedSequence)
//! - **Absence**: [`Optional`]
//! - **Conversions** between all of the above, through the traits in
//!   [`capability`]
//!
//! ## Feature Flags
//!
//! - `arc`: share nodes through `Arc` instead of `Rc`, making the
//!   collections `Send + Sync`
//! - `serde`: `Serialize`/`Deserialize` implementations
//!
//! ## Example
//!
//! ```rust
//! use immutable_collections::prelude::*;
//!
//! let scores = ImmutableMap::from_array([("ada", 36), ("alan", 41)]);
//! let updated = scores.add("grace", 85);
//!
//! assert_eq!(scores.size(), 2);
//! assert_eq!(updated.get(&"grace").to_option(), Some(&85));
//! assert_eq!(updated.key_set(), ImmutableSet::of(["ada", "alan", "grace"]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use immutable_collections::prelude::*;
/// ```
pub mod prelude {
    pub use crate::capability::{Constructible, HasToArray};
    pub use crate::error::CollectionError;
    pub use crate::optional::Optional;
    pub use crate::persistent::*;
}

pub mod capability;
pub mod conversions;
pub mod error;
pub mod optional;
pub mod persistent;

pub use error::{CollectionError, Result};
pub use optional::Optional;
