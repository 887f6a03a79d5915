//! Chart version resolution.
//!
//! [`ChartResolver`] turns chart subscriptions into concrete versions using
//! injected credential and version-lookup collaborators. [`ChartRefresher`]
//! writes the result into a Stage's status. [`SemverIndexLookup`] is an
//! in-memory [`VersionLookup`](crate::ports::VersionLookup) for embedding and
//! tests.

mod index;
mod refresh;
mod resolver;

pub use index::{RegistryError, SemverIndexLookup};
pub use refresh::ChartRefresher;
pub use resolver::ChartResolver;
