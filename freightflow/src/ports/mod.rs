//! Ports - injected collaborators the core consumes.
//!
//! Storage, credentials and version lookup are owned by outer layers. The
//! core only sees these traits, each passed in explicitly by whoever builds
//! an orchestrator or resolver.

mod credentials;
mod store;
mod versions;

pub use credentials::{CredentialProvider, CredentialType, Credentials};
pub use store::ResourceStore;
pub use versions::VersionLookup;

#[cfg(test)]
pub use credentials::MockCredentialProvider;
#[cfg(test)]
pub use store::MockResourceStore;
