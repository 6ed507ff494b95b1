mod container;
pub mod error;
mod image;
mod policy;
pub mod traits;

pub use container::{ContainerSnapshot, ImageInfo, WarnOverride};
pub use error::RuntimeError;
pub use image::{DigestGroup, Image};
pub use policy::{DEFAULT_BLACKLIST, DEFAULT_WARN_LABEL, KickPolicy};
pub use traits::{ContainerRuntime, MetricsGateway};
