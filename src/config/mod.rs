pub mod environment;
pub mod manifest;
pub mod properties;

pub use environment::Environment;
pub use manifest::{AppType, LoadedManifest, Manifest, load_manifest};
pub use properties::{DevProperties, PackageProperties, Scheme, SiteTarget, resolve_transpile};
