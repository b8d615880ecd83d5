pub mod layout;
pub mod rules;
pub mod targets;
pub mod watch;
pub mod webpack;

pub use layout::relocate_chunks;
pub use rules::LoaderOptions;
pub use targets::{BundleTarget, ProjectLayout, TargetKind, select_targets};
pub use watch::{BuildEvent, BuildWatch, WatchPoll};
pub use webpack::{BuildMode, Webpack};
