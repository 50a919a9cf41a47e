/// Core launcher logic
///
/// Contains the alias registry and its operations, entry validation,
/// query resolution, and launching.

pub mod launcher;
pub mod registry;
pub mod resolver;
pub mod validator;

pub use launcher::{LaunchMode, Launcher};
pub use registry::{AddOutcome, Registry, Report, Warning};
pub use resolver::{Resolution, Resolver};
pub use validator::{Validated, Validator};
