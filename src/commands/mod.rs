// ABOUTME: Command module aggregator for the beanstalk-deploy CLI.
// ABOUTME: Re-exports deploy, package, and status command handlers.

mod deploy;
mod package;
mod status;

pub use deploy::deploy;
pub use package::package;
pub use status::status;
