mod args;
mod package;
mod pipeline;

pub(crate) use args::split_invocation;
pub use package::package;
