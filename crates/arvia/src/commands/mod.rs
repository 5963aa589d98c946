//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod init;
pub(crate) mod preview;
pub(crate) mod serve;

pub(crate) use build::BuildArgs;
pub(crate) use init::InitArgs;
pub(crate) use preview::PreviewArgs;
pub(crate) use serve::ServeArgs;
