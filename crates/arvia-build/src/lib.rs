//! Static bundle builder for Arvia.
//!
//! `arvia build` produces a deployable directory that mirrors the source
//! tree 1:1, plus an `assets/` subdirectory mirroring the assets tree when
//! it exists:
//!
//! ```text
//! dist/            <- source/
//! └── assets/      <- assets/ (only if present)
//! ```
//!
//! No manifest or checksum file is written.

mod builder;
mod copy;

pub use builder::{ASSETS_DIR_NAME, BuildError, BuildPipeline, BuildReport};
pub use copy::CopyError;
