//! # gamerec artifacts
//!
//! Serving-time access to the offline-built model artifacts: a checksummed
//! on-disk bundle ([`FsArtifactStore`]) and the load-once [`SnapshotCell`].

pub mod bundle;
pub mod cell;
pub mod error;

pub use bundle::{write_bundle, ArtifactFiles, FileEntry, FsArtifactStore, Manifest, BUNDLE_VERSION};
pub use cell::{SharedResult, SnapshotCell};
pub use error::{LoadError, Result};
