//! Artifact bundle on disk
//!
//! ```text
//! <dir>/manifest.json      version, schema, scaler, vocabulary, item names, file digests
//! <dir>/features.bin.gz    bincode FeatureTable, gzip
//! <dir>/similarity.bin.gz  bincode SimilarityMatrix, gzip
//! <dir>/nn_index.bin.gz    bincode NearestNeighborIndex, gzip
//! ```

use crate::error::{LoadError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use gamerec_core::{
    ArtifactSnapshot, ArtifactSource, FeatureSchema, FeatureTable, NearestNeighborIndex,
    ScalerParams, SimilarityMatrix, Vocabulary,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const BUNDLE_VERSION: u32 = 1;
pub const MANIFEST_FILE: &str = "manifest.json";
const FEATURES_FILE: &str = "features.bin.gz";
const SIMILARITY_FILE: &str = "similarity.bin.gz";
const NN_INDEX_FILE: &str = "nn_index.bin.gz";

/// A binary artifact and its SHA-256 digest (hex, over the file bytes)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEntry {
    pub file: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactFiles {
    pub features: FileEntry,
    pub similarity: FileEntry,
    pub nn_index: FileEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub schema: FeatureSchema,
    pub scaler: ScalerParams,
    pub vocabulary: Vocabulary,
    pub item_names: Vec<String>,
    pub files: ArtifactFiles,
}

/// Artifact bundle read from a local directory
pub struct FsArtifactStore {
    dir: PathBuf,
    manifest: Manifest,
}

impl FsArtifactStore {
    /// Open a bundle and read its manifest. Binary payloads are read lazily by
    /// the [`ArtifactSource`] getters.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let manifest_path = dir.join(MANIFEST_FILE);
        let bytes = fs::read(&manifest_path).map_err(|e| LoadError::io(&manifest_path, e))?;
        let manifest: Manifest = serde_json::from_slice(&bytes)?;
        if manifest.version != BUNDLE_VERSION {
            return Err(LoadError::UnsupportedVersion(manifest.version));
        }
        debug!(dir = %dir.display(), items = manifest.item_names.len(), "opened artifact bundle");
        Ok(Self { dir, manifest })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Open and validate in one step
    pub fn load_snapshot<P: AsRef<Path>>(dir: P) -> Result<ArtifactSnapshot> {
        let store = Self::open(dir)?;
        let snapshot = ArtifactSnapshot::load(&store)?;
        info!(
            dir = %store.dir.display(),
            items = snapshot.len(),
            dimension = snapshot.dim(),
            "artifact bundle loaded"
        );
        Ok(snapshot)
    }

    fn read_payload<T: DeserializeOwned>(&self, entry: &FileEntry) -> Result<T> {
        let path = self.dir.join(&entry.file);
        let compressed = fs::read(&path).map_err(|e| LoadError::io(&path, e))?;

        let actual = hex_digest(&compressed);
        if actual != entry.sha256 {
            return Err(LoadError::Checksum {
                file: entry.file.clone(),
                expected: entry.sha256.clone(),
                actual,
            });
        }

        let mut raw = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut raw)
            .map_err(|e| LoadError::io(&path, e))?;
        bincode::deserialize(&raw).map_err(|source| LoadError::Codec {
            file: entry.file.clone(),
            source,
        })
    }
}

impl ArtifactSource for FsArtifactStore {
    type Error = LoadError;

    fn get_schema(&self) -> Result<FeatureSchema> {
        Ok(self.manifest.schema.clone())
    }

    fn get_feature_table(&self) -> Result<FeatureTable> {
        self.read_payload(&self.manifest.files.features)
    }

    fn get_item_names(&self) -> Result<Vec<String>> {
        Ok(self.manifest.item_names.clone())
    }

    fn get_scaler_params(&self) -> Result<ScalerParams> {
        Ok(self.manifest.scaler.clone())
    }

    fn get_vocabulary(&self) -> Result<Vocabulary> {
        Ok(self.manifest.vocabulary.clone())
    }

    fn get_similarity_matrix(&self) -> Result<SimilarityMatrix> {
        self.read_payload(&self.manifest.files.similarity)
    }

    fn get_nn_index(&self) -> Result<NearestNeighborIndex> {
        self.read_payload(&self.manifest.files.nn_index)
    }
}

/// Write a snapshot as a bundle into `dir`, creating it if needed
pub fn write_bundle<P: AsRef<Path>>(dir: P, snapshot: &ArtifactSnapshot) -> Result<Manifest> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| LoadError::io(dir, e))?;

    let files = ArtifactFiles {
        features: write_payload(dir, FEATURES_FILE, snapshot.feature_table())?,
        similarity: write_payload(dir, SIMILARITY_FILE, snapshot.similarity())?,
        nn_index: write_payload(dir, NN_INDEX_FILE, snapshot.nn_index())?,
    };
    let manifest = Manifest {
        version: BUNDLE_VERSION,
        schema: snapshot.schema().clone(),
        scaler: snapshot.scaler().clone(),
        vocabulary: snapshot.vocabulary().clone(),
        item_names: snapshot.item_names().to_vec(),
        files,
    };

    let manifest_path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_vec_pretty(&manifest)?;
    fs::write(&manifest_path, json).map_err(|e| LoadError::io(&manifest_path, e))?;
    info!(dir = %dir.display(), items = snapshot.len(), "artifact bundle written");
    Ok(manifest)
}

fn write_payload<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<FileEntry> {
    let path = dir.join(name);
    let raw = bincode::serialize(value).map_err(|source| LoadError::Codec {
        file: name.to_string(),
        source,
    })?;

    let file = File::create(&path).map_err(|e| LoadError::io(&path, e))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    encoder.write_all(&raw).map_err(|e| LoadError::io(&path, e))?;
    let mut writer = encoder.finish().map_err(|e| LoadError::io(&path, e))?;
    writer.flush().map_err(|e| LoadError::io(&path, e))?;
    drop(writer);

    let written = fs::read(&path).map_err(|e| LoadError::io(&path, e))?;
    Ok(FileEntry {
        file: name.to_string(),
        sha256: hex_digest(&written),
    })
}

fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
