//! Versioned build artifacts.
//!
//! One build writes a matched set of three files into a directory:
//! - `vectorizer.json`: the fitted `CountVectorizer`
//! - `items.json`: one `ItemRecord` per corpus row
//! - `similarity.bin`: the dense matrix
//!
//! Every file carries the format version and the build's snapshot id.
//! Loading refuses any set whose files disagree.
//!
//! ## Matrix layout (little-endian)
//! ```text
//! "SIMX" | u32 version | 26 bytes snapshot id | u64 dim | dim*dim f32
//! ```

use crate::error::ArtifactError;
use data_loader::ItemId;
use pipeline::CountVectorizer;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use similarity::SimilarityMatrix;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use ulid::Ulid;

pub const FORMAT_VERSION: u32 = 1;

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const ITEMS_FILE: &str = "items.json";
pub const MATRIX_FILE: &str = "similarity.bin";

const VECTORIZER_SCHEMA: &str = "movie-recs/vectorizer";
const ITEMS_SCHEMA: &str = "movie-recs/items";
const MATRIX_MAGIC: &[u8; 4] = b"SIMX";
const SNAPSHOT_ID_LEN: usize = 26;
const MATRIX_HEADER_LEN: usize = 4 + 4 + SNAPSHOT_ID_LEN + 8;

type Result<T> = std::result::Result<T, ArtifactError>;

/// One row of the item table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub title: String,
    /// Lemmatized tag string
    pub tags: String,
}

/// JSON wrapper stamped with schema, version and snapshot id
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    schema: String,
    format_version: u32,
    snapshot_id: String,
    payload: T,
}

/// Everything one build produces
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub snapshot_id: Ulid,
    pub vectorizer: CountVectorizer,
    pub items: Vec<ItemRecord>,
    pub matrix: SimilarityMatrix,
}

/// Reads and writes artifact sets in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Whether a fitted vectorizer is present for reuse
    pub fn has_vectorizer(&self) -> bool {
        self.path(VECTORIZER_FILE).is_file()
    }

    /// Write all three files, creating the directory if needed
    #[instrument(skip_all, fields(dir = %self.dir.display(), snapshot = %set.snapshot_id))]
    pub fn save(&self, set: &ArtifactSet) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ArtifactError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let snapshot_id = set.snapshot_id.to_string();
        self.write_json(VECTORIZER_FILE, VECTORIZER_SCHEMA, &snapshot_id, &set.vectorizer)?;
        self.write_json(ITEMS_FILE, ITEMS_SCHEMA, &snapshot_id, &set.items)?;
        self.write_matrix(&snapshot_id, &set.matrix)?;

        info!(
            "Saved artifacts: {} items, {} terms, {}x{} matrix",
            set.items.len(),
            set.vectorizer.len(),
            set.matrix.dim(),
            set.matrix.dim()
        );
        Ok(())
    }

    /// Load and cross-check a full artifact set.
    ///
    /// # Returns
    /// * `Err(Mismatch)` - Snapshot ids differ or the item table and the
    ///   matrix disagree on the number of rows
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    pub fn load(&self) -> Result<ArtifactSet> {
        let (vectorizer_id, vectorizer): (String, CountVectorizer) =
            self.read_json(VECTORIZER_FILE, VECTORIZER_SCHEMA)?;
        let (items_id, items): (String, Vec<ItemRecord>) =
            self.read_json(ITEMS_FILE, ITEMS_SCHEMA)?;
        let (matrix_id, matrix) = self.read_matrix()?;

        if vectorizer_id != items_id || items_id != matrix_id {
            return Err(ArtifactError::Mismatch(format!(
                "snapshot ids differ: {VECTORIZER_FILE}={vectorizer_id}, \
                 {ITEMS_FILE}={items_id}, {MATRIX_FILE}={matrix_id}"
            )));
        }
        if items.len() != matrix.dim() {
            return Err(ArtifactError::Mismatch(format!(
                "{} items but similarity matrix has dimension {}",
                items.len(),
                matrix.dim()
            )));
        }
        let snapshot_id = Ulid::from_string(&matrix_id).map_err(|e| {
            ArtifactError::Mismatch(format!("invalid snapshot id {matrix_id:?}: {e}"))
        })?;

        info!(
            "Loaded artifacts {}: {} items, {} terms",
            snapshot_id,
            items.len(),
            vectorizer.len()
        );
        Ok(ArtifactSet {
            snapshot_id,
            vectorizer,
            items,
            matrix,
        })
    }

    /// Load only the vectorizer, for reuse by a rebuild
    pub fn load_vectorizer(&self) -> Result<CountVectorizer> {
        let (_, vectorizer) = self.read_json(VECTORIZER_FILE, VECTORIZER_SCHEMA)?;
        Ok(vectorizer)
    }

    fn write_json<T: Serialize>(
        &self,
        file: &str,
        schema: &str,
        snapshot_id: &str,
        payload: &T,
    ) -> Result<()> {
        let path = self.path(file);
        let envelope = Envelope {
            schema: schema.to_string(),
            format_version: FORMAT_VERSION,
            snapshot_id: snapshot_id.to_string(),
            payload,
        };
        let mut writer = BufWriter::new(create(&path)?);
        serde_json::to_writer(&mut writer, &envelope).map_err(|source| ArtifactError::Json {
            path: path.display().to_string(),
            source,
        })?;
        writer.flush().map_err(|source| io_error(&path, source))?;
        debug!("Wrote {:?}", path);
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str, schema: &str) -> Result<(String, T)> {
        let path = self.path(file);
        let reader = BufReader::new(open(&path)?);
        let envelope: Envelope<T> =
            serde_json::from_reader(reader).map_err(|source| ArtifactError::Json {
                path: path.display().to_string(),
                source,
            })?;

        if envelope.schema != schema {
            return Err(ArtifactError::Mismatch(format!(
                "{} has schema {:?}, expected {:?}",
                path.display(),
                envelope.schema,
                schema
            )));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                path: path.display().to_string(),
                found: envelope.format_version,
                expected: FORMAT_VERSION,
            });
        }
        Ok((envelope.snapshot_id, envelope.payload))
    }

    fn write_matrix(&self, snapshot_id: &str, matrix: &SimilarityMatrix) -> Result<()> {
        let path = self.path(MATRIX_FILE);
        if snapshot_id.len() != SNAPSHOT_ID_LEN {
            return Err(ArtifactError::Mismatch(format!(
                "snapshot id {snapshot_id:?} is not {SNAPSHOT_ID_LEN} bytes"
            )));
        }

        let mut writer = BufWriter::new(create(&path)?);
        let io = |source| io_error(&path, source);
        writer.write_all(MATRIX_MAGIC).map_err(io)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes()).map_err(io)?;
        writer.write_all(snapshot_id.as_bytes()).map_err(io)?;
        writer
            .write_all(&(matrix.dim() as u64).to_le_bytes())
            .map_err(io)?;
        for value in matrix.values() {
            writer.write_all(&value.to_le_bytes()).map_err(io)?;
        }
        writer.flush().map_err(io)?;
        debug!("Wrote {:?}", path);
        Ok(())
    }

    fn read_matrix(&self) -> Result<(String, SimilarityMatrix)> {
        let path = self.path(MATRIX_FILE);
        let mut bytes = Vec::new();
        open(&path)?
            .read_to_end(&mut bytes)
            .map_err(|source| io_error(&path, source))?;

        if bytes.len() < MATRIX_HEADER_LEN || &bytes[..4] != MATRIX_MAGIC {
            return Err(ArtifactError::BadMagic {
                path: path.display().to_string(),
            });
        }
        let version = u32::from_le_bytes(fixed(&bytes[4..8]));
        if version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                path: path.display().to_string(),
                found: version,
                expected: FORMAT_VERSION,
            });
        }
        let snapshot_id = String::from_utf8_lossy(&bytes[8..8 + SNAPSHOT_ID_LEN]).into_owned();
        let dim = u64::from_le_bytes(fixed(&bytes[8 + SNAPSHOT_ID_LEN..MATRIX_HEADER_LEN]));

        let body = &bytes[MATRIX_HEADER_LEN..];
        let expected = usize::try_from(dim)
            .ok()
            .and_then(|d| d.checked_mul(d))
            .and_then(|cells| cells.checked_mul(4));
        if expected != Some(body.len()) {
            return Err(ArtifactError::Mismatch(format!(
                "{} declares dimension {} but holds {} bytes of values",
                path.display(),
                dim,
                body.len()
            )));
        }

        let dim = dim as usize;
        let values: Vec<f32> = body
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes(fixed(chunk)))
            .collect();
        // Scores lie in [0, 1]; NaN fails the range check too
        if let Some(cell) = values.iter().position(|v| !(0.0..=1.0).contains(v)) {
            return Err(ArtifactError::Mismatch(format!(
                "{} holds {} at ({}, {}); scores must lie in [0, 1]",
                path.display(),
                values[cell],
                cell / dim,
                cell % dim
            )));
        }
        let matrix = SimilarityMatrix::from_raw(dim, values)
            .map_err(|e| ArtifactError::Mismatch(e.to_string()))?;
        Ok((snapshot_id, matrix))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| io_error(path, source))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| io_error(path, source))
}

/// Copy a slice whose length the caller already checked
fn fixed<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}
