//! Persisted proving-artifact format.
//!
//! Layout: `[tree_depth: u32 BE][batch_size: u32 BE][proving key][verifying key]
//! [constraint system]`. Each segment is a self-delimiting bincode encoding with
//! the pinned options from `config::bincode_options`, so segments are read back
//! in order from a single stream without length prefixes.
//!
//! On load, the constraint system is checked against the header's shape and the
//! keys against the constraint system.

use super::system::ProvingSystem;
use super::types::{InsertionProverKey, InsertionPublicParams, InsertionVerifierKey, KeyPair};
use super::validate::validate_dimensions;
use crate::{config, params, InsertionProverError, Result};
use bincode::Options;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info_span};

impl ProvingSystem {
    /// Stream the artifact into `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.tree_depth.to_be_bytes())?;
        writer.write_all(&self.batch_size.to_be_bytes())?;

        write_segment(&mut writer, &*self.keys.pk, "proving key")?;
        write_segment(&mut writer, &*self.keys.vk, "verifying key")?;
        write_segment(&mut writer, &*self.pp, "constraint system")?;
        writer.flush()?;
        Ok(())
    }

    /// Read an artifact from `reader`. Bytes after the last segment are left unread.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut header = [0u8; config::ARTIFACT_HEADER_SIZE];
        reader.read_exact(&mut header).map_err(|e| {
            InsertionProverError::Serialization(format!("Failed to read artifact header: {e}"))
        })?;
        let tree_depth = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let batch_size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
        validate_dimensions(tree_depth, batch_size)?;
        debug!(tree_depth, batch_size, "reading proving artifact");

        let pk: InsertionProverKey = read_segment(&mut reader, "proving key")?;
        let vk: InsertionVerifierKey = read_segment(&mut reader, "verifying key")?;
        let pp: InsertionPublicParams = read_segment(&mut reader, "constraint system")?;

        params::ensure_params_match(&pp, tree_depth, batch_size)?;
        let keys = KeyPair {
            pk: Arc::new(pk),
            vk: Arc::new(vk),
        };
        params::ensure_keys_match(&pp, &keys, tree_depth, batch_size)?;

        Ok(Self {
            tree_depth,
            batch_size,
            pp: Arc::new(pp),
            keys,
        })
    }

    /// Serialize the artifact to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Deserialize an artifact from bytes. Trailing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let system = Self::read_from(&mut cursor)?;
        if cursor.position() != bytes.len() as u64 {
            return Err(InsertionProverError::Serialization(format!(
                "Artifact contains {} trailing bytes",
                bytes.len() as u64 - cursor.position()
            )));
        }
        Ok(system)
    }

    /// Write the artifact to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _span = info_span!("write_artifact", path = %path.display()).entered();
        self.write_to(BufWriter::new(File::create(path)?))
    }

    /// Read an artifact from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let _span = info_span!("read_artifact", path = %path.display()).entered();
        Self::read_from(BufReader::new(File::open(path)?))
    }
}

fn write_segment<W: Write, T: serde::Serialize>(writer: W, value: &T, what: &str) -> Result<()> {
    config::bincode_options()
        .serialize_into(writer, value)
        .map_err(|e| InsertionProverError::Serialization(format!("Failed to write {what}: {e}")))
}

fn read_segment<R: Read, T: serde::de::DeserializeOwned>(reader: R, what: &str) -> Result<T> {
    config::bincode_options()
        .deserialize_from(reader)
        .map_err(|e| InsertionProverError::Serialization(format!("Failed to read {what}: {e}")))
}
