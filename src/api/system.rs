//! ProvingSystem: the compiled circuit plus its proving and verifying keys.
//!
//! A proving system is built once (setup, key import, or deserialization) and is
//! immutable afterwards. Its parameters and keys live behind `Arc`, so clones are
//! cheap and every clone shares the same artifact across threads.

use super::types::{
    FieldElement, InsertionParameters, InsertionProverKey, InsertionPublicParams,
    InsertionVerifierKey, KeyPair, Proof,
};
use super::validate::validate_dimensions;
use crate::{config, params, InsertionProverError, Result};
use bincode::Options;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info_span;

/// The proving artifact for one (tree depth, batch size) shape.
#[derive(Clone)]
pub struct ProvingSystem {
    pub(crate) tree_depth: u32,
    pub(crate) batch_size: u32,
    pub(crate) pp: Arc<InsertionPublicParams>,
    pub(crate) keys: KeyPair,
}

impl ProvingSystem {
    /// Compile the circuit for the shape and generate fresh keys.
    pub fn setup(tree_depth: u32, batch_size: u32) -> Result<Self> {
        let _span = info_span!("setup", tree_depth, batch_size).entered();
        let pp = params::build_constraint_system(tree_depth, batch_size)?;
        let keys = params::generate_keys(&pp)?;
        Ok(Self {
            tree_depth,
            batch_size,
            pp: Arc::new(pp),
            keys,
        })
    }

    /// Compile the circuit for the shape and load previously exported keys.
    ///
    /// The key bytes are the encodings produced by `proving_key_bytes` and
    /// `verifying_key_bytes`. Keys generated for any other shape are rejected
    /// with `ShapeError::KeysMismatch`.
    pub fn import_setup(
        tree_depth: u32,
        batch_size: u32,
        pk_bytes: &[u8],
        vk_bytes: &[u8],
    ) -> Result<Self> {
        let _span = info_span!("import_setup", tree_depth, batch_size).entered();
        validate_dimensions(tree_depth, batch_size)?;

        let pk: InsertionProverKey = decode_key(pk_bytes, "proving key")?;
        let vk: InsertionVerifierKey = decode_key(vk_bytes, "verifying key")?;
        let pp = params::build_constraint_system(tree_depth, batch_size)?;
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

    /// `import_setup` reading the keys from files.
    pub fn import_setup_from_files(
        tree_depth: u32,
        batch_size: u32,
        pk_path: impl AsRef<Path>,
        vk_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let pk_bytes = std::fs::read(pk_path)?;
        let vk_bytes = std::fs::read(vk_path)?;
        Self::import_setup(tree_depth, batch_size, &pk_bytes, &vk_bytes)
    }

    pub fn tree_depth(&self) -> u32 {
        self.tree_depth
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Generate a proof for one batch. See [`super::prove::prove`].
    pub fn prove(&self, params: &InsertionParameters) -> Result<Proof> {
        super::prove::prove(self, params)
    }

    /// Verify a proof against an input hash. See [`super::verify::verify`].
    pub fn verify(&self, input_hash: FieldElement, proof: &Proof) -> Result<()> {
        super::verify::verify(self, input_hash, proof)
    }

    /// Encoded proving key, as accepted by `import_setup`.
    pub fn proving_key_bytes(&self) -> Result<Vec<u8>> {
        encode_key(&*self.keys.pk, "proving key")
    }

    /// Encoded verifying key, as accepted by `import_setup`.
    pub fn verifying_key_bytes(&self) -> Result<Vec<u8>> {
        encode_key(&*self.keys.vk, "verifying key")
    }

    /// Write the encoded verifying key to a file.
    pub fn write_verifying_key(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.verifying_key_bytes()?;
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the compiled constraint system to a file.
    pub fn write_constraint_system(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        params::write_constraint_system(&self.pp, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn encode_key<T: serde::Serialize>(key: &T, what: &str) -> Result<Vec<u8>> {
    config::bincode_options()
        .serialize(key)
        .map_err(|e| InsertionProverError::Serialization(format!("Failed to serialize {what}: {e}")))
}

fn decode_key<T: serde::de::DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    config::bincode_options()
        .reject_trailing_bytes()
        .deserialize(bytes)
        .map_err(|e| {
            InsertionProverError::Serialization(format!("Failed to deserialize {what}: {e}"))
        })
}
