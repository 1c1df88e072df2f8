//! Batch insertion prover command line.
//!
//! Produces setup artifacts, generates and verifies proofs, and runs the HTTP
//! prover service.
//!
//! Run with: cargo run --release -- <command>

use anyhow::{bail, Context, Result};
use batch_insertion_prover::{
    api::{InsertionParameters, Proof, ProofJson, ProvingSystem},
    config,
    merkle::SparseMerkleTree,
    metrics::{ProofMetrics, VerificationMetrics},
    params, server, utils, FieldElement, InsertionProverError,
};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for the batch insertion prover
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase output verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the circuit, generate keys and write the setup artifact
    Setup {
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        tree_depth: u32,
        #[arg(long)]
        batch_size: u32,
    },
    /// Build the setup artifact from externally generated keys
    ImportSetup {
        #[arg(long)]
        output: PathBuf,
        /// Encoded proving key
        #[arg(long)]
        pk: PathBuf,
        /// Encoded verifying key
        #[arg(long)]
        vk: PathBuf,
        #[arg(long)]
        tree_depth: u32,
        #[arg(long)]
        batch_size: u32,
    },
    /// Write the verifying key of a setup artifact
    ExportVk {
        #[arg(long)]
        keys_file: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Write the compiled constraint system for a shape
    R1cs {
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        tree_depth: u32,
        #[arg(long)]
        batch_size: u32,
    },
    /// Print a valid batch for an empty tree as JSON
    GenTestParams {
        #[arg(long)]
        tree_depth: u32,
        #[arg(long)]
        batch_size: u32,
    },
    /// Run the HTTP prover service until Ctrl-C
    Start {
        #[arg(long)]
        keys_file: PathBuf,
        /// Emit JSON log lines instead of the tree layout
        #[arg(long, default_value_t = false)]
        json_logging: bool,
        #[arg(long, default_value = config::DEFAULT_PROVER_ADDRESS)]
        prover_address: String,
        #[arg(long, default_value = config::DEFAULT_METRICS_ADDRESS)]
        metrics_address: String,
    },
    /// Read a batch from stdin and write its proof JSON to stdout
    Prove {
        #[arg(long)]
        keys_file: PathBuf,
    },
    /// Read proof JSON from stdin and check it against an input hash
    Verify {
        #[arg(long)]
        keys_file: PathBuf,
        /// 0x-prefixed input hash of the batch
        #[arg(long)]
        input_hash: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_logging = matches!(cli.command, Command::Start { json_logging: true, .. });
    init_tracing(cli.verbose, json_logging);

    match cli.command {
        Command::Setup {
            output,
            tree_depth,
            batch_size,
        } => {
            let _span = info_span!("setup", tree_depth, batch_size).entered();
            let start = Instant::now();
            let system = ProvingSystem::setup(tree_depth, batch_size)?;
            system.write_to_file(&output)?;
            info!(
                "Setup written to {} in {:.1}s",
                output.display(),
                start.elapsed().as_secs_f64()
            );
        }
        Command::ImportSetup {
            output,
            pk,
            vk,
            tree_depth,
            batch_size,
        } => {
            let system = ProvingSystem::import_setup_from_files(tree_depth, batch_size, &pk, &vk)
                .context("importing setup")?;
            system.write_to_file(&output)?;
            info!("Imported setup written to {}", output.display());
        }
        Command::ExportVk { keys_file, output } => {
            let system = load_system(&keys_file)?;
            system.write_verifying_key(&output)?;
            info!("Verifying key written to {}", output.display());
        }
        Command::R1cs {
            output,
            tree_depth,
            batch_size,
        } => {
            let pp = params::build_constraint_system(tree_depth, batch_size)?;
            let file = std::fs::File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            let mut writer = std::io::BufWriter::new(file);
            params::write_constraint_system(&pp, &mut writer)?;
            writer.flush()?;
            info!("Constraint system written to {}", output.display());
        }
        Command::GenTestParams {
            tree_depth,
            batch_size,
        } => {
            let params = empty_tree_batch(tree_depth, batch_size)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", params.to_json()?)?;
        }
        Command::Start {
            keys_file,
            json_logging: _,
            prover_address,
            metrics_address,
        } => {
            let system = Arc::new(load_system(&keys_file)?);
            let config = server::Config {
                prover_address,
                metrics_address,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async move {
                let server = server::Server::bind(&config, system).await?;
                server
                    .serve(async {
                        let _ = tokio::signal::ctrl_c().await;
                        info!("Ctrl-C received, shutting down");
                    })
                    .await
            })?;
        }
        Command::Prove { keys_file } => {
            let system = load_system(&keys_file)?;
            let params = InsertionParameters::from_json(&read_stdin()?)?;

            let start = Instant::now();
            let proof = system.prove(&params)?;
            let metrics = ProofMetrics {
                duration: start.elapsed(),
                proof_size_bytes: proof.to_bytes()?.len(),
                tree_depth: system.tree_depth(),
                batch_size: system.batch_size(),
            };
            info!("{}", metrics.format());

            let json = serde_json::to_string(&proof.to_json()?)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
        Command::Verify {
            keys_file,
            input_hash,
        } => {
            let system = load_system(&keys_file)?;
            let input_hash = utils::field_from_hex(&input_hash).context("parsing --input-hash")?;
            let proof_json: ProofJson = serde_json::from_str(&read_stdin()?)
                .map_err(InsertionProverError::from)?;
            let proof = Proof::from_json(&proof_json)?;

            let start = Instant::now();
            let outcome = system.verify(input_hash, &proof);
            let metrics = VerificationMetrics {
                duration: start.elapsed(),
                valid: outcome.is_ok(),
            };
            info!("{}", metrics.format());
            outcome?;
        }
    }

    Ok(())
}

fn load_system(keys_file: &Path) -> Result<ProvingSystem> {
    let system = ProvingSystem::read_from_file(keys_file)
        .with_context(|| format!("loading setup from {}", keys_file.display()))?;
    info!(
        tree_depth = system.tree_depth(),
        batch_size = system.batch_size(),
        "Loaded setup"
    );
    Ok(system)
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

/// Insert commitments `1..=batch_size` at indices `0..batch_size` of an empty tree.
fn empty_tree_batch(tree_depth: u32, batch_size: u32) -> Result<InsertionParameters> {
    batch_insertion_prover::api::validate_dimensions(tree_depth, batch_size)?;
    if !utils::index_fits_depth(u64::from(batch_size) - 1, tree_depth) {
        bail!(
            "a depth {} tree cannot hold {} insertions",
            tree_depth,
            batch_size
        );
    }

    let mut tree = SparseMerkleTree::new(tree_depth as usize)?;
    let pre_root = tree.root();
    let mut identity_commitments = Vec::with_capacity(batch_size as usize);
    let mut merkle_proofs = Vec::with_capacity(batch_size as usize);
    for i in 0..batch_size {
        let commitment = FieldElement::from(u64::from(i) + 1);
        merkle_proofs.push(tree.update(u64::from(i), commitment)?);
        identity_commitments.push(commitment);
    }

    let mut params = InsertionParameters {
        input_hash: None,
        start_index: 0,
        pre_root,
        post_root: tree.root(),
        identity_commitments,
        merkle_proofs,
    };
    params.input_hash = Some(params.compute_input_hash());
    Ok(params)
}

fn init_tracing(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => "info,batch_insertion_prover=info,nova_snark=warn",
        1 => "debug,batch_insertion_prover=debug,nova_snark=info",
        _ => "batch_insertion_prover=trace,nova_snark=debug",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
        return;
    }

    use tracing_tree::HierarchicalLayer;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            HierarchicalLayer::new(2)
                .with_targets(false)
                .with_bracketed_fields(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
