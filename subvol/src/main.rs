mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use output::{
    LsOutput, NameOutput, OmapOutput, OutputWriter, SnapshotIdOutput, SubvolumeInfo,
};
use std::io::{self, Read};
use std::process::ExitCode;
use subvol_core::{
    OmapEntry, References, SubvolumePath, SubvolumeRecord, classify_all, cleanup_plan,
    derive_snap_omap_entry, derive_volume_omap_entry, extract_name_from_subvolume_path,
    extract_snapshot_handle_id,
};

/// Subvol - CephFS CSI naming inspector
#[derive(Parser)]
#[command(name = "subvol")]
#[command(about = "Translate CephFS CSI handles, omap entries and subvolume paths", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit JSON (defaults to SUBVOL_JSON env var)
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (RUST_LOG overrides)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive omap entries from a handle
    #[command(subcommand)]
    Omap(OmapCommands),

    /// Print the final segment of a subvolume path
    Name {
        /// Subvolume path
        path: String,
    },

    /// Split a /volumes/<group>/<name>/<uuid> path into its parts
    ParsePath {
        /// Subvolume path
        path: String,
    },

    /// Extract the UUID from a composite snapshot handle
    SnapshotId {
        /// Composite handle
        handle: String,
    },

    /// Classify subvolumes read as JSON from stdin
    Ls {
        /// Volume handle still referenced by a persistent volume
        #[arg(long = "handle")]
        handles: Vec<String>,

        /// Subvolume name still referenced by a persistent volume
        #[arg(long = "name")]
        names: Vec<String>,

        /// Only show stale subvolumes
        #[arg(long)]
        stale_only: bool,
    },
}

#[derive(Subcommand)]
enum OmapCommands {
    /// Volume or NFS export handle
    Volume {
        /// Handle, e.g. csi-vol-<uuid>
        handle: String,

        /// Request name stored under csi.volname, to plan the directory cleanup
        #[arg(long)]
        request_name: Option<String>,
    },

    /// Snapshot handle
    Snap {
        /// Handle, e.g. csi-snap-<uuid>
        handle: String,

        /// Request name stored under csi.snapname, to plan the directory cleanup
        #[arg(long)]
        request_name: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::set_up_logging(cli.verbose);

    // JSON output: CLI flag > SUBVOL_JSON env var > text default
    let json = cli.json || env_flag("SUBVOL_JSON");
    let writer = OutputWriter::new(json);

    let result = match cli.command {
        Commands::Omap(OmapCommands::Volume {
            handle,
            request_name,
        }) => cmd_omap(
            &writer,
            derive_volume_omap_entry(&handle),
            handle,
            request_name,
        ),
        Commands::Omap(OmapCommands::Snap {
            handle,
            request_name,
        }) => cmd_omap(
            &writer,
            derive_snap_omap_entry(&handle),
            handle,
            request_name,
        ),
        Commands::Name { path } => cmd_name(&writer, path),
        Commands::ParsePath { path } => cmd_parse_path(&writer, &path),
        Commands::SnapshotId { handle } => cmd_snapshot_id(&writer, handle),
        Commands::Ls {
            handles,
            names,
            stale_only,
        } => cmd_ls(&writer, &handles, &names, stale_only),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            writer.write_error(&err, 1);
            ExitCode::from(1)
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn cmd_omap(
    writer: &OutputWriter,
    entry: OmapEntry,
    handle: String,
    request_name: Option<String>,
) -> Result<()> {
    let cleanup = cleanup_plan(&entry, request_name.as_deref());
    let output = OmapOutput {
        success: true,
        result_code: 0,
        handle,
        entry,
        cleanup,
    };

    writer.write(&output, || output.to_text())
}

fn cmd_name(writer: &OutputWriter, path: String) -> Result<()> {
    let name = extract_name_from_subvolume_path(&path)?;
    let output = NameOutput {
        success: true,
        result_code: 0,
        path,
        name,
    };

    writer.write(&output, || format!("{}\n", output.name))
}

fn cmd_parse_path(writer: &OutputWriter, path: &str) -> Result<()> {
    let parsed = SubvolumePath::parse(path)?;

    writer.write(&parsed, || {
        format!(
            "Group: {}\nName: {}\nInstance: {}\n",
            parsed.group, parsed.name, parsed.instance
        )
    })
}

fn cmd_snapshot_id(writer: &OutputWriter, handle: String) -> Result<()> {
    let id = extract_snapshot_handle_id(&handle);
    if id.is_empty() {
        anyhow::bail!("No snapshot id in handle: {}", handle);
    }

    let output = SnapshotIdOutput {
        success: true,
        result_code: 0,
        handle,
        id,
    };

    writer.write(&output, || format!("{}\n", output.id))
}

fn cmd_ls(
    writer: &OutputWriter,
    handles: &[String],
    names: &[String],
    stale_only: bool,
) -> Result<()> {
    if atty::is(atty::Stream::Stdin) {
        anyhow::bail!("Expected a JSON array of subvolumes on stdin");
    }

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;

    let records: Vec<SubvolumeRecord> =
        serde_json::from_str(&input).context("Failed to parse subvolume list")?;

    let mut refs = References::new();
    for handle in handles {
        if !refs.insert_handle(handle) {
            tracing::warn!(handle = handle.as_str(), "handle has no volume id, ignoring");
        }
    }
    for name in names {
        refs.insert_subvolume_name(name);
    }

    tracing::debug!(
        subvolumes = records.len(),
        references = refs.len(),
        "classifying subvolumes"
    );

    let subvolumes = classify_all(&records, &refs)
        .into_iter()
        .filter(|(_, state)| !stale_only || state.is_stale())
        .map(|(record, state)| SubvolumeInfo::new(record, state))
        .collect();

    let output = LsOutput {
        success: true,
        result_code: 0,
        subvolumes,
    };

    writer.write(&output, || output.to_text())
}
