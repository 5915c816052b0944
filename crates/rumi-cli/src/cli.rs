//! `runner`'s argument surface (§6 "CLI, surface preserved for
//! compatibility"). The teacher has no CLI-parsing crate of its own — this
//! leans on `clap`'s derive API the way `MikkoParkkola-nab`'s binary does,
//! since that is the idiomatic choice elsewhere in the retrieved pack.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "runner", about = "Runs the rumi video fusion pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root directory for persisted output and the conventional raw-input
    /// layout (§6, plus this crate's `raw_ml_output/` convention).
    #[arg(long, global = true, default_value = "./rumi_data")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full pipeline from a video URL: acquisition, ML analyzers, and the
    /// rest of the pipeline. Requires an `Acquisition` implementation this
    /// crate does not ship (§1 Non-goals); fails with exit code 3.
    Url { url: String },
    /// Legacy mode: assumes pre-populated ML analyzer outputs already exist
    /// under `<data_dir>/raw_ml_output/<video_id>/`.
    Id { video_id: String },
}
