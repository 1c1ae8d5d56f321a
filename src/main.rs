//! Replays a file through a reassembly buffer and verifies the output.
//!
//! Parses CLI arguments, cuts the input into out-of-order chunks and reports
//! how the buffer coped.

mod cli;

use std::{error::Error, fs, process::ExitCode};

use bytes::Bytes;
use clap::Parser;
use stream_reassembly::{
    ReassemblyBuffer,
    ReassemblyConfig,
    replay::{ChunkOrder, ReplayPlan, replay},
};
use tracing::{error, info};

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "replay failed");
            ExitCode::FAILURE
        }
    }
}

fn chunk_order(order: cli::Order) -> ChunkOrder {
    match order {
        cli::Order::Forward => ChunkOrder::Forward,
        cli::Order::Reverse => ChunkOrder::Reverse,
        cli::Order::Interleaved => ChunkOrder::Interleaved,
    }
}

fn config(cli: &cli::Cli) -> ReassemblyConfig {
    let mut config = ReassemblyConfig::unbounded();
    config.max_buffered_bytes = cli.max_buffered_bytes;
    config.max_segments = cli.max_segments;
    config
}

/// Returns whether the reassembled stream matched the input.
fn run(cli: &cli::Cli) -> Result<bool, Box<dyn Error>> {
    let input = Bytes::from(fs::read(&cli.input)?);
    let plan = ReplayPlan::new(cli.chunk_size)
        .with_overlap(cli.overlap)
        .with_order(chunk_order(cli.order))
        .with_duplicate_every(cli.duplicate_every);

    let mut buffer = ReassemblyBuffer::with_config(config(cli));
    let report = replay(plan.chunks(&input), &mut buffer, cli.read_size)?;

    if let Some(path) = &cli.output {
        fs::write(path, &report.output)?;
    }

    let intact = report.output == input;
    info!(
        chunks = report.chunks,
        reads = report.reads,
        stalled_polls = report.stalled_polls,
        peak_segments = report.peak_segments,
        peak_buffered_bytes = report.peak_buffered_bytes,
        "replay finished"
    );
    println!(
        "{} bytes in {} chunks, {} reads, {} stalled polls, peak {} segments / {} bytes: {}",
        input.len(),
        report.chunks,
        report.reads,
        report.stalled_polls,
        report.peak_segments,
        report.peak_buffered_bytes,
        if intact { "intact" } else { "MISMATCH" }
    );
    Ok(intact)
}
