// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scrollscribe: transcribe a tall screenshot to plain text.
//
// Entry point. Initialises logging, builds the config and OCR engine from
// the command line, runs the transcription, and prints the transcript.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use scrollscribe_core::Result;
use scrollscribe_core::human_errors::humanize_error;
use scrollscribe_pipeline::Transcriber;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Scrollscribe starting");

    match run(&cli).await {
        Ok(transcript) => {
            println!("{transcript}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "transcription failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("hint: {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<String> {
    let config = cli.pipeline_config()?;
    let engine = cli.build_engine()?;
    let transcriber = Transcriber::new(engine, config)?;
    transcriber.transcribe_path(&cli.image).await
}
