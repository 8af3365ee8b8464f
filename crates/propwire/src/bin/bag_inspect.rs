//! Inspect a JSON-dumped property bag.
//!
//! Usage: `bag-inspect [--json] [--config codec.toml] [bag.json]`
//!
//! Reads the bag from the file argument or stdin and prints its signature,
//! fields and, when flagged, the decoded exception chain.

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use propwire::exception::RemoteException;
use propwire::{CodecConfig, Decoder, MemoryBag};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bag-inspect", about = "Decode and print a dumped property bag")]
struct Args {
    /// Bag dump produced by `MemoryBag::to_json`; stdin when omitted.
    path: Option<PathBuf>,
    /// Print the decoded summary as JSON.
    #[arg(long)]
    json: bool,
    /// Codec config (TOML) used for header sanitization.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Summary {
    signature: Option<String>,
    fields: Vec<(String, String)>,
    exception: Option<RemoteException>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bag-inspect: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let text = match &args.path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let config = match &args.config {
        Some(path) => CodecConfig::load(path)?,
        None => CodecConfig::default(),
    };

    let bag = MemoryBag::from_json(&text)?;
    tracing::debug!(fields = bag.len(), "loaded bag");
    let decoder = Decoder::with_config(&bag, &config);

    let exception = if decoder.has_encoded_exception()? {
        Some(decoder.decode_exception_chain_with_local_frames(Vec::new())?)
    } else {
        None
    };
    let summary = Summary {
        signature: decoder.get_message_signature()?,
        fields: bag
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_string()))
            .collect(),
        exception,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "signature: {}",
        summary.signature.as_deref().unwrap_or("<none>")
    );
    println!("fields ({}):", summary.fields.len());
    for (key, value) in &summary.fields {
        println!("  {key} = {value}");
    }
    if let Some(exception) = &summary.exception {
        println!();
        print!("{}", exception.render_trace());
    }
    Ok(())
}
