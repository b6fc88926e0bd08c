mod cli;
mod logging;
mod reporter;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};
use dotenv::dotenv;
use musescore2pdf::config::{self, AppConfig};
use musescore2pdf::{FingerprintIndex, ScanEngine, Shutdown, WatchContext};
use reporter::LogReporter;
use tracing::{error, info};

fn main() -> ExitCode {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let config = match config::load_configuration(&args.overrides()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        Some(Commands::CountIndex) => open_index(&config).and_then(|index| {
            info!("Fingerprints in index: {}", index.len()?);
            Ok(())
        }),
        Some(Commands::PruneIndex) => open_index(&config).and_then(|index| {
            index.prune_missing()?;
            Ok(())
        }),
        Some(Commands::ClearIndex) => clear_index(&config),
        None => run_watch(&config, args.once),
    };

    // _guard has to drop before the process exits
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn open_index(config: &AppConfig) -> anyhow::Result<FingerprintIndex> {
    FingerprintIndex::open(&config.db_path)
        .map_err(|e| anyhow::anyhow!("Cannot open fingerprint store '{}': {}", config.db_path, e))
}

fn run_watch(config: &AppConfig, once: bool) -> anyhow::Result<()> {
    let context = WatchContext::from_config(config)?;
    let index = open_index(config)?;
    let shutdown = Shutdown::install()?;

    info!(
        "Watching {} every {}s with '{}'",
        context.root.display(),
        context.scan_interval.as_secs(),
        context.renderer
    );

    let engine = ScanEngine::new(context, index);
    if once {
        engine.run_cycle(&LogReporter, &shutdown)?;
    } else {
        engine.run(&LogReporter, &shutdown)?;
    }

    info!("Stopped");
    Ok(())
}

fn clear_index(config: &AppConfig) -> anyhow::Result<()> {
    let confirmed = confirm(
        "Delete every stored fingerprint? All songs will be converted again.",
        &mut io::stdin().lock(),
        &mut io::stdout(),
    )?;
    if !confirmed {
        println!("Nothing removed");
        return Ok(());
    }
    let removed = open_index(config)?.clear()?;
    println!("{} fingerprint(s) removed", removed);
    Ok(())
}

/// Ask a yes/no question, defaulting to no. End of input counts as no.
fn confirm(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    let mut answer = String::new();
    loop {
        write!(output, "{} (y/N): ", prompt)?;
        output.flush()?;

        answer.clear();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "" | "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer y or n.")?,
        }
    }
}
