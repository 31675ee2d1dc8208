use anyhow::Result;
use clap::Parser;
use hazardsim_lib::app::{App, Scenario};
use serde::Serialize;
use std::io::{BufWriter, Write};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 300)]
    ticks: u64,

    /// Starting layout (empty, fire, crowd)
    #[arg(short, long, default_value = "fire")]
    scenario: Scenario,

    /// Pace ticks at the configured rate instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Print one line every N ticks
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Serialize)]
struct Line<'a> {
    #[serde(flatten)]
    diagnostics: &'a hazardsim_lib::model::TickDiagnostics,
    events: &'a [hazardsim_lib::model::WorldEvent],
}

fn main() -> Result<()> {
    hazardsim_lib::model::init_logging();

    let args = Args::parse();
    if args.print_config {
        let config = App::load_config(std::path::Path::new(&args.config))?;
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut app = App::new(&args.config, args.scenario)?;
    let every = args.every.max(1);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut emit = |app: &App| -> Result<()> {
        let diagnostics = app.world.diagnostics();
        if diagnostics.tick % every == 0 || !app.last_events.is_empty() {
            let line = Line {
                diagnostics,
                events: &app.last_events,
            };
            serde_json::to_writer(&mut out, &line)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    };

    let result = if args.realtime {
        app.run_realtime(args.ticks, &mut emit)
    } else {
        app.run_ticks(args.ticks, &mut emit)
    };
    drop(emit);
    out.flush()?;

    match result {
        Ok(()) => {
            tracing::info!(
                ticks = app.world.tick,
                elapsed_ms = app.world.metrics.elapsed().as_millis() as u64,
                "Simulation finished"
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Simulation error: {e}");
            Err(e)
        }
    }
}
