//! P2P energy trading simulator entry point: CLI wiring and config-driven
//! game construction.

use std::cell::RefCell;
use std::path::Path;
use std::process;
use std::rc::Rc;

use log::{info, warn};
use p2p_energy_sim::config::GameConfig;
use p2p_energy_sim::io::export::{export_telemetry, export_trades};
use p2p_energy_sim::participants::ParticipantKind;
use p2p_energy_sim::participants::catalog::catalog;
use p2p_energy_sim::sim::report::TradeStats;
use p2p_energy_sim::sim::scheduler::{FixedInterval, Immediate, RunOutcome, Scheduler};
use p2p_energy_sim::sim::{GameEngine, GameEvent, TickSummary, Topic};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    participant: Option<String>,
    tick_ms: Option<u64>,
    max_ticks: Option<usize>,
    telemetry_out: Option<String>,
    trades_out: Option<String>,
    quiet: bool,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("p2p-energy-sim: peer-to-peer energy trading game simulator");
    eprintln!();
    eprintln!("Usage: p2p-energy-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load game from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        GameConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    let kinds: Vec<&str> = catalog().iter().map(|p| p.kind.as_str()).collect();
    eprintln!(
        "  --participant <kind>     Override participant type ({})",
        kinds.join(", ")
    );
    eprintln!("  --tick-ms <u64>          Sleep between ticks (paced run)");
    eprintln!("  --max-ticks <usize>      Stop after this many ticks");
    eprintln!("  --telemetry-out <path>   Export per-tick summaries to CSV");
    eprintln!("  --trades-out <path>      Export the trade ledger to CSV");
    eprintln!("  --quiet                  Do not print per-tick lines");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the game");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the demo preset is used.");
    eprintln!("Set RUST_LOG to control log verbosity (default: info).");
}

fn value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("error: {flag} requires {what}");
            process::exit(1);
        }
    }
}

fn parsed<T: std::str::FromStr>(args: &[String], i: usize, flag: &str, ty: &str) -> T {
    let raw = value(args, i, flag, &format!("a {ty} argument"));
    raw.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{raw}\" is not a valid {ty}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        participant: None,
        tick_ms: None,
        max_ticks: None,
        telemetry_out: None,
        trades_out: None,
        quiet: false,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(value(&args, i, "--scenario", "a path argument").into());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(value(&args, i, "--preset", "a name argument").into());
            }
            "--seed" => {
                i += 1;
                cli.seed_override = Some(parsed(&args, i, "--seed", "u64"));
            }
            "--participant" => {
                i += 1;
                cli.participant = Some(value(&args, i, "--participant", "a kind argument").into());
            }
            "--tick-ms" => {
                i += 1;
                cli.tick_ms = Some(parsed(&args, i, "--tick-ms", "u64"));
            }
            "--max-ticks" => {
                i += 1;
                cli.max_ticks = Some(parsed(&args, i, "--max-ticks", "usize"));
            }
            "--telemetry-out" => {
                i += 1;
                cli.telemetry_out =
                    Some(value(&args, i, "--telemetry-out", "a path argument").into());
            }
            "--trades-out" => {
                i += 1;
                cli.trades_out = Some(value(&args, i, "--trades-out", "a path argument").into());
            }
            "--quiet" | "-q" => {
                cli.quiet = true;
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                cli.port = parsed(&args, i, "--port", "u16");
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Loads the configuration: `--scenario` takes priority, then `--preset`,
/// then the demo default. CLI overrides are applied last.
fn load_config(cli: &CliArgs) -> GameConfig {
    let loaded = if let Some(ref path) = cli.scenario_path {
        GameConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        GameConfig::from_preset(name)
    } else {
        Ok(GameConfig::demo())
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed_override {
        config.game.seed = seed;
    }
    if let Some(ref kind) = cli.participant {
        if let Err(e) = kind.parse::<ParticipantKind>() {
            eprintln!("error: {e}");
            process::exit(1);
        }
        config.game.participant = kind.clone();
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

/// Subscribes the console and telemetry sinks. Returns the shared
/// telemetry buffer filled on every `GameStateUpdated`.
fn subscribe(engine: &mut GameEngine, quiet: bool) -> Rc<RefCell<Vec<TickSummary>>> {
    let telemetry = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&telemetry);
    engine.on(Topic::GameStateUpdated, move |event| {
        if let GameEvent::GameStateUpdated(summary) = event {
            if !quiet {
                println!("{summary}");
            }
            sink.borrow_mut().push(summary.clone());
        }
        Ok(())
    });

    engine.on(Topic::WeatherChanged, |event| {
        if let GameEvent::WeatherChanged(weather) = event {
            info!("weather is now {weather}");
        }
        Ok(())
    });

    engine.on(Topic::TradeError, |event| {
        if let GameEvent::TradeError { message } = event {
            warn!("trade rejected: {message}");
        }
        Ok(())
    });

    telemetry
}

fn run(engine: &mut GameEngine, cli: &CliArgs) -> RunOutcome {
    match cli.tick_ms {
        Some(ms) if ms > 0 => {
            let mut scheduler = Scheduler::new(FixedInterval::from_millis(ms));
            if let Some(limit) = cli.max_ticks {
                scheduler = scheduler.with_limit(limit);
            }
            scheduler.run(engine)
        }
        _ => {
            let mut scheduler = Scheduler::new(Immediate);
            if let Some(limit) = cli.max_ticks {
                scheduler = scheduler.with_limit(limit);
            }
            scheduler.run(engine)
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = parse_args();
    let config = load_config(&cli);

    let mut engine = GameEngine::from_config(config);
    let telemetry = subscribe(&mut engine, cli.quiet);

    let outcome = run(&mut engine, &cli);
    if outcome.report.is_none() {
        engine.stop();
    }

    let player_id = engine.player().map(|p| p.id.clone()).unwrap_or_default();
    let stats = TradeStats::from_trades(engine.game_state().ledger.iter(), &player_id);
    println!("\n{stats}");

    match engine.final_report() {
        Some(report) => println!("\n{report}"),
        None => println!(
            "\nGame stopped after {} ticks (day {}), before the final day.",
            outcome.firings,
            engine.game_state().clock.day()
        ),
    }

    let telemetry: Vec<TickSummary> = telemetry.borrow().clone();

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_telemetry(&telemetry, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }

    if let Some(ref path) = cli.trades_out {
        // Oldest first in the file.
        let trades = engine.game_state().ledger.iter().rev();
        if let Err(e) = export_trades(trades, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Trades written to {path}");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(p2p_energy_sim::api::AppState::from_engine(
            &engine, telemetry,
        ));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(p2p_energy_sim::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}
