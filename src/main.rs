use chrono::Utc;
use phoenix::config::Config;
use phoenix::import::{ImportInterval, ImportReport, ImportSchedule};
use phoenix::launch::launch_in_library;
use phoenix::library::Game;
use phoenix::AppContext;
use std::env;
use tracing::{error, info};
use uuid::Uuid;

fn main() {
    // Use RUST_LOG env var if set, otherwise default to info level
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("phoenix");

    let config = Config::load();
    let context = match AppContext::initialize(config) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let command = args.get(1).map(String::as_str);
    let argument = args.get(2).map(String::as_str);

    let result = match command {
        None | Some("auto") => auto_import(&context, &runtime),
        Some("import") => import(&context, &runtime).map(|_| ()),
        Some("list") => {
            list(&context, argument.unwrap_or_default());
            Ok(())
        }
        Some("hidden") => {
            print_games(&context.library.blocking_read().hidden_games());
            Ok(())
        }
        Some("launch") => parse_id(argument).and_then(|id| {
            runtime
                .block_on(launch_in_library(&context.library, id))
                .map(|status| info!("Exited with {}", status))
                .map_err(|e| e.to_string())
        }),
        Some("hide") => parse_id(argument).and_then(|id| set_hidden(&context, id, true)),
        Some("restore") => parse_id(argument).and_then(|id| set_hidden(&context, id, false)),
        Some("clear-steam") => clear_steam(&context),
        Some("evict-cache") => {
            let library = context.library.blocking_read().library().clone();
            runtime
                .block_on(context.images.evict_orphans(&library))
                .map(|count| println!("Removed {} cached images", count))
                .map_err(|e| e.to_string())
        }
        Some("schedule") => schedule(&context, argument),
        Some(other) => {
            error!("Unknown command: {}", other);
            print_usage(program);
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [command]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  auto                  Import from Steam if the schedule says so (default)");
    eprintln!("  import                Import installed Steam games now");
    eprintln!("  list [filter]         List visible games");
    eprintln!("  hidden                List hidden games");
    eprintln!("  launch <id>           Launch a game");
    eprintln!("  hide <id>             Hide a game");
    eprintln!("  restore <id>          Restore a hidden game");
    eprintln!("  clear-steam           Remove every imported Steam game");
    eprintln!("  evict-cache           Remove cached artwork of removed games");
    eprintln!("  schedule [interval]   Show or set automatic import (hourly, daily, weekly, monthly, off)");
}

/// Consent is gathered here on the main thread, the work runs on the runtime
fn import(context: &AppContext, runtime: &tokio::runtime::Runtime) -> Result<ImportReport, String> {
    let Some(source) = context.importer.prepare(&context.broker) else {
        return Err(format!(
            "No access to {}",
            context.importer.steam_root().display()
        ));
    };

    let report = runtime
        .block_on(context.importer.run(source, &context.library))
        .map_err(|e| e.to_string())?;

    println!(
        "Imported {} games ({} already present, {} invalid manifests, {} without store details)",
        report.imported, report.duplicates, report.invalid, report.enrichment_failures
    );
    Ok(report)
}

fn auto_import(context: &AppContext, runtime: &tokio::runtime::Runtime) -> Result<(), String> {
    if !context.importer.schedule().is_due(Utc::now()) {
        info!("Automatic import not due");
        return Ok(());
    }
    import(context, runtime).map(|_| ())
}

fn list(context: &AppContext, filter: &str) {
    let manager = context.library.blocking_read();
    println!("Steam:");
    print_games(&manager.steam_games(filter));
    println!("Other:");
    print_games(&manager.other_games(filter));
}

fn print_games(games: &[&Game]) {
    for game in games {
        let marker = if game.is_invalid() { " (cannot launch)" } else { "" };
        println!("  {}  {}{}", game.id(), game.name, marker);
    }
}

fn parse_id(argument: Option<&str>) -> Result<Uuid, String> {
    let argument = argument.ok_or("Missing game id")?;
    Uuid::parse_str(argument).map_err(|e| format!("Invalid game id '{}': {}", argument, e))
}

fn set_hidden(context: &AppContext, id: Uuid, hidden: bool) -> Result<(), String> {
    let mut manager = context.library.blocking_write();
    let changed = if hidden {
        manager.soft_delete(id)
    } else {
        manager.restore(id)
    };
    if !changed {
        return Err(format!("No game with id {}", id));
    }
    manager.persist().map_err(|e| e.to_string())
}

fn clear_steam(context: &AppContext) -> Result<(), String> {
    let mut manager = context.library.blocking_write();
    let removed = manager.remove_steam_games();
    manager.persist().map_err(|e| e.to_string())?;
    println!("Removed {} Steam games", removed);
    Ok(())
}

fn schedule(context: &AppContext, argument: Option<&str>) -> Result<(), String> {
    let settings = context.settings.as_ref();
    let mut schedule = ImportSchedule::load(settings);

    match argument {
        None => {}
        Some("off") => schedule.enabled = false,
        Some(name) => {
            schedule.interval = ImportInterval::from_name(name)
                .ok_or_else(|| format!("Unknown interval '{}'", name))?;
            schedule.enabled = true;
        }
    }
    schedule.save(settings).map_err(|e| e.to_string())?;

    let last = schedule
        .last_import
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    if schedule.enabled {
        println!(
            "Automatic import: {} (last import: {})",
            schedule.interval.name(),
            last
        );
    } else {
        println!("Automatic import: off (last import: {})", last);
    }
    Ok(())
}
