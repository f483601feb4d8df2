//! `headtrack` – command line front end for the head-tracking pipeline.
//!
//! 1. Checks for `~/.headtrack/config.toml`; runs a **first-run wizard**
//!    when the file is absent.
//! 2. Validates the configured mapping profile, if any.
//! 3. Drops the user into an **interactive REPL** for tuning and offline
//!    replay of recorded pose logs.
//! 4. Intercepts **Ctrl-C** and leaves the REPL cleanly.

mod config;
mod repl;
mod replay;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

fn main() {
    // RUST_LOG filters, HEADTRACK_LOG_FORMAT=json switches to JSON lines.
    // User-facing output below stays on println!.
    let _telemetry = headtrack_runtime::telemetry::init_tracing("headtrack");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – leaving headtrack …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    // ── First-run wizard ──────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(None) => run_first_run_wizard(),
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    // ── Profile check ─────────────────────────────────────────────────────
    match cfg.pipeline_config() {
        Ok(pipeline) => {
            let mapping = pipeline
                .mapping
                .as_ref()
                .map_or("none".to_string(), |m| format!("{} axis/axes", m.axes.len()));
            println!(
                "  Smoothing {}  ·  frame rate {} Hz  ·  mapping {}",
                cfg.smoothing.to_string().yellow(),
                cfg.frame_rate.to_string().yellow(),
                mapping.yellow()
            );
        }
        Err(e) => {
            println!("{}: {}", "Pipeline configuration error".red(), e);
            println!("  Fix it with {} before replaying.", "/settings".bold());
        }
    }

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    repl::run(shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// First-run wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() -> config::Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║     Headtrack First-Run Wizard       ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's set up head tracking.\n");

    let mut cfg = config::Config::default();

    let smoothing = repl::prompt_str(
        &format!("  Smoothing, 0 = raw .. 1 = heavy [{}]: ", cfg.smoothing),
        &cfg.smoothing.to_string(),
    );
    match smoothing.parse::<f32>() {
        Ok(v) if (0.0..=1.0).contains(&v) => cfg.smoothing = v,
        _ => println!("  {} keeping {}", "Out of range,".yellow(), cfg.smoothing),
    }

    let remote = repl::prompt_str("  Is the tracker on another device? [no]: ", "no");
    cfg.remote_source = config::parse_flag(&remote).unwrap_or(false);

    let rate = repl::prompt_str(
        &format!("  Replay frame rate in Hz [{}]: ", cfg.frame_rate),
        &cfg.frame_rate.to_string(),
    );
    if let Ok(v) = rate.parse::<f32>()
        && v > 0.0
    {
        cfg.frame_rate = v;
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __               ____              __  "#.bold().cyan());
    println!("{}", r#"  / /  ___ ___ ____/ / /________ _____/ /__"#.bold().cyan());
    println!("{}", r#" / _ \/ -_) _ `/ _  / __/ __/ _ `/ __/  '_/"#.bold().cyan());
    println!("{}", r#"/_//_/\__/\_,_/\_,_/\__/_/  \_,_/\__/_/\_\ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "headtrack".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  3DOF head-tracking signal pipeline");
    println!();
}
