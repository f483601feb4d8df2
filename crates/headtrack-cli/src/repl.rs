//! REPL – interactive shell for tuning and offline replay.
//!
//! Supported slash-commands:
//!   /help                     – show this list
//!   /settings                 – edit `~/.headtrack/config.toml`
//!   /replay <file>            – run a recorded pose log through the pipeline
//!   /profile <file>           – load and summarise a mapping profile
//!   /profile-template <file>  – write an identity six-axis profile
//!   /quit | /exit             – leave the shell

use colored::Colorize;
use headtrack_mapping::{MappingConfig, load_profile, save_profile};
use headtrack_runtime::{FrameOutput, TrackingPipeline};
use headtrack_types::DeadzoneSettings;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{self, Config};
use crate::replay;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Settings,
    Replay(PathBuf),
    Profile(PathBuf),
    ProfileTemplate(PathBuf),
    Quit,
    MissingArgument(&'static str),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let path = |cmd: &'static str, build: fn(PathBuf) -> Command| {
            if arg.is_empty() {
                Command::MissingArgument(cmd)
            } else {
                build(PathBuf::from(arg))
            }
        };
        Some(match name {
            "/help" => Command::Help,
            "/settings" => Command::Settings,
            "/replay" => path("/replay", Command::Replay),
            "/profile" => path("/profile", Command::Profile),
            "/profile-template" => path("/profile-template", Command::ProfileTemplate),
            "/quit" | "/exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// Entry point for the interactive REPL.  `shutdown` is polled each
/// iteration; when set the REPL exits.
pub fn run(shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "headtrack>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let Some(cmd) = Command::parse(&line) else {
            continue;
        };
        match cmd {
            Command::Help => cmd_help(),
            Command::Settings => cmd_settings(),
            Command::Replay(path) => cmd_replay(&path),
            Command::Profile(path) => cmd_profile(&path),
            Command::ProfileTemplate(path) => cmd_profile_template(&path),
            Command::Quit => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Command::MissingArgument(name) => {
                println!("{} {} <file>", "Usage:".yellow(), name.bold());
            }
            Command::Unknown(other) => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Headtrack Commands".bold().underline());
    println!("  {}                    – edit ~/.headtrack/config.toml", "/settings".bold().cyan());
    println!("  {}               – replay a pose log", "/replay <file>".bold().cyan());
    println!("  {}              – inspect a mapping profile", "/profile <file>".bold().cyan());
    println!("  {}     – write an identity profile", "/profile-template <file>".bold().cyan());
    println!("  {}                 – exit", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_settings() {
    let mut cfg = match config::load() {
        Ok(Some(c)) => c,
        Ok(None) => Config::default(),
        Err(e) => {
            println!("{}: {}", "Error loading config".red(), e);
            return;
        }
    };

    println!("{}", "Settings Editor".bold().underline());
    cfg.smoothing = prompt_f32(
        &format!("  Smoothing 0..1       [{}]: ", cfg.smoothing),
        cfg.smoothing,
        |v| (0.0..=1.0).contains(&v),
    );
    let sensitivity = prompt_f32(
        &format!("  Sensitivity (all)    [{}]: ", cfg.sensitivity.yaw),
        cfg.sensitivity.yaw,
        |v| v.is_finite(),
    );
    cfg.sensitivity.yaw = sensitivity;
    cfg.sensitivity.pitch = sensitivity;
    cfg.sensitivity.roll = sensitivity;
    let deadzone = prompt_f32(
        &format!("  Deadzone deg (all)   [{}]: ", cfg.deadzone.yaw),
        cfg.deadzone.yaw,
        |v| v >= 0.0,
    );
    cfg.deadzone = DeadzoneSettings::uniform(deadzone);
    cfg.frame_rate = prompt_f32(
        &format!("  Replay frame rate Hz [{}]: ", cfg.frame_rate),
        cfg.frame_rate,
        |v| v > 0.0,
    );
    let remote = prompt_str(
        &format!("  Remote source        [{}]: ", cfg.remote_source),
        &cfg.remote_source.to_string(),
    );
    match config::parse_flag(&remote) {
        Some(flag) => cfg.remote_source = flag,
        None => println!("  {} '{}' is not a yes/no value, keeping {}", "Warning:".yellow(), remote, cfg.remote_source),
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "{} {}",
            "✓ Settings saved to".green(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

fn cmd_replay(path: &Path) {
    let cfg = load_config_or_default();
    let frames = match replay::load_replay(path) {
        Ok(frames) => frames,
        Err(e) => {
            println!("{}: {}", "Replay error".red(), e);
            return;
        }
    };
    let mut pipeline = match cfg.pipeline_config().and_then(TrackingPipeline::new) {
        Ok(p) => p,
        Err(e) => {
            println!("{}: {}", "Pipeline error".red(), e);
            return;
        }
    };

    println!(
        "  Replaying {} frame(s) at {} Hz (session {})",
        frames.len().to_string().bold(),
        cfg.frame_rate,
        pipeline.session_id().to_string().dimmed()
    );
    println!("  {:>6}  {:<12} {:>9} {:>9} {:>9}", "frame", "state", "yaw", "pitch", "roll");
    let summary = replay::run_replay(&mut pipeline, &frames, cfg.remote_source, cfg.frame_dt(), print_frame);

    println!(
        "  {} {} frame(s), {} without data, {} recenter suggestion(s)",
        "✓".green().bold(),
        summary.frames,
        summary.frames_without_data,
        summary.recenter_suggestions
    );
    if let Some(last) = summary.last {
        let aim = last.aim_direction;
        println!(
            "  Final state {}, aim ({:.3}, {:.3}, {:.3})",
            last.loss_state.name().bold(),
            aim.x,
            aim.y,
            aim.z
        );
    }
}

fn print_frame(idx: usize, out: &FrameOutput) {
    let state = out.loss_state.name();
    if out.pose.is_valid() {
        println!(
            "  {:>6}  {:<12} {:>9.3} {:>9.3} {:>9.3}",
            idx, state, out.pose.yaw, out.pose.pitch, out.pose.roll
        );
    } else {
        println!("  {:>6}  {:<12} {:>9} {:>9} {:>9}", idx, state, "-", "-", "-");
    }
}

fn cmd_profile(path: &Path) {
    let profile = match load_profile(path) {
        Ok(p) => p,
        Err(e) => {
            println!("{}: {}", "Profile error".red(), e);
            return;
        }
    };
    if let Err(e) = profile.validate() {
        println!("{}: {}", "Profile error".red(), e);
        return;
    }
    println!("{}", format!("Profile {}", path.display()).bold().underline());
    for axis in &profile.axes {
        let source = axis.source.map_or("none", |s| s.name());
        println!(
            "  {:<6} ← {:<6} x{:<7.3} {:<9} dz [{:.2}, {:.2}]{}{}",
            axis.target.name(),
            source,
            axis.sensitivity,
            axis.curve.name(),
            axis.deadzone_min,
            axis.deadzone_max,
            if axis.inverted { "  inverted" } else { "" },
            if axis.enable_limits {
                format!("  limits [{:.1}, {:.1}]", axis.min_limit, axis.max_limit)
            } else {
                String::new()
            },
        );
    }
}

fn cmd_profile_template(path: &Path) {
    match save_profile(&MappingConfig::six_axis(), path) {
        Ok(()) => println!(
            "{} {}",
            "✓ Identity profile written to".green(),
            path.display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error writing profile".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn load_config_or_default() -> Config {
    match config::load() {
        Ok(Some(c)) => c,
        Ok(None) => Config::default(),
        Err(e) => {
            println!("{}: {} – using defaults", "Config error".red(), e);
            Config::default()
        }
    }
}

/// Prompt for an `f32`.  Enter keeps `default`; values failing `accept`
/// are rejected with a warning.
fn prompt_f32(msg: &str, default: f32, accept: impl Fn(f32) -> bool) -> f32 {
    let raw = prompt_str(msg, &default.to_string());
    match raw.parse::<f32>() {
        Ok(v) if accept(v) => v,
        _ => {
            println!("  {} '{}' is out of range, keeping {}", "Warning:".yellow(), raw, default);
            default
        }
    }
}

/// Prompt for a string value.  Returns `default` when the user presses Enter.
pub(crate) fn prompt_str(msg: &str, default: &str) -> String {
    print!("{}", msg);
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() { default.to_string() } else { trimmed }
        }
        Err(_) => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("  /settings  "), Some(Command::Settings));
        assert_eq!(Command::parse("/exit"), Some(Command::Quit));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
    }

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   \n"), None);
    }

    #[test]
    fn path_commands_take_rest_of_line() {
        assert_eq!(
            Command::parse("/replay logs/my session.log"),
            Some(Command::Replay(PathBuf::from("logs/my session.log")))
        );
        assert_eq!(
            Command::parse("/profile-template out.ini"),
            Some(Command::ProfileTemplate(PathBuf::from("out.ini")))
        );
        assert_eq!(
            Command::parse("/profile   sim.ini"),
            Some(Command::Profile(PathBuf::from("sim.ini")))
        );
    }

    #[test]
    fn path_commands_require_argument() {
        assert_eq!(Command::parse("/replay"), Some(Command::MissingArgument("/replay")));
        assert_eq!(Command::parse("/profile  "), Some(Command::MissingArgument("/profile")));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(Command::parse("/dance now"), Some(Command::Unknown("/dance".to_string())));
    }
}
