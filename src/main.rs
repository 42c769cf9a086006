//! hotkey-bridge - register configured global shortcuts and print activations

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use hotkey_bridge::config::{self, Config};
use hotkey_bridge::hotkeys::{HotkeyBackend, HotkeyService, InMemoryBackend};
use hotkey_bridge::logging;
use hotkey_bridge::shortcuts::Platform;

#[derive(Parser)]
#[command(name = "hotkey-bridge")]
#[command(about = "Register global keyboard shortcuts and report their activations")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.hotkey-bridge/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the configured shortcuts and exit
    #[arg(long)]
    list: bool,

    /// Register against an in-memory backend instead of the OS, then exit
    #[arg(long, conflicts_with = "list")]
    dry_run: bool,

    /// Write the default config to the config path and exit
    #[arg(long, conflicts_with_all = ["list", "dry_run"])]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let explicit_config = cli.config.is_some();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);

    if cli.write_default_config {
        if config_path.exists() {
            bail!("{} already exists", config_path.display());
        }
        config::save_config(&config_path, &Config::default())
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    // Before the config load, so its warnings are recorded
    let log_guard = logging::init(None);

    let config = if explicit_config {
        // An explicit path must load; the default path may be absent
        config::try_load_config(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        config::load_config(&config_path)
    };

    if let Some(filter) = config.log_filter.as_deref() {
        log_guard.apply_filter(filter);
    }
    info!(path = %config_path.display(), "hotkey-bridge starting");

    if cli.list {
        print_bindings(&config);
        return Ok(());
    }

    if cli.dry_run {
        let (backend, _handle) = InMemoryBackend::new();
        let service = HotkeyService::with_backend(backend, &config);
        let failed = service.register_bindings(&config.shortcuts);
        print_registrations(&service);
        for failure in &failed {
            println!("FAILED  {:<20} {}", failure.name, failure.error);
        }
        for line in logging::recent_events() {
            println!("        {}", line);
        }
        if !failed.is_empty() {
            bail!("{} shortcut(s) failed to register", failed.len());
        }
        return Ok(());
    }

    run(&config)
}

/// Register with the OS and print one line per activation.
///
/// Windows messages are pumped on the backend's own thread and X11 events
/// arrive on global-hotkey's thread. macOS delivers hotkeys only through the
/// main run loop, which a terminal process does not run.
fn run(config: &Config) -> Result<()> {
    if cfg!(target_os = "macos") {
        bail!(
            "listening for activations needs an application run loop on macOS; \
             embed HotkeyService in the host app or use --dry-run"
        );
    }

    let service = HotkeyService::new(config).context("creating OS hotkey backend")?;
    let activations = service.activations();

    for failure in service.register_bindings(&config.shortcuts) {
        eprintln!("{}: {}", failure.name, failure.error.user_message());
    }
    print_registrations(&service);
    if service.registered().is_empty() {
        bail!("no shortcuts could be registered");
    }

    while let Ok(event) = activations.recv_blocking() {
        println!("{}\t{}", event.slot, event.name);
    }
    Ok(())
}

fn print_bindings(config: &Config) {
    for binding in &config.shortcuts {
        let combo = match binding.descriptor() {
            Ok(descriptor) => descriptor.display_for_platform(Platform::current()),
            Err(e) => format!("<invalid: {}>", e),
        };
        println!(
            "{:<20} {:<16} {}",
            binding.name,
            combo,
            binding.description.as_deref().unwrap_or("")
        );
    }
}

fn print_registrations<B: HotkeyBackend + 'static>(service: &HotkeyService<B>) {
    for registration in service.registered() {
        println!(
            "{:>5}  {:<20} {}",
            registration.slot.get(),
            registration.name.as_str(),
            registration.descriptor.display_for_platform(Platform::current())
        );
    }
}
