//! Cfgsync CLI - inspect and synchronize the overlay's settings files.

use cfgsync::cli::{Cli, CommandResult, Commands};
use cfgsync::derived::build_color_table;
use cfgsync::service::{default_config_dir, ConfigService, GiveMode};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::process;

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let human = cli.human_readable;
    let config_dir = cli.config_dir.unwrap_or_else(default_config_dir);

    if let Err(e) = run_command(cli.command, &config_dir, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!(r#"{{"error": "{}"}}"#, e);
        }
        process::exit(1);
    }
}

/// Route library warnings (repaired values, failed saves) to stderr.
/// RUST_LOG overrides the default `warn` filter.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn run_command(
    command: Option<Commands>,
    config_dir: &Path,
    human: bool,
) -> Result<(), cfgsync::Error> {
    match command.unwrap_or(Commands::Show) {
        Commands::Show => {
            let mut service = ConfigService::new(config_dir)?;
            service.initialize()?;
            output(&ShowOutput::collect(&service, config_dir), human);
        }

        Commands::Sync => {
            let mut service = ConfigService::new(config_dir)?;
            let summary = service.initialize()?;
            output(
                &SyncOutput {
                    changed: summary.changed,
                    save_failed: summary.save_failed,
                },
                human,
            );
        }

        Commands::Reload => {
            let mut service = ConfigService::new(config_dir)?;
            service.initialize()?;
            let summary = service.reload_from_disk(false)?;
            output(
                &ReloadOutput {
                    changed: summary.changed,
                },
                human,
            );
        }

        Commands::Colors => {
            let mut service = ConfigService::new(config_dir)?;
            service.initialize()?;
            let table = build_color_table(&service.search_colors());
            let entries = table
                .iter()
                .map(|(color, name)| ColorEntry {
                    name: name.to_string(),
                    color: format!("{:08X}", color),
                })
                .collect();
            output(&ColorsOutput { entries }, human);
        }

        Commands::Paths => {
            let service = ConfigService::new(config_dir)?;
            output(
                &PathsOutput {
                    overlay: service.overlay_path().display().to_string(),
                    overlay_exists: service.overlay_path().exists(),
                    search_colors: service.search_colors_path().display().to_string(),
                    search_colors_exists: service.search_colors_path().exists(),
                },
                human,
            );
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[derive(Serialize)]
struct ShowOutput {
    config_dir: String,
    #[serde(rename = "centerSearchBarEnabled")]
    center_search_bar_enabled: bool,
    #[serde(rename = "giveMode")]
    give_mode: GiveMode,
    #[serde(rename = "maxColumns")]
    max_columns: i64,
    #[serde(rename = "maxPanelHeight")]
    max_panel_height: i64,
    #[serde(rename = "debugModeEnabled")]
    debug_mode_enabled: bool,
    #[serde(rename = "searchColors")]
    search_colors: Vec<String>,
}

impl ShowOutput {
    fn collect(service: &ConfigService, config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.display().to_string(),
            center_search_bar_enabled: service.is_center_search_bar_enabled(),
            give_mode: service.give_mode(),
            max_columns: service.max_columns(),
            max_panel_height: service.max_panel_height(),
            debug_mode_enabled: service.is_debug_mode_enabled(),
            search_colors: service.search_colors(),
        }
    }
}

impl CommandResult for ShowOutput {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Configuration: {}", self.config_dir),
            format!("  centerSearchBarEnabled  {}", self.center_search_bar_enabled),
            format!("  giveMode                {}", self.give_mode),
            format!("  maxColumns              {}", self.max_columns),
            format!("  maxPanelHeight          {}", self.max_panel_height),
            format!("  debugModeEnabled        {}", self.debug_mode_enabled),
            format!("  searchColors            {} entries", self.search_colors.len()),
        ];
        lines.push(String::new());
        lines.join("\n")
    }
}

#[derive(Serialize)]
struct SyncOutput {
    changed: bool,
    save_failed: bool,
}

impl CommandResult for SyncOutput {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        if self.save_failed {
            "Settings repaired, but writing a backing file failed (see warnings)".to_string()
        } else if self.changed {
            "Settings synchronized; backing files updated".to_string()
        } else {
            "Settings already in sync".to_string()
        }
    }
}

#[derive(Serialize)]
struct ReloadOutput {
    changed: bool,
}

impl CommandResult for ReloadOutput {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        if self.changed {
            "Reloaded; values changed".to_string()
        } else {
            "Reloaded; no changes".to_string()
        }
    }
}

#[derive(Serialize)]
struct ColorEntry {
    name: String,
    color: String,
}

#[derive(Serialize)]
struct ColorsOutput {
    entries: Vec<ColorEntry>,
}

impl CommandResult for ColorsOutput {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{:<12} {}", e.name, e.color))
            .collect();
        if lines.is_empty() {
            lines.push("(no colors)".to_string());
        }
        lines.join("\n")
    }
}

#[derive(Serialize)]
struct PathsOutput {
    overlay: String,
    overlay_exists: bool,
    search_colors: String,
    search_colors_exists: bool,
}

impl CommandResult for PathsOutput {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let mark = |exists: bool| if exists { "present" } else { "missing" };
        format!(
            "{} ({})\n{} ({})",
            self.overlay,
            mark(self.overlay_exists),
            self.search_colors,
            mark(self.search_colors_exists)
        )
    }
}
