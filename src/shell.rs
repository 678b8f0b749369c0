//! Interactive menu.
//!
//! Thin line-oriented I/O over the configuration manager and the simulator:
//! a fixed 9-option menu, one line of input per selection, read
//! asynchronously from stdin. Parse failures and validation failures are
//! reported and discarded; the shell never crashes on bad input.

use anyhow::Result;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::config::{Config, ConfigManager, ConfigPatch};
use crate::logger::ActivityLog;
use crate::simulator::{DryRunDriver, EnigoDriver, InputDriver, Simulator};

type InputLines = Lines<BufReader<Stdin>>;

/// The editable scalar fields, each mapped to a typed patch. Booleans toggle
/// rather than prompt; the range pair is edited together via option 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    IntervalSeconds,
    MovementPixels,
    SilentMode,
    LogFilePath,
    RandomInterval,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Self::IntervalSeconds => "interval_seconds",
            Self::MovementPixels => "movement_pixels",
            Self::SilentMode => "silent_mode",
            Self::LogFilePath => "log_file_path",
            Self::RandomInterval => "random_interval",
        }
    }

    pub fn is_toggle(self) -> bool {
        matches!(self, Self::SilentMode | Self::RandomInterval)
    }

    fn display_value(self, config: &Config) -> String {
        match self {
            Self::IntervalSeconds => config.interval_seconds.to_string(),
            Self::MovementPixels => config.movement_pixels.to_string(),
            Self::SilentMode => config.silent_mode.to_string(),
            Self::LogFilePath => config.log_file_path.clone(),
            Self::RandomInterval => config.random_interval.to_string(),
        }
    }
}

/// Interactive shell over a configuration manager and the activity loop.
pub struct Shell {
    manager: ConfigManager,
    log: ActivityLog,
    dry_run: bool,
}

impl Shell {
    pub fn new(manager: ConfigManager, log: ActivityLog, dry_run: bool) -> Self {
        Self {
            manager,
            log,
            dry_run,
        }
    }

    /// Main menu loop. Returns on "Exit", end of input, or Ctrl+C while
    /// waiting for input.
    pub async fn run(&mut self) -> Result<()> {
        if self.manager.current().is_none() {
            self.manager.load()?;
        }
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print_menu();
            let Some(choice) = prompt(&mut lines, "Select option: ").await? else {
                println!("\nExiting...");
                break;
            };
            if !self.handle_choice(choice.trim(), &mut lines).await? {
                break;
            }
        }
        Ok(())
    }

    /// Dispatch one menu selection. Returns `Ok(false)` when the shell
    /// should exit.
    async fn handle_choice(&mut self, choice: &str, lines: &mut InputLines) -> Result<bool> {
        match choice {
            "1" => self.show_config(),
            "2" => return self.edit_field(Field::IntervalSeconds, lines).await,
            "3" => return self.edit_field(Field::MovementPixels, lines).await,
            "4" => return self.edit_field(Field::SilentMode, lines).await,
            "5" => return self.edit_field(Field::LogFilePath, lines).await,
            "6" => return self.edit_field(Field::RandomInterval, lines).await,
            "7" => return self.edit_interval_range(lines).await,
            "8" => self.start_loop().await,
            "9" => {
                println!("Exiting...");
                return Ok(false);
            }
            _ => println!("Invalid option. Please enter a number 1-9."),
        }
        Ok(true)
    }

    fn config_snapshot(&mut self) -> Result<Config> {
        match self.manager.current() {
            Some(cfg) => Ok(cfg.clone()),
            None => self.manager.load(),
        }
    }

    fn show_config(&mut self) {
        let config = match self.config_snapshot() {
            Ok(cfg) => cfg,
            Err(err) => {
                println!("Error loading configuration: {err:#}");
                return;
            }
        };
        println!("\n--- Current Configuration ---");
        println!("interval_seconds: {}", config.interval_seconds);
        println!("movement_pixels: {}", config.movement_pixels);
        println!("silent_mode: {}", config.silent_mode);
        println!("log_file_path: {}", config.log_file_path);
        println!("random_interval: {}", config.random_interval);
        if config.random_interval {
            println!(
                "interval_range: {}-{}s",
                config.interval_range_min, config.interval_range_max
            );
        }
        println!("-----------------------------");
    }

    /// Prompt for and apply one field edit. Returns `Ok(false)` only when
    /// input was closed under the prompt.
    async fn edit_field(&mut self, field: Field, lines: &mut InputLines) -> Result<bool> {
        let config = self.config_snapshot()?;
        println!("\nCurrent {}: {}", field.name(), field.display_value(&config));

        if field.is_toggle() {
            self.apply_field_edit(field, None);
            return Ok(true);
        }

        let Some(input) =
            prompt(lines, &format!("Enter new value for {}: ", field.name())).await?
        else {
            println!("\nExiting...");
            return Ok(false);
        };
        let input = input.trim();
        if input.is_empty() {
            println!("No value entered. Keeping current value.");
            return Ok(true);
        }
        self.apply_field_edit(field, Some(input));
        Ok(true)
    }

    /// Parse, merge, validate, and persist one field edit. Failures are
    /// reported to the user and discarded; returns whether the edit stuck.
    pub fn apply_field_edit(&mut self, field: Field, raw: Option<&str>) -> bool {
        let config = match self.config_snapshot() {
            Ok(cfg) => cfg,
            Err(err) => {
                println!("Error updating configuration: {err:#}");
                return false;
            }
        };
        let (old, new, patch) = match build_patch(field, &config, raw) {
            Ok(parts) => parts,
            Err(message) => {
                println!("{message}");
                return false;
            }
        };
        if field.is_toggle() {
            println!("Toggling {} to: {new}", field.name());
        }
        match self.manager.update(patch) {
            Ok(updated) => {
                self.log.config_change(field.name(), &old, &new);
                if field == Field::LogFilePath {
                    // Subsequent events go to the new location.
                    self.log = ActivityLog::new(&updated.log_file_path);
                }
                println!("Updated {}: {old} -> {new}", field.name());
                true
            }
            Err(err) => {
                println!("Error: {err:#}");
                false
            }
        }
    }

    /// Prompt for both ends of the random range; validation of the pair is
    /// deferred to the configuration manager.
    async fn edit_interval_range(&mut self, lines: &mut InputLines) -> Result<bool> {
        let config = self.config_snapshot()?;
        println!(
            "\nCurrent interval range: {}-{}s",
            config.interval_range_min, config.interval_range_max
        );

        let Some(min_input) = prompt(lines, "Enter minimum interval (seconds, 10-3600): ").await?
        else {
            println!("\nExiting...");
            return Ok(false);
        };
        if min_input.trim().is_empty() {
            println!("No value entered. Keeping current values.");
            return Ok(true);
        }
        let Some(max_input) = prompt(lines, "Enter maximum interval (seconds, 10-3600): ").await?
        else {
            println!("\nExiting...");
            return Ok(false);
        };
        if max_input.trim().is_empty() {
            println!("No value entered. Keeping current values.");
            return Ok(true);
        }

        self.apply_range_edit(min_input.trim(), max_input.trim());
        Ok(true)
    }

    /// Parse and apply a min/max pair edit. Returns whether the edit stuck.
    pub fn apply_range_edit(&mut self, min_raw: &str, max_raw: &str) -> bool {
        let (Ok(min), Ok(max)) = (min_raw.parse::<u32>(), max_raw.parse::<u32>()) else {
            println!("Invalid input. Please enter valid integer values.");
            return false;
        };
        let config = match self.config_snapshot() {
            Ok(cfg) => cfg,
            Err(err) => {
                println!("Error updating configuration: {err:#}");
                return false;
            }
        };
        let old = format!(
            "{}-{}",
            config.interval_range_min, config.interval_range_max
        );
        match self.manager.update(ConfigPatch::range(min, max)) {
            Ok(_) => {
                let new = format!("{min}-{max}");
                self.log.config_change("interval_range", &old, &new);
                println!("Updated interval range: {old}s -> {new}s");
                true
            }
            Err(err) => {
                println!("Error: {err:#}");
                false
            }
        }
    }

    /// Build a simulator from the current record and block until the loop is
    /// interrupted, then return to the menu.
    async fn start_loop(&mut self) {
        let config = match self.manager.load() {
            Ok(cfg) => cfg,
            Err(err) => {
                println!("Error loading configuration: {err:#}");
                return;
            }
        };
        let driver: Box<dyn InputDriver> = if self.dry_run {
            Box::new(DryRunDriver::new())
        } else {
            Box::new(EnigoDriver::new())
        };
        let mut simulator = Simulator::new(config, self.log.clone(), driver);

        println!("\nStarting idle prevention... Press Ctrl+C to stop.");
        simulator.run().await;
        println!("\nIdle prevention stopped.");
    }
}

fn print_menu() {
    println!("\n=== Notidle ===");
    println!("1. View current configuration");
    println!("2. Edit interval (seconds)");
    println!("3. Edit movement (pixels)");
    println!("4. Toggle silent mode");
    println!("5. Edit log file path");
    println!("6. Toggle random interval");
    println!("7. Edit random interval range");
    println!("8. Start idle prevention");
    println!("9. Exit");
    println!();
}

/// Print a prompt and read one line. `None` means end of input or Ctrl+C
/// while waiting.
async fn prompt(lines: &mut InputLines, text: &str) -> Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    tokio::select! {
        line = lines.next_line() => Ok(line?),
        _ = tokio::signal::ctrl_c() => Ok(None),
    }
}

/// Turn raw user input into a typed patch plus old/new display values, or a
/// user-facing message when the input does not parse.
fn build_patch(
    field: Field,
    config: &Config,
    raw: Option<&str>,
) -> Result<(String, String, ConfigPatch), String> {
    let old = field.display_value(config);
    let (new, patch) = match field {
        Field::IntervalSeconds => {
            let value = parse_int(raw)?;
            (
                value.to_string(),
                ConfigPatch {
                    interval_seconds: Some(value),
                    ..ConfigPatch::default()
                },
            )
        }
        Field::MovementPixels => {
            let value = parse_int(raw)?;
            (
                value.to_string(),
                ConfigPatch {
                    movement_pixels: Some(value),
                    ..ConfigPatch::default()
                },
            )
        }
        Field::SilentMode => {
            let value = !config.silent_mode;
            (
                value.to_string(),
                ConfigPatch {
                    silent_mode: Some(value),
                    ..ConfigPatch::default()
                },
            )
        }
        Field::LogFilePath => {
            let value = raw.unwrap_or_default().to_string();
            (
                value.clone(),
                ConfigPatch {
                    log_file_path: Some(value),
                    ..ConfigPatch::default()
                },
            )
        }
        Field::RandomInterval => {
            let value = !config.random_interval;
            (
                value.to_string(),
                ConfigPatch {
                    random_interval: Some(value),
                    ..ConfigPatch::default()
                },
            )
        }
    };
    Ok((old, new, patch))
}

fn parse_int(raw: Option<&str>) -> Result<u32, String> {
    raw.and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| "Invalid input. Please enter a valid value.".to_string())
}
