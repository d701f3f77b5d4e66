use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;

use redactor::batch::{self, BatchController};
use redactor::cli::{Cli, Commands};
use redactor::config::AppConfig;
use redactor::input::InputListener;
use redactor::keybindings::{Action, KeyBindings};
use redactor::render::LogRenderer;
use redactor::scan::scan_folder;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config --init` must work even when the file is missing or unreadable.
    let (mut config, source) = if matches!(cli.command, Commands::Config { init: true }) {
        (AppConfig::default(), None)
    } else {
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    init_logging(&config, cli.verbose);
    match &source {
        Some(path) => log::info!("Loaded configuration from {:?}", path),
        None => log::debug!("No configuration file, using defaults"),
    }

    match cli.command {
        Commands::Edit {
            folder,
            json,
            output_dir,
            color,
            script,
        } => {
            let prefs = &mut config.preferences;
            if let Some(json) = json {
                prefs.json_path = json;
            }
            if let Some(output_dir) = output_dir {
                prefs.output_dir = output_dir;
            }
            if let Some(color) = color {
                prefs.rectangle_color = color;
            }

            let images = scan_folder(&folder)
                .with_context(|| format!("Failed to scan {}", folder.display()))?;
            if images.is_empty() {
                bail!("No images found in {}", folder.display());
            }

            let listener = match &script {
                Some(path) => {
                    let file = File::open(path)
                        .with_context(|| format!("Failed to open script {}", path.display()))?;
                    InputListener::spawn(BufReader::new(file), config.keybindings.clone(), false)?
                }
                None => {
                    print_instructions(&config.keybindings);
                    let debounce = config.preferences.debounce;
                    let stdin = BufReader::new(io::stdin());
                    InputListener::spawn(stdin, config.keybindings.clone(), debounce)?
                }
            };

            let prefs = &config.preferences;
            let mut controller =
                BatchController::new(LogRenderer::new(), listener, prefs.batch_options());
            let outcome = controller.run(&images, prefs.rectangle_color, &prefs.output_dir)?;

            batch::save_all(&outcome.records, &prefs.json_path)
                .with_context(|| format!("Failed to save {}", prefs.json_path.display()))?;

            println!(
                "Finalized {} of {} image(s){}",
                outcome.records.len(),
                images.len(),
                if outcome.terminated { " (terminated)" } else { "" }
            );
            println!("Metadata: {}", prefs.json_path.display());
            println!("Rendered: {}", prefs.output_dir.display());
            report_failures(&outcome.failures);
        }

        Commands::Render { input, output_dir } => {
            let output_dir = output_dir.unwrap_or_else(|| config.preferences.output_dir.clone());
            let records = batch::load_all(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let outcome = batch::render_records(&records, &output_dir)?;

            println!(
                "Rendered {} of {} image(s) to {}",
                outcome.rendered.len(),
                records.len(),
                output_dir.display()
            );
            report_failures(&outcome.failures);
        }

        Commands::Config { init } => {
            if init {
                let path = AppConfig::init(cli.config.as_deref())
                    .context("Failed to write configuration")?;
                println!("Wrote default configuration to {}", path.display());
            } else {
                print_config_location(cli.config.as_deref(), source.as_deref());
                println!("{}", config.to_json()?);
            }
        }
    }

    Ok(())
}

/// Log level comes from `--verbose`, then `RUST_LOG`, then the config file.
fn init_logging(config: &AppConfig, verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        config.preferences.log_level.to_level_filter()
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if !verbose {
        builder.parse_default_env();
    }
    builder.init();
}

fn print_instructions(bindings: &KeyBindings) {
    println!("Type commands and press Enter:");
    println!("  down X Y / up X Y   press / release the pointer at a pixel");
    println!("  click X Y           press and release at the same pixel");
    for action in Action::all() {
        let binding = bindings.binding(*action);
        println!("  {:<20}{}", binding.key, action.name());
    }
    println!();
}

fn print_config_location(explicit: Option<&Path>, source: Option<&Path>) {
    match source {
        Some(path) => println!("# {}", path.display()),
        None => match explicit.map(Path::to_path_buf).or_else(AppConfig::default_path) {
            Some(path) => println!("# {} (not found, showing defaults)", path.display()),
            None => println!("# no config directory, showing defaults"),
        },
    }
}

fn report_failures(failures: &[batch::ImageFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("{} image(s) failed:", failures.len());
    for failure in failures {
        eprintln!("  {}: {}", failure.path.display(), failure.error);
    }
}
