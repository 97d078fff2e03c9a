use anyhow::{Context, Result};
use clap::Parser;
use docustruct::{cli, config, display, export, extractor, interactive, oneshot, workflow};
use docustruct_common::ExtractionResult;
use cli::{Cli, Commands};
use config::Config;
use extractor::GeminiClient;
use tracing_subscriber::EnvFilter;
use workflow::Session;

fn init_tracing(verbose: bool) {
    let default = if verbose { "docustruct=debug,docustruct_common=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Extract { file, preset, fields, no_defaults, format, output } => {
            println!("📄 docustruct - extract\n");

            let client = GeminiClient::from_config(&config)?;
            let mut session = Session::new();
            session.select_preset(&preset)?;
            oneshot::apply_field_overrides(&mut session, &fields, no_defaults)?;

            oneshot::run_extract(&client, &mut session, &file, &format, output.as_deref()).await?;

            println!("\n✅ Extraction finished");
        }

        Commands::Session { file, preset } => {
            let api_key = interactive::resolve_api_key_interactive(&config)?;
            let client = GeminiClient::with_api_key(&config, api_key);

            let mut session = Session::new();
            if let Some(preset) = preset {
                session.select_preset(&preset)?;
            }
            interactive::run_session(&client, &mut session, file.as_deref()).await?;
        }

        Commands::Project { input, format, output } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("cannot read extraction result: {}", input.display()))?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("not valid JSON: {}", input.display()))?;
            let result = ExtractionResult::new(value);

            display::print_projection(&docustruct_common::project(&result));

            if let Some(output) = output {
                for path in export::export_result(&result, &format, &output)? {
                    println!("✔ Saved: {}", path.display());
                }
            }
        }

        Commands::Presets => {
            display::print_presets();
        }

        Commands::Config { set_api_key, set_model, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API key saved");
            }

            if let Some(model) = set_model {
                config.set_model(model)?;
                println!("✔ Model set: {}", config.model);
            }

            if show {
                println!("Configuration:");
                println!("  Model: {}", config.model);
                println!("  API endpoint: {}", config.api_base_url);
                println!("  API key: {}", if config.has_api_key() { "set" } else { "not set" });
                if let Ok(path) = Config::config_path() {
                    println!("  Config file: {}", path.display());
                }
            }
        }
    }

    Ok(())
}
