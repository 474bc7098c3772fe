use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use page_translator::core::{
    print_error_message, print_info_message, restore_html, translate_html,
};
use page_translator::env::{core::LogLevel, EnvVar};
use page_translator::translation::{
    ConfigManager, EngineConfig, HttpTranslator, StateStore, TranslationConfig, TranslationResult,
};

#[derive(Parser, Debug)]
#[command(name = "page-translator", version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Only log errors and suppress info output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate every text node of a document
    Translate {
        /// Input file, `-` for stdin
        input: String,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Translation endpoint
        #[arg(long)]
        api_url: Option<String>,

        /// Text nodes per request
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Document charset
        #[arg(short, long)]
        encoding: Option<String>,
    },

    /// Restore translated text nodes to their originals
    Restore {
        /// Input file, `-` for stdin
        input: String,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document charset
        #[arg(short, long)]
        encoding: Option<String>,
    },

    /// Flip the persisted toggle and apply the new state to a document
    Toggle {
        /// Input file, `-` for stdin
        input: String,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Translation endpoint
        #[arg(long)]
        api_url: Option<String>,

        /// Document charset
        #[arg(short, long)]
        encoding: Option<String>,
    },

    /// Print the persisted toggle state
    Status,

    /// Write an example configuration file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },

    /// Host a document and accept toggle signals over HTTP
    #[cfg(feature = "web")]
    Serve {
        /// Input file, `-` for stdin
        input: String,

        /// Bind address
        #[arg(long)]
        bind: Option<String>,

        /// Port
        #[arg(short, long)]
        port: Option<u16>,

        /// Document charset
        #[arg(short, long)]
        encoding: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    if let Err(e) = run(cli).await {
        print_error_message(&format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn init_logging(quiet: bool) {
    let level = if quiet {
        "error".to_string()
    } else {
        LogLevel::get().unwrap_or_else(|e| {
            eprintln!("{}", e);
            "info".to_string()
        })
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::new(format!("page_translator={}", level)))
        .init();
}

async fn run(cli: Cli) -> TranslationResult<()> {
    let quiet = cli.quiet;
    let info = |msg: &str| {
        if !quiet {
            print_info_message(msg);
        }
    };

    match cli.command {
        Command::Translate {
            input,
            output,
            api_url,
            batch_size,
            encoding,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(api_url) = api_url {
                config.api_url = api_url;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            config.validate()?;

            let data = read_input(&input)?;
            let (result, report) = translate_html(
                &data,
                encoding.as_deref(),
                HttpTranslator::new(&config)?,
                EngineConfig::from(&config),
            )
            .await?;
            write_output(output.as_deref(), &result)?;

            info(&format!(
                "Translated {} text nodes in {} batches ({} failed)",
                report.nodes_marked, report.batches_total, report.batches_failed
            ));
        }

        Command::Restore {
            input,
            output,
            encoding,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let data = read_input(&input)?;
            let (result, restored) =
                restore_html(&data, encoding.as_deref(), &config.marker_class)?;
            write_output(output.as_deref(), &result)?;

            info(&format!("Restored {} text nodes", restored));
        }

        Command::Toggle {
            input,
            output,
            api_url,
            encoding,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(api_url) = api_url {
                config.api_url = api_url;
            }
            config.validate()?;

            let store = StateStore::from_config(&config);
            let enabled = !store.is_enabled()?;
            let data = read_input(&input)?;

            let result = if enabled {
                let (result, report) = translate_html(
                    &data,
                    encoding.as_deref(),
                    HttpTranslator::new(&config)?,
                    EngineConfig::from(&config),
                )
                .await?;
                info(&format!(
                    "Translation enabled: {} text nodes translated",
                    report.nodes_marked
                ));
                result
            } else {
                let (result, restored) =
                    restore_html(&data, encoding.as_deref(), &config.marker_class)?;
                info(&format!(
                    "Translation disabled: {} text nodes restored",
                    restored
                ));
                result
            };

            write_output(output.as_deref(), &result)?;
            // Only persist once the document was written
            store.set(enabled)?;
        }

        Command::Status => {
            let manager = match cli.config.as_deref() {
                Some(path) => ConfigManager::from_file(path)?,
                None => ConfigManager::new()?,
            };
            let store = StateStore::from_config(manager.get_config());
            let state = store.load()?;

            println!("translation: {}", state.state());
            println!("state file: {}", store.path().display());
            if let Some(updated_at) = state.updated_at {
                println!("updated at: {}", updated_at.to_rfc3339());
            }
            match manager.source() {
                Some(path) => println!("config file: {}", path.display()),
                None => println!("config file: none"),
            }
        }

        Command::InitConfig { path } => {
            ConfigManager::generate_example_config(&path)?;
            info(&format!("Example configuration written to {}", path.display()));
        }

        #[cfg(feature = "web")]
        Command::Serve {
            input,
            bind,
            port,
            encoding,
        } => {
            use page_translator::web::{ToggleServer, WebConfig};

            let config = load_config(cli.config.as_deref())?;
            let mut web_config = WebConfig::default();
            if let Some(bind) = bind {
                web_config.bind_addr = bind;
            }
            if let Some(port) = port {
                web_config.port = port;
            }

            let data = read_input(&input)?;
            ToggleServer::new(web_config, config)
                .start(data, encoding)
                .await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> TranslationResult<TranslationConfig> {
    let manager = match path {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    Ok(manager.into_config())
}

fn read_input(input: &str) -> TranslationResult<Vec<u8>> {
    if input == "-" {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        Ok(data)
    } else {
        Ok(fs::read(input)?)
    }
}

fn write_output(output: Option<&Path>, data: &[u8]) -> TranslationResult<()> {
    match output {
        Some(path) => fs::write(path, data)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
