// crates/oee-config-cli/src/main.rs
// ============================================================================
// Module: OEE Config CLI Entry Point
// Description: Command dispatcher for the OEE config service.
// Purpose: Run the HTTP service and offer offline document access.
// Dependencies: clap, oee-config-server, oee-config-store, serde_json, tokio
// ============================================================================

//! ## Overview
//! `oee-config` runs the document service (`serve`), validates service
//! configuration (`config check`), and reads or replaces the stored documents
//! directly on disk (`env`, `oee`, `process-order`). Every command resolves
//! configuration the same way the service does, so offline edits land in the
//! same files the HTTP routes serve.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use oee_config_server::ConfigServer;
use oee_config_store::ServiceConfig;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "oee-config", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP document service.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Offline access to the environment document.
    Env {
        /// Selected env subcommand.
        #[command(subcommand)]
        command: DocumentCommand,
    },
    /// Offline access to the OEE configuration document.
    Oee {
        /// Selected OEE subcommand.
        #[command(subcommand)]
        command: DocumentCommand,
    },
    /// Process-order utilities.
    ProcessOrder {
        /// Selected process-order subcommand.
        #[command(subcommand)]
        command: ProcessOrderCommand,
    },
}

/// Shared config file selection.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to oee-config-service.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration, then print the resolved paths.
    Check(ConfigArgs),
}

/// Document subcommands shared by `env` and `oee`.
#[derive(Subcommand, Debug)]
enum DocumentCommand {
    /// Print the stored document.
    Get(ConfigArgs),
    /// Replace the stored document with the contents of a file.
    Set(DocumentSetCommand),
}

/// Arguments for document replacement.
#[derive(Args, Debug)]
struct DocumentSetCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// File holding the new document content.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
}

/// Process-order subcommands.
#[derive(Subcommand, Debug)]
enum ProcessOrderCommand {
    /// Load a process order and print it as formatted JSON.
    Load(ProcessOrderLoadCommand),
}

/// Arguments for loading a process order.
#[derive(Args, Debug)]
struct ProcessOrderLoadCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Process-order file (relative paths resolve against the configured base dir).
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("oee-config {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        Cli::command()
            .print_help()
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(args) => command_serve(&args).await,
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Check(args) => command_config_check(&args),
        },
        Commands::Env {
            command,
        } => command_env(command),
        Commands::Oee {
            command,
        } => command_oee(command).await,
        Commands::ProcessOrder {
            command,
        } => match command {
            ProcessOrderCommand::Load(command) => command_process_order_load(&command),
        },
    }
}

/// Loads service configuration for a command.
fn load_config(args: &ConfigArgs) -> CliResult<ServiceConfig> {
    ServiceConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Runs the HTTP service until it fails.
async fn command_serve(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    let bind = config.server.bind.clone();
    let server = ConfigServer::from_config(config)
        .map_err(|err| CliError::new(format!("failed to start server: {err}")))?;
    write_stderr_line(&format!("oee-config serving on {bind}"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(format!("server stopped: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Validates configuration and prints what it resolves to.
fn command_config_check(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    let source = config
        .source
        .as_ref()
        .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
    let base_dir = config.process_orders.base_dir.as_deref().unwrap_or("(working directory)");
    let audit = if config.audit.enabled {
        config.audit.path.as_deref().unwrap_or("stderr")
    } else {
        "disabled"
    };
    let lines = [
        "config ok".to_string(),
        format!("source: {source}"),
        format!("bind: {}", config.server.bind),
        format!("max_body_bytes: {}", config.server.max_body_bytes),
        format!("env_path: {}", config.storage.env_path),
        format!("oee_config_path: {}", config.storage.oee_config_path),
        format!("write_mode: {}", config.storage.write_mode.as_str()),
        format!("process_orders.base_dir: {base_dir}"),
        format!("audit: {audit}"),
    ];
    for line in lines {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Document Commands
// ============================================================================

/// Reads or replaces the environment document.
fn command_env(command: DocumentCommand) -> CliResult<ExitCode> {
    match command {
        DocumentCommand::Get(args) => {
            let store = load_config(&args)?.storage.env_store();
            let bytes = store.get().map_err(|err| CliError::new(err.to_string()))?;
            write_stdout_bytes(&bytes)
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        DocumentCommand::Set(command) => {
            let config = load_config(&command.config)?;
            let bytes = read_input(&command.input, config.server.max_body_bytes)?;
            config.storage.env_store().set(&bytes).map_err(|err| CliError::new(err.to_string()))?;
            write_stdout_line(oee_config_server::ENV_SAVED_MESSAGE)
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Reads or replaces the OEE configuration document.
async fn command_oee(command: DocumentCommand) -> CliResult<ExitCode> {
    match command {
        DocumentCommand::Get(args) => {
            let store = load_config(&args)?.storage.oee_config_store();
            let bytes = store.get().await.map_err(|err| CliError::new(err.to_string()))?;
            write_stdout_bytes(&bytes)
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        DocumentCommand::Set(command) => {
            let config = load_config(&command.config)?;
            let bytes = read_input(&command.input, config.server.max_body_bytes)?;
            let value: Value = serde_json::from_slice(&bytes).map_err(|err| {
                CliError::new(format!("{} is not valid JSON: {err}", command.input.display()))
            })?;
            config
                .storage
                .oee_config_store()
                .set(&value)
                .await
                .map_err(|err| CliError::new(err.to_string()))?;
            write_stdout_line(oee_config_server::OEE_CONFIG_SAVED_MESSAGE)
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Process Order Command
// ============================================================================

/// Loads a process order and prints it.
fn command_process_order_load(command: &ProcessOrderLoadCommand) -> CliResult<ExitCode> {
    let loader = load_config(&command.config)?.process_orders.loader();
    let value = loader.load(&command.path).map_err(|err| CliError::new(err.to_string()))?;
    let rendered = serde_json::to_string_pretty(&value)
        .map_err(|err| CliError::new(format!("failed to render process order: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a document input file, applying the service body limit.
fn read_input(path: &Path, max_bytes: usize) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "{} exceeds size limit: {size} bytes (max {limit})",
            path.display()
        )),
    })
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    // The file may grow between the metadata check and the read.
    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Reports an error on stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {message}"));
    ExitCode::FAILURE
}
