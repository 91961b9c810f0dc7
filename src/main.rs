use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use flowdev::adapter::{configure, AdapterRegistry};
use flowdev::config::{self, Config};
use flowdev::project::ProjectDescriptor;
use flowdev::Services;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowdev", version, about = "Local development helper for Neos Flow projects")]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether the project uses a supported framework
    Detect,
    /// Normalize the project config and write the database settings file
    Configure {
        /// Write the normalized project config back to disk
        #[arg(long)]
        save: bool,
    },
    /// Replace an upload directory with the contents of a directory or archive
    ImportFiles {
        #[arg(long)]
        source: PathBuf,
        /// Directory inside the archive to import
        #[arg(long, default_value = "")]
        extract_path: String,
        /// Upload directory relative to the docroot (defaults to the first configured one)
        #[arg(long)]
        upload_dir: Option<String>,
    },
    /// Manage the flowdev tool configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration file
    Init,
    /// Print the configuration file location
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config::get_config_path()?;
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    init_tracing(&config, cli.verbose);

    let project_root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let project_root = std::fs::canonicalize(&project_root)
        .with_context(|| format!("Project directory {:?} does not exist", project_root))?;

    let registry = AdapterRegistry::builtin();

    match cli.command {
        Command::Detect => {
            let project = load_project(&project_root)?;
            match registry.detect(&project) {
                Some(adapter) => println!(
                    "{} {}",
                    "Detected:".green().bold(),
                    adapter.spec().display_name
                ),
                None => println!(
                    "{} (supported: {})",
                    "No supported framework detected".yellow(),
                    registry.names().join(", ")
                ),
            }
        }
        Command::Configure { save } => {
            let mut project = load_project(&project_root)?;
            let adapter = registry.for_project(&project)?;
            let services = Services::console();

            let path = configure(
                adapter,
                &mut project,
                &services,
                config.provisioning.docroot_policy,
            )
            .context("Failed to configure project")?;

            println!("{} {}", "Settings file:".green().bold(), path.display());
            if save {
                project.save().context("Failed to save project config")?;
            }
        }
        Command::ImportFiles {
            source,
            extract_path,
            upload_dir,
        } => {
            let mut project = load_project(&project_root)?;
            let adapter = registry.for_project(&project)?;
            adapter.normalize_docroot(&mut project, config.provisioning.docroot_policy)?;

            let upload_dir = match upload_dir {
                Some(dir) => dir,
                None => project
                    .default_upload_dir()
                    .map(str::to_string)
                    .context("No upload directory configured for this project")?,
            };

            adapter
                .import_files(&project, &upload_dir, &source, &extract_path)
                .with_context(|| format!("Failed to import files from {:?}", source))?;

            println!(
                "{} {}",
                "Imported files to".green().bold(),
                project.host_upload_dir_full_path(&upload_dir).display()
            );
        }
        Command::Config { action } => match action {
            ConfigAction::Init => {
                if config_path.exists() {
                    println!("Config already exists at {:?}", config_path);
                } else {
                    Config::create_default(&config_path)?;
                    println!("Created default config file at {:?}", config_path);
                }
            }
            ConfigAction::Path => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

fn load_project(root: &std::path::Path) -> Result<ProjectDescriptor> {
    if ProjectDescriptor::config_path(root).exists() {
        Ok(ProjectDescriptor::load(root)?)
    } else {
        Ok(ProjectDescriptor::new(root, ""))
    }
}

fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
