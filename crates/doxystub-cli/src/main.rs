use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use doxystub_driver::{find_unit, log_report, Driver, StubConfig};
use log::{debug, info, LevelFilter};
use miette::Result;

#[derive(Parser, Debug)]
#[command(name = "doxystub")]
#[command(author, version, about = "Generate Python type stubs from Doxygen declaration exports")]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate declarations and write stub files
    Generate {
        /// Export files or directories of export files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory (overrides the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not run the configured formatter
        #[arg(long)]
        no_format: bool,
    },

    /// Translate declarations without writing, and print the diagnostics
    Check {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the stub of one top-level declaration
    Dump {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Dotted qualified name, e.g. `ogdf.Graph`
        #[arg(long)]
        name: String,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<StubConfig> {
    Ok(match path {
        Some(path) => StubConfig::from_file(path)?,
        None => StubConfig::default(),
    })
}

fn init_logging(level: &str) {
    let level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", level);
        LevelFilter::Warn
    });
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }
    builder.init();
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(&cli.log_level);
    debug!(command:? = cli.command; "Parsed arguments");

    match cli.command {
        Commands::Generate {
            inputs,
            config,
            output,
            no_format,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(dir) = output {
                config = config.with_output_dir(dir);
            }
            if no_format {
                config = config.without_formatter();
            }
            let driver = Driver::new(config);
            let output = driver.generate(&inputs)?;
            println!(
                "Wrote {} stubs to {}",
                output.units.len(),
                driver.config().output.dir.display()
            );
        }

        Commands::Check { inputs, config } => {
            let driver = Driver::new(load_config(config.as_deref())?);
            let compounds = driver.select(driver.load(&inputs)?);
            let output = driver.run(&compounds)?;
            log_report(&output.report);

            for diagnostic in output.report.diagnostics() {
                println!("{:?}: {}", diagnostic.kind, diagnostic);
            }
            println!(
                "{} units, {} symbols, {} unresolved types",
                output.units.len(),
                output.symbols.len(),
                output.report.unresolved_types.len()
            );
        }

        Commands::Dump {
            inputs,
            name,
            config,
        } => {
            let driver = Driver::new(load_config(config.as_deref())?);
            let compounds = driver.select(driver.load(&inputs)?);
            let output = driver.run(&compounds)?;
            println!("{}", find_unit(&output, &name)?.text);
        }
    }

    info!("Completed successfully");
    Ok(())
}
