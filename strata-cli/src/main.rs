use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use strata_config::{apply_workdir, keys, ConfigLoader, ConfigTree, LoaderSettings, PropertyStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_simple_tracing(cli.log_level.as_ref())?;

    match cli.command {
        Commands::Resolve {
            sources,
            settings,
            env_prefix,
            mode,
            get,
            chdir,
            overrides,
        } => resolve(ResolveOptions {
            sources,
            settings,
            env_prefix,
            mode,
            get,
            chdir,
            overrides,
        }),
        Commands::Check { expr, args } => check(&expr, &args),
        Commands::Readers => list_registry(),
    }
}

struct ResolveOptions {
    sources: Vec<String>,
    settings: Option<PathBuf>,
    env_prefix: Option<String>,
    mode: Option<String>,
    get: Option<String>,
    chdir: bool,
    overrides: Vec<String>,
}

fn resolve(options: ResolveOptions) -> Result<()> {
    let mut settings = match &options.settings {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            LoaderSettings::from_yaml_str(&content)?
        }
        None => LoaderSettings::default(),
    };
    settings.apply_env_overrides()?;
    if let Some(prefix) = options.env_prefix {
        settings.env_prefix = prefix;
    }
    if let Some(mode) = options.mode {
        settings.runtime_mode = Some(mode);
    }

    let loader = ConfigLoader::from_settings(settings)?.with_args(options.overrides);
    debug!("Resolving with stages {:?}", loader.stage_names());

    let seed = ConfigTree::new().with(keys::CONFIG, options.sources);
    let tree = loader
        .load_tree(seed)
        .context("Failed to resolve configuration")?;

    if options.chdir {
        apply_workdir(&tree)?;
    }

    let help_key = &loader.settings().help_key;
    if let Some(output) = render_output(&tree, help_key, options.get.as_deref())? {
        println!("{}", output);
    }
    Ok(())
}

/// What `resolve` prints: one key, or the whole tree unless the help
/// stage already dumped it
fn render_output(tree: &ConfigTree, help_key: &str, get: Option<&str>) -> Result<Option<String>> {
    match get {
        Some(key) => match tree.get(key) {
            Some(value) => Ok(Some(format!("{:#}", value.to_json()))),
            None => anyhow::bail!("Key '{}' is not set", key),
        },
        None if tree.contains(help_key) => Ok(None),
        None => Ok(Some(tree.to_json_pretty())),
    }
}

fn check(expr: &str, args: &[String]) -> Result<()> {
    let check = strata_registry::global()
        .compile_check(expr)
        .with_context(|| format!("Cannot compile check '{}'", expr))?;
    for arg in args {
        println!("{}: {}", arg, check(arg));
    }
    Ok(())
}

fn list_registry() -> Result<()> {
    let registry = strata_registry::global();
    println!("readers:   {}", registry.reader_schemes().join(", "));
    println!("checks:    {}", registry.check_names().join(", "));
    println!("factories: {}", registry.check_factory_names().join(", "));
    Ok(())
}

/// Initialize simple tracing with environment variable override support.
///
/// Logs go to stderr so stdout carries only resolved configuration.
fn init_simple_tracing(log_level: Option<&String>) -> Result<()> {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'info'", level);
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        debug!("Global tracing subscriber already initialized, skipping");
    }
    Ok(())
}
