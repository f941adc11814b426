mod cli;

use docforge::{config, server, storage};
use docforge_convert::{Converter, ToolRegistry};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting docforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!(
        "Uploads in {:?}, converted files in {:?}",
        config.storage.upload_dir,
        config.storage.processed_dir
    );

    let tools = ToolRegistry::discover(&config.tools);
    for info in tools.check_all().iter().filter(|t| !t.available) {
        tracing::warn!(
            "{} not found; conversions that need it will fall back or fail",
            info.name
        );
    }

    server::start_server(config, tools).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "docforge=trace,docforge_convert=trace,docforge_common=debug,tower_http=debug"
                .to_string()
        } else {
            "docforge=debug,docforge_convert=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Convert {
            input,
            to,
            compress,
            out_dir,
        } => convert_file(&input, &to, compress, out_dir.as_deref(), cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Sweep => sweep(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("docforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn convert_file(
    input: &Path,
    target: &str,
    compress: bool,
    out_dir: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.is_file() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let out_dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| ".".into()),
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let tools = ToolRegistry::discover(&config.tools);
    let converter = Converter::new(Arc::new(tools), config.compression.clone());

    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(async {
        let converted = converter.convert(input, target, &out_dir).await?;
        if compress {
            converter.compress(&converted, &out_dir).await
        } else {
            Ok(converted)
        }
    })?;

    println!("{}", output.display());
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn sweep(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let reaper = storage::Reaper::new(&config.storage, storage::Leases::new());
    let report = reaper.sweep_all();

    println!(
        "Uploads:   removed {}, errors {}",
        report.uploads.removed, report.uploads.errors
    );
    println!(
        "Processed: removed {}, errors {}",
        report.processed.removed, report.processed.errors
    );

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Max upload: {} MB", config.server.max_upload_mb);
            println!("  Uploads: {:?}", config.storage.upload_dir);
            println!("  Processed: {:?}", config.storage.processed_dir);
            println!(
                "  Retention: uploads {} min, processed {} min",
                config.storage.upload_max_age_mins, config.storage.processed_max_age_mins
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
