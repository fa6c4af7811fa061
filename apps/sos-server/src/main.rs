use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use emergency::config::EmergencyConfig;
use emergency::EmergencyModule;
use mimalloc::MiMalloc;
use operators::config::OperatorsConfig;
use operators::model::SeedOutcome;
use operators::OperatorsModule;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const IN_MEMORY_DSN: &str = "sqlite::memory:";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
/// - Defaults to `mode=rwc` so a missing database file is created.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(IN_MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(IN_MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    match query {
        Some(q) if q.contains("mode=") => {
            out.push('?');
            out.push_str(q);
        }
        Some(q) => {
            out.push('?');
            out.push_str(q);
            out.push_str("&mode=rwc");
        }
        None => out.push_str("?mode=rwc"),
    }
    Ok(out)
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(raw: &str) -> Result<&'static str> {
    if raw.eq_ignore_ascii_case(IN_MEMORY_DSN) {
        return Ok("sqlite");
    }
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// SOS Server - emergency request intake and operator dashboard backend
#[derive(Parser)]
#[command(name = "sos-server")]
#[command(about = "SOS Server - emergency request intake and operator dashboard backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Create the bootstrap super admin if no admin exists yet
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(environment = %config.server.environment, "SOS Server starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    modkit::api::set_expose_internal_details(!config.server.environment.is_production());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(&config, &args),
        Commands::Seed => seed_admin(config, args).await,
    }
}

fn database_config(config: &AppConfig) -> DatabaseConfig {
    config.database.clone().unwrap_or_else(|| {
        tracing::warn!("No database section configured, using the default SQLite file");
        DatabaseConfig {
            url: "sqlite://database/sos.db".to_string(),
            max_conns: None,
            busy_timeout_ms: None,
        }
    })
}

/// Resolve the DSN the server will actually connect to.
fn effective_dsn(config: &AppConfig, args: &CliArgs) -> Result<(String, DatabaseConfig)> {
    let db_config = database_config(config);
    if args.mock {
        return Ok((IN_MEMORY_DSN.to_string(), db_config));
    }

    let dsn = db_config.url.trim().to_owned();
    if dsn.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    detect_from_dsn(&dsn)?;

    let dsn = if dsn.starts_with("sqlite") {
        absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir), true)?
    } else {
        dsn
    };
    Ok((dsn, db_config))
}

async fn connect_db(config: &AppConfig, args: &CliArgs) -> Result<DatabaseConnection> {
    let (dsn, db_config) = effective_dsn(config, args)?;
    let backend = detect_from_dsn(&dsn)?;

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if dsn == IN_MEMORY_DSN {
        // Every pooled connection would otherwise see its own empty database.
        opts.max_connections(1);
    } else {
        opts.max_connections(db_config.max_conns.unwrap_or(10));
    }
    if backend == "sqlite" {
        let busy = Duration::from_millis(u64::from(db_config.busy_timeout_ms.unwrap_or(5000)));
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy));
    }

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {backend} database"))?;
    tracing::info!("Connected DB backend: {}", backend);
    Ok(db)
}

fn ingress_config(config: &AppConfig, args: &CliArgs) -> Result<ApiIngressConfig> {
    let mut cfg: ApiIngressConfig = config.module_config(ApiIngress::NAME)?;
    if cfg.bind_addr.is_empty() || args.port.is_some() {
        cfg.bind_addr = format!("{}:{}", config.server.host, config.server.port);
    }
    if config.server.timeout_sec > 0 {
        cfg.request_timeout_secs = config.server.timeout_sec;
    }
    Ok(cfg)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    let ingress_cfg = ingress_config(&config, &args)?;
    let operators_cfg: OperatorsConfig = config.module_config(OperatorsModule::NAME)?;
    let emergency_cfg: EmergencyConfig = config.module_config(EmergencyModule::NAME)?;

    let db = connect_db(&config, &args).await?;

    let operators = OperatorsModule::init(db.clone(), operators_cfg).await?;
    operators.seed_if_configured().await?;
    let emergency = EmergencyModule::init(db, emergency_cfg, operators.service()).await?;

    let bind_addr = ingress_cfg.bind_addr.clone();
    let mut ingress = ApiIngress::new(ingress_cfg);
    ingress.register(Arc::new(operators));
    ingress.register(Arc::new(emergency));

    ingress
        .serve(&bind_addr, async {
            if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
                tracing::error!(error = %e, "failed to listen for shutdown signals");
            }
        })
        .await
}

fn check_config(config: &AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let ingress = ingress_config(config, args)?;
    ingress
        .bind_addr
        .parse::<std::net::SocketAddr>()
        .map_err(|e| anyhow!("Invalid bind address '{}': {}", ingress.bind_addr, e))?;
    let operators: OperatorsConfig = config.module_config(OperatorsModule::NAME)?;
    let _: EmergencyConfig = config.module_config(EmergencyModule::NAME)?;
    let (dsn, _) = effective_dsn(config, args)?;

    if operators.jwt_secret.is_empty() {
        tracing::warn!("operators.jwt_secret is empty; tokens will not survive a restart");
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Database: {dsn}");
    println!("Listening address: {}", ingress.bind_addr);
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn seed_admin(config: AppConfig, args: CliArgs) -> Result<()> {
    let operators_cfg: OperatorsConfig = config.module_config(OperatorsModule::NAME)?;
    let bootstrap = operators_cfg.bootstrap_admin.clone().unwrap_or_default();

    let db = connect_db(&config, &args).await?;
    let operators = OperatorsModule::init(db, operators_cfg).await?;
    match operators.seed(&bootstrap).await? {
        SeedOutcome::Created(admin) => println!("Created super admin {}", admin.email),
        SeedOutcome::Skipped { existing } => {
            println!("Skipped seeding: {existing} admin account(s) already exist")
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let base = std::env::temp_dir().join("sos-dsn-test");
        let dsn = absolutize_sqlite_dsn("sqlite://database/sos.db", &base, false).unwrap();
        assert!(dsn.starts_with("sqlite://"));
        assert!(dsn.ends_with("database/sos.db?mode=rwc"));
        assert!(dsn.contains(&base.to_string_lossy().replace('\\', "/")));
    }

    #[test]
    fn explicit_mode_is_kept() {
        let dsn =
            absolutize_sqlite_dsn("sqlite:///tmp/x.db?mode=ro", Path::new("/srv"), false).unwrap();
        assert_eq!(dsn, "sqlite:///tmp/x.db?mode=ro");
        let dsn = absolutize_sqlite_dsn("sqlite:///tmp/x.db?cache=shared", Path::new("/srv"), false)
            .unwrap();
        assert_eq!(dsn, "sqlite:///tmp/x.db?cache=shared&mode=rwc");
    }

    #[test]
    fn memory_dsn_is_untouched() {
        assert_eq!(
            absolutize_sqlite_dsn("sqlite://:memory:", Path::new("/srv"), false).unwrap(),
            IN_MEMORY_DSN
        );
        assert!(absolutize_sqlite_dsn("postgres://x", Path::new("/srv"), false).is_err());
    }

    #[test]
    fn backend_detection() {
        assert_eq!(detect_from_dsn("sqlite:///tmp/a.db").unwrap(), "sqlite");
        assert_eq!(detect_from_dsn("postgres://u:p@h/db").unwrap(), "postgres");
        assert_eq!(detect_from_dsn(IN_MEMORY_DSN).unwrap(), "sqlite");
        assert!(detect_from_dsn("mysql://h/db").is_err());
        assert!(detect_from_dsn("not a url").is_err());
    }

    #[test]
    fn cli_port_overrides_bind_addr() {
        let mut config = AppConfig::default();
        config.modules.insert(
            ApiIngress::NAME.to_string(),
            serde_json::json!({ "bind_addr": "0.0.0.0:8080" }),
        );
        let mut args = CliArgs {
            config: None,
            port: None,
            print_config: false,
            verbose: 0,
            mock: false,
        };
        assert_eq!(ingress_config(&config, &args).unwrap().bind_addr, "0.0.0.0:8080");

        args.port = Some(9000);
        config.apply_cli(&args);
        assert_eq!(ingress_config(&config, &args).unwrap().bind_addr, "127.0.0.1:9000");
    }
}
