use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use futures::future::join_all;
use semver::VersionReq;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use oci_tag_resolver::config::{ResolverConfig, default_config_path, load_config};
use oci_tag_resolver::{SemverResolver, VersionConstraint};

#[derive(Parser)]
#[command(name = "oci-tag-resolver")]
#[command(version, about = "Resolve the latest stable semver tag of an OCI image")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON config file (defaults to $XDG_CONFIG_HOME/oci-tag-resolver/config.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache TTL in seconds
    #[arg(long, global = true)]
    cache_ttl: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Talk plain HTTP to the registry
    #[arg(long, global = true)]
    plain_http: bool,

    /// Write JSON logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the latest stable tag of one or more repositories
    Resolve {
        /// Repositories as host/name, e.g. ghcr.io/openclaw/openclaw
        #[arg(required = true)]
        repositories: Vec<String>,

        /// Semver requirement candidates must satisfy, e.g. ">=1.0.0, <2.0.0"
        #[arg(long)]
        constraint: Option<String>,
    },
    /// Poll a repository and report whenever its latest stable tag changes
    Watch {
        repository: String,

        #[arg(long)]
        constraint: Option<String>,

        /// Seconds between polls
        #[arg(long, default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.global.log_file.as_deref())?;

    let config = resolve_config(&cli.global)?;
    debug!("Using config {:?}", config);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

async fn run(command: Command, config: ResolverConfig) -> anyhow::Result<()> {
    let resolver =
        SemverResolver::from_config(&config).context("Failed to initialize resolver")?;

    match command {
        Command::Resolve {
            repositories,
            constraint,
        } => {
            let constraint = parse_constraint(constraint.as_deref())?;
            resolve(&resolver, &repositories, constraint.as_ref()).await
        }
        Command::Watch {
            repository,
            constraint,
            interval,
        } => {
            let constraint = parse_constraint(constraint.as_deref())?;
            watch(
                &resolver,
                &repository,
                constraint.as_ref(),
                Duration::from_secs(interval),
                ctrl_c(),
            )
            .await
        }
    }
}

async fn resolve(
    resolver: &SemverResolver,
    repositories: &[String],
    constraint: Option<&VersionReq>,
) -> anyhow::Result<()> {
    let constraint = constraint.map(|c| c as &dyn VersionConstraint);
    let results = join_all(repositories.iter().map(|repository| async move {
        (repository, resolver.latest_semver(repository, constraint).await)
    }))
    .await;

    let mut failures = 0;
    for (repository, result) in results {
        match result {
            Ok(version) if repositories.len() == 1 => println!("{}", version),
            Ok(version) => println!("{} {}", repository, version),
            Err(e) => {
                error!("Failed to resolve {}: {}", repository, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} repositories failed to resolve", failures, repositories.len());
    }
    Ok(())
}

async fn watch(
    resolver: &SemverResolver,
    repository: &str,
    constraint: Option<&VersionReq>,
    interval: Duration,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let constraint = constraint.map(|c| c as &dyn VersionConstraint);

    info!("Watching {} every {:?}", repository, interval);
    // Dropping the poll loop cancels any request still in flight
    tokio::select! {
        _ = poll(resolver, repository, constraint, interval) => {}
        _ = shutdown => info!("Stopping watch of {}", repository),
    }
    Ok(())
}

async fn poll(
    resolver: &SemverResolver,
    repository: &str,
    constraint: Option<&dyn VersionConstraint>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut current: Option<String> = None;

    loop {
        ticker.tick().await;
        match resolver.latest_semver(repository, constraint).await {
            Ok(version) if current.as_deref() == Some(version.as_str()) => {
                debug!("{} is still at {}", repository, version);
            }
            Ok(version) => {
                info!("{} latest stable version is now {}", repository, version);
                println!("{}", version);
                current = Some(version);
            }
            // The next tick is the retry
            Err(e) => error!("Failed to resolve {}: {}", repository, e),
        }
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
    }
}

fn parse_constraint(constraint: Option<&str>) -> anyhow::Result<Option<VersionReq>> {
    constraint
        .map(|c| VersionReq::parse(c).with_context(|| format!("Invalid constraint: {}", c)))
        .transpose()
}

fn resolve_config(args: &GlobalArgs) -> anyhow::Result<ResolverConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let path = default_config_path();
            if path.exists() {
                load_config(&path)?
            } else {
                ResolverConfig::default()
            }
        }
    };

    if let Some(ttl) = args.cache_ttl {
        config.cache_ttl = ttl;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout = timeout;
    }
    if args.plain_http {
        config.plain_http = true;
    }

    Ok(config)
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use tokio::net::TcpListener;

    #[test]
    fn parse_constraint_accepts_comma_separated_requirements() {
        let constraint = parse_constraint(Some(">=1.0.0,<2.0.0")).unwrap().unwrap();
        assert!(constraint.matches(&semver::Version::new(1, 5, 0)));
        assert!(!constraint.matches(&semver::Version::new(2, 0, 0)));
    }

    #[test]
    fn parse_constraint_rejects_garbage() {
        assert!(parse_constraint(Some("not a range")).is_err());
    }

    #[test]
    fn cli_parses_watch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "oci-tag-resolver",
            "watch",
            "ghcr.io/openclaw/openclaw",
            "--interval",
            "60",
            "--cache-ttl",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.global.cache_ttl, Some(30));
        assert!(matches!(
            cli.command,
            Command::Watch { interval: 60, .. }
        ));
    }

    #[tokio::test]
    async fn watch_stops_on_shutdown_while_fetch_is_in_flight() {
        // Accepts connections but never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = ResolverConfig {
            request_timeout: 30,
            plain_http: true,
            ..ResolverConfig::default()
        };
        let resolver = SemverResolver::from_config(&config).unwrap();
        let started = Instant::now();

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            watch(
                &resolver,
                &format!("{}/team/app", addr),
                None,
                Duration::from_secs(3600),
                tokio::time::sleep(Duration::from_millis(200)),
            ),
        )
        .await
        .expect("watch ignored shutdown during a hanging fetch");

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
