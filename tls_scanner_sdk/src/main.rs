//! # TLS Scanner CLI
//!

use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tls_scanner_base::api::{ScannerConfig, TlsScanner};
use tls_scanner_base::logging::codes;
use tls_scanner_base::types::ScanTarget;
use tls_scanner_base::{log_error, log_info};
use tls_scanner_sdk::engine::{ProfileEngine, ServerProfile};
use tls_scanner_sdk::guidelines::default_guideline;

/// Exit status when at least one guideline check failed
const GUIDELINE_FAILURE_EXIT: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "tls-scanner", version, about = "Scan a TLS server and check it against guidelines")]
struct Cli {
    /// Simulated server: `modern`, `legacy` or a JSON profile path
    #[arg(long, default_value = "modern")]
    profile: String,

    /// TOML scanner configuration
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "localhost")]
    host: String,

    #[arg(long, default_value_t = 443)]
    port: u16,

    /// Worker threads [default: config file, env, then number of CPUs]
    #[arg(long)]
    threads: Option<usize>,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the JSON result document instead of the summary
    #[arg(long)]
    json: bool,

    #[arg(long)]
    no_guidelines: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let profile = load_profile(&cli.profile)?;
    let config = build_config(&cli, &profile)?;
    log_info!(
        "TLS scanner starting",
        "profile" => profile.name,
        "threads" => config.worker_threads,
        "dtls" => config.dtls
    );

    let registry = tls_scanner_sdk::create_probe_registry(&config)?;
    let mut scanner = TlsScanner::new(registry, config)?;
    if !cli.no_guidelines {
        scanner = scanner.with_guideline(default_guideline());
    }

    let engine = ProfileEngine::new(profile);
    let start = Instant::now();
    let result = scanner.scan(&engine).map_err(|e| {
        log_error!(codes::scheduler::SCAN_FAILED, "Scan failed", "error" => e);
        e
    })?;

    if cli.json {
        println!("{}", result.to_json()?);
    } else {
        println!("{}", result.summary());
        for guideline in &result.guidelines {
            println!("\n{}", guideline.summary());
            for failed in guideline.failed() {
                println!("  [FAIL] {} ({})", failed.name, failed.level);
            }
        }
        println!("\nDuration: {:.2}s", start.elapsed().as_secs_f64());
    }

    if result.has_guideline_failures() {
        std::process::exit(GUIDELINE_FAILURE_EXIT);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    // RUST_LOG still wins over the -v default
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_profile(arg: &str) -> Result<ServerProfile, Box<dyn std::error::Error>> {
    let profile = match arg {
        "modern" => ServerProfile::modern(),
        "legacy" => ServerProfile::legacy(),
        path => ServerProfile::from_file(path)?,
    };
    Ok(profile)
}

/// File config first, then environment, then explicit flags
fn build_config(
    cli: &Cli,
    profile: &ServerProfile,
) -> Result<ScannerConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ScannerConfig::from_file(path)?,
        None => ScannerConfig::default(),
    };
    config.apply_env_overrides();

    config = config.with_target(ScanTarget::new(cli.host.clone(), cli.port));
    if let Some(threads) = cli.threads {
        config = config.with_worker_threads(threads);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_probe_timeout_ms(timeout_ms);
    }
    if profile.versions.iter().any(|version| version.is_dtls()) {
        config = config.with_dtls(true);
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_file_threads_kept_without_flag() {
        let file = config_file("worker_threads = 3\n");
        let cli = Cli::parse_from([
            "tls-scanner",
            "--config",
            file.path().to_str().unwrap(),
        ]);

        let config = build_config(&cli, &ServerProfile::modern()).unwrap();
        assert_eq!(config.worker_threads, 3);
    }

    #[test]
    fn test_threads_flag_overrides_config_file() {
        let file = config_file("worker_threads = 3\n");
        let cli = Cli::parse_from([
            "tls-scanner",
            "--config",
            file.path().to_str().unwrap(),
            "--threads",
            "5",
            "--timeout-ms",
            "250",
        ]);

        let config = build_config(&cli, &ServerProfile::modern()).unwrap();
        assert_eq!(config.worker_threads, 5);
        assert_eq!(config.probe_timeout_ms, 250);
    }

    #[test]
    fn test_dtls_profile_switches_mode() {
        let cli = Cli::parse_from(["tls-scanner"]);
        let profile = ServerProfile {
            versions: vec![tls_scanner_base::types::ProtocolVersion::Dtls12],
            ..ServerProfile::default()
        };
        assert!(build_config(&cli, &profile).unwrap().dtls);
    }
}
