// # cloudflare-ddns
//
// Thin entry point. All update logic lives in ddns-core; this binary:
// 1. Initializes logging (stderr, TRACE when DEBUG=true)
// 2. Reads configuration from environment variables
// 3. Builds the family-pinned IP sources and the Cloudflare factory
// 4. Runs the engine on a current-thread runtime
// 5. Maps the outcome to an explicit exit code
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_KEY=your_global_key
// export CLOUDFLARE_EMAIL=you@example.com
// export DNS_ZONE=example.com
// export SUBDOMAIN=home
//
// cloudflare-ddns
// ```

use anyhow::{Context, Result};
use ddns_core::traits::IpVersion;
use ddns_core::config::DEFAULT_QUERY_URL;
use ddns_core::{DdnsConfig, DdnsEngine, Error};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::CloudflareFactory;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const USAGE: &str = "\
usage: cloudflare-ddns
The following ENV variables must be specified:
Name                Description
CLOUDFLARE_EMAIL    Cloudflare login email
CLOUDFLARE_API_KEY  Cloudflare API KEY
DNS_ZONE            DNS Zone to update
SUBDOMAIN           Subdomain to update
The following ENV variables are optional
Name                Default Value           Description
DONT_UPDATE_A       false                   Set to true if the application should not update A value
DONT_UPDATE_AAAA    false                   Set to true if the application should not update AAAA value
IPV4_QUERY_URL      https://icanhazip.com/  Url to query for ipv4
IPV6_QUERY_URL      https://icanhazip.com/  Url to query for ipv6
HTTP_TIMEOUT        5                       HTTP Timeout value in seconds
UPDATE_INTERVAL     5                       Update interval value in minutes
UPDATE_ONCE         false                   Set to true if the program should only update once
DEBUG               false                   Set to true for trace logging";

/// Exit codes for different termination scenarios
///
/// - 0: Run-once pass completed
/// - 1: Configuration or startup error
/// - 2: Fatal loop error or runtime failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Single pass completed (UPDATE_ONCE)
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Provider client or zone lookup failed, or the runtime could not start
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl DdnsExitCode {
    fn for_run(result: &ddns_core::Result<()>) -> Self {
        match result {
            Ok(()) => DdnsExitCode::Completed,
            Err(_) => DdnsExitCode::RuntimeError,
        }
    }
}

fn main() -> ExitCode {
    // DEBUG is read up front so configuration errors are logged at the right level
    let debug = env::var("DEBUG").is_ok_and(|value| value == "true");

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(debug))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = match DdnsConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report_startup_error(&e);
            return DdnsExitCode::ConfigError.into();
        }
    };
    config.log_overrides();

    let mut engine = match build_engine(config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Strictly sequential: one thread, no spawned tasks
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(engine.run());
    let code = DdnsExitCode::for_run(&result);
    if code == DdnsExitCode::Completed {
        info!("Update pass completed, exiting");
    }
    code.into()
}

fn log_level(debug: bool) -> Level {
    if debug { Level::TRACE } else { Level::INFO }
}

/// Whether a startup error should print the usage text
fn wants_usage(err: &Error) -> bool {
    matches!(err, Error::MissingEnv("CLOUDFLARE_API_KEY"))
}

fn report_startup_error(err: &Error) {
    if wants_usage(err) {
        error!("CLOUDFLARE_API_KEY ENV Variable must be declared");
        println!("{}", USAGE);
    } else {
        error!("{}", err);
    }
}

/// URL a family's source is built with
///
/// A disabled family is never queried, so its override is not validated.
fn source_url(config: &DdnsConfig, version: IpVersion) -> &str {
    let enabled = match version {
        IpVersion::V4 => config.update_a,
        IpVersion::V6 => config.update_aaaa,
    };
    if enabled {
        config.query_url(version)
    } else {
        DEFAULT_QUERY_URL
    }
}

/// Wire the IP sources and provider factory into an engine
fn build_engine(config: DdnsConfig) -> Result<DdnsEngine> {
    let ipv4 = HttpIpSource::new(
        source_url(&config, IpVersion::V4),
        IpVersion::V4,
        config.http_timeout,
    )
    .context("Invalid IPV4_QUERY_URL")?;
    let ipv6 = HttpIpSource::new(
        source_url(&config, IpVersion::V6),
        IpVersion::V6,
        config.http_timeout,
    )
    .context("Invalid IPV6_QUERY_URL")?;

    let engine = DdnsEngine::new(
        config,
        Box::new(CloudflareFactory::new()),
        Box::new(ipv4),
        Box::new(ipv6),
    )?;
    Ok(engine)
}
