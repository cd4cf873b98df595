use std::process::ExitCode;
use std::time::Duration;

use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use clap::Parser;
use shared::adapters::{Ec2RegionBinder, Ec2RegionSource};
use shared::core::{DefaultVpcSweeper, RegionSource, SweepReport};
use shared::error::SweepError;

mod config;
mod tls;

use config::AppConfig;

/// Bounded per-call budget so a single unreachable region cannot hang the
/// whole run.
const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Parser)]
#[command(
    name = "vpc-sweep",
    version,
    about = "Deletes the default VPC (gateways and subnets included) in every reachable region"
)]
pub struct Cli {
    /// Disable SSL certificate verification for AWS API calls.
    #[arg(long)]
    pub no_verify_ssl: bool,

    /// Credential profile to use; omit to use the ambient default
    /// credentials (see 'aws configure').
    #[arg(long)]
    pub profile: Option<String>,

    /// Print the final report as JSON instead of the summary line.
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app_config = match AppConfig::load(&cli) {
        Ok(app_config) => app_config,
        Err(error) => {
            eprintln!("Invalid configuration: {error}");
            return ExitCode::from(1);
        }
    };

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(
        TimeoutConfig::builder()
            .operation_timeout(OPERATION_TIMEOUT)
            .build(),
    );
    if let Some(profile) = &app_config.profile {
        loader = loader.profile_name(profile);
    }
    if app_config.no_verify_ssl {
        tracing::warn!("SSL certificate verification is disabled");
        loader = loader.http_client(tls::insecure_http_client());
    }
    let sdk_config = loader.load().await;

    let region_source = match Ec2RegionSource::from_config(&sdk_config) {
        Ok(region_source) => region_source,
        Err(error) => return ExitCode::from(bail(&error)),
    };

    println!("Scanning for default VPCs...\n");

    let regions = match region_source.list_regions().await {
        Ok(regions) => regions,
        Err(error) => return ExitCode::from(bail(&error)),
    };

    let sweeper = DefaultVpcSweeper::new(Ec2RegionBinder::new(sdk_config));
    let report = sweeper.sweep(&regions).await;

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{rendered}"),
            Err(error) => {
                eprintln!("Failed to render report: {error}");
                return ExitCode::from(1);
            }
        }
    } else {
        println!("{} default VPCs deleted.", report.deleted);
    }

    for failure in &report.failures {
        eprintln!("[{}] sweep failed: {}", failure.region, failure.error);
    }

    ExitCode::from(report_exit_code(&report))
}

/// Fatal bootstrap failures get a remediation hint and exit code 1;
/// anything else reaching here would be a bug in the containment policy
/// and is printed as-is.
fn bail(error: &SweepError) -> u8 {
    eprintln!("{}", remediation(error));
    tracing::error!(error = %error, "aborting run");
    1
}

fn remediation(error: &SweepError) -> String {
    match error {
        SweepError::Configuration => "Error initiating AWS client!\n\
             Have you configured your AWS region? (e.g. in ~/.aws/config) See 'aws configure'\n\
             If you are using a specific profile, use --profile"
            .to_string(),
        SweepError::Authorization { .. } => "Error executing AWS commands!\n\
             Have you configured your AWS credentials? (e.g. in ~/.aws/credentials) See 'aws configure'\n\
             Or perhaps the access token has expired?"
            .to_string(),
        other => other.to_string(),
    }
}

fn report_exit_code(report: &SweepReport) -> u8 {
    if report.failures.is_empty() {
        0
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use shared::core::RegionFailure;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from(["vpc-sweep", "--no-verify-ssl", "--profile", "sandbox"]);
        assert!(cli.no_verify_ssl);
        assert_eq!(cli.profile.as_deref(), Some("sandbox"));
        assert!(!cli.json);
    }

    #[test]
    fn configuration_error_exits_one_with_region_hint() {
        let error = SweepError::Configuration;

        assert_eq!(bail(&error), 1);
        let hint = remediation(&error);
        assert!(hint.contains("aws configure"));
        assert!(hint.contains("--profile"));
    }

    #[test]
    fn authorization_error_exits_one_with_credentials_hint() {
        let error = SweepError::Authorization {
            message: "ExpiredToken".to_string(),
        };

        assert_eq!(bail(&error), 1);
        let hint = remediation(&error);
        assert!(hint.contains("credentials"));
        assert!(hint.contains("access token has expired"));
    }

    #[test]
    fn clean_report_exits_zero() {
        let report = SweepReport::default();

        assert_eq!(report_exit_code(&report), 0);
    }

    #[test]
    fn failed_regions_exit_two() {
        let report = SweepReport {
            deleted: 3,
            failures: vec![RegionFailure {
                region: "eu-west-1".to_string(),
                error: "failed to delete subnet-stuck".to_string(),
            }],
        };

        assert_eq!(report_exit_code(&report), 2);
    }
}
