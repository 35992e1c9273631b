use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the `stratus` binary.
///
/// These settings control which directory the collector talks to, how it
/// authenticates, and where the envelope stream goes. All values are parsed
/// from CLI arguments or environment variables, with defaults suitable for
/// the Azure public cloud.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stratus",
    version,
    about = "Streams Azure management group inventory out of the ARM REST API"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the Azure Resource Manager endpoint.
    ///
    /// Point this at a sovereign-cloud endpoint (e.g.
    /// `https://management.usgovcloudapi.net`) when collecting outside the
    /// public cloud.
    ///
    /// Environment variable: `STRATUS_BASE_URL`
    #[arg(
        long,
        env = "STRATUS_BASE_URL",
        default_value = "https://management.azure.com",
        global = true
    )]
    pub base_url: String,

    /// Bearer token presented on every ARM request.
    ///
    /// Token acquisition is out of scope for the collector; hand it a token
    /// for the ARM audience, e.g. from `az account get-access-token`.
    ///
    /// Environment variable: `STRATUS_ACCESS_TOKEN`
    #[arg(
        long,
        env = "STRATUS_ACCESS_TOKEN",
        hide_env_values = true,
        default_value = "",
        global = true
    )]
    pub access_token: String,

    /// File to write envelopes to instead of stdout.
    ///
    /// The file is created (or truncated) before collection starts.
    ///
    /// Environment variable: `STRATUS_OUTPUT`
    #[arg(long, env = "STRATUS_OUTPUT", global = true)]
    pub output: Option<PathBuf>,

    /// Per-request timeout in seconds.
    ///
    /// Applies to each page fetch individually, not to the whole run.
    ///
    /// Environment variable: `STRATUS_TIMEOUT_SECS`
    #[arg(long, env = "STRATUS_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub timeout_secs: u64,

    /// Emit logs as single-line JSON objects instead of human-readable text.
    ///
    /// Environment variable: `STRATUS_JSON_LOGS`
    #[arg(long, env = "STRATUS_JSON_LOGS", default_value_t = false, global = true)]
    pub json_logs: bool,
}

/// Top-level command tree.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Lists Azure resources.
    #[command(subcommand)]
    List(ListCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListCommand {
    /// Lists the management groups visible to the token.
    ManagementGroups,
    /// Lists role assignments for every management group.
    ManagementGroupRoleAssignments,
}

/// Validated runtime configuration derived from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,
    pub base_url: Url,
    pub access_token: String,
    pub output: Option<PathBuf>,
    pub timeout: Duration,
    pub json_logs: bool,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.access_token.is_empty() {
            bail!("STRATUS_ACCESS_TOKEN must be provided");
        }

        if args.timeout_secs == 0 {
            bail!("STRATUS_TIMEOUT_SECS must be greater than 0");
        }

        let base_url = Url::parse(&args.base_url)
            .with_context(|| format!("invalid STRATUS_BASE_URL `{}`", args.base_url))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "STRATUS_BASE_URL must use http or https, got `{}`",
                base_url.scheme()
            );
        }

        Ok(Self {
            command: args.command,
            base_url,
            access_token: args.access_token,
            output: args.output,
            timeout: Duration::from_secs(args.timeout_secs),
            json_logs: args.json_logs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).expect("argv must parse")
    }

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn accepts_a_complete_command_line() {
        let args = parse(&[
            "stratus",
            "--access-token",
            "token",
            "--timeout-secs",
            "30",
            "list",
            "management-group-role-assignments",
        ]);

        let config = Config::try_from(args).expect("config must validate");
        assert_eq!(config.base_url.as_str(), "https://management.azure.com/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.output.is_none());
        assert!(matches!(
            config.command,
            Command::List(ListCommand::ManagementGroupRoleAssignments)
        ));
    }

    #[test]
    fn flags_are_accepted_after_the_subcommand() {
        let args = parse(&[
            "stratus",
            "list",
            "management-groups",
            "--access-token",
            "token",
            "--output",
            "groups.jsonl",
        ]);

        let config = Config::try_from(args).expect("config must validate");
        assert_eq!(config.output, Some(PathBuf::from("groups.jsonl")));
        assert!(matches!(
            config.command,
            Command::List(ListCommand::ManagementGroups)
        ));
    }

    #[test]
    fn rejects_a_missing_token() {
        let args = parse(&["stratus", "list", "management-groups"]);

        let error = Config::try_from(args).expect_err("empty token must be rejected");
        assert!(error.to_string().contains("STRATUS_ACCESS_TOKEN"));
    }

    #[test]
    fn rejects_a_zero_timeout() {
        let args = parse(&[
            "stratus",
            "--access-token",
            "token",
            "--timeout-secs",
            "0",
            "list",
            "management-groups",
        ]);

        let error = Config::try_from(args).expect_err("zero timeout must be rejected");
        assert!(error.to_string().contains("STRATUS_TIMEOUT_SECS"));
    }

    #[test]
    fn rejects_an_unparseable_base_url() {
        let args = parse(&[
            "stratus",
            "--access-token",
            "token",
            "--base-url",
            "management.azure.com",
            "list",
            "management-groups",
        ]);

        assert!(Config::try_from(args).is_err());
    }

    #[test]
    fn rejects_a_non_http_base_url() {
        let args = parse(&[
            "stratus",
            "--access-token",
            "token",
            "--base-url",
            "ftp://management.azure.com",
            "list",
            "management-groups",
        ]);

        let error = Config::try_from(args).expect_err("ftp scheme must be rejected");
        assert!(error.to_string().contains("http"));
    }
}
