use clap::{Arg, ArgMatches, Command};

use crate::relay::{DEFAULT_ALLOWED_ORIGIN, DEFAULT_UPSTREAM_URL};

pub const ARG_UPSTREAM_URL: &str = "upstream-url";
pub const ARG_UPSTREAM_TIMEOUT_SECONDS: &str = "upstream-timeout-seconds";
pub const ARG_ALLOWED_ORIGIN: &str = "allowed-origin";

#[derive(Debug)]
pub struct Options {
    pub url: String,
    pub timeout_seconds: u64,
    pub allowed_origin: String,
}

impl Options {
    /// Parse upstream and origin arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_required = |id: &str| -> anyhow::Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            url: read_required(ARG_UPSTREAM_URL)?,
            timeout_seconds: matches
                .get_one::<u64>(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
            allowed_origin: read_required(ARG_ALLOWED_ORIGIN)?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_UPSTREAM_URL)
                .long(ARG_UPSTREAM_URL)
                .help("Base URL of the upstream identity API")
                .env("PULSE_RELAY_UPSTREAM_URL")
                .default_value(DEFAULT_UPSTREAM_URL),
        )
        .arg(
            Arg::new(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .long(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .help("Timeout for each upstream call in seconds")
                .env("PULSE_RELAY_UPSTREAM_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_ALLOWED_ORIGIN)
                .long(ARG_ALLOWED_ORIGIN)
                .help("Browser origin allowed to make credentialed requests")
                .env("PULSE_RELAY_ALLOWED_ORIGIN")
                .default_value(DEFAULT_ALLOWED_ORIGIN),
        )
}
