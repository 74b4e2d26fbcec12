use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(author, version, about = "Query the AWS IP ranges from a shared on-disk cache.", long_about = None)]
pub struct Args {
    /// Include IPv4 prefixes
    #[arg(short = '4', long)]
    pub ipv4: bool,

    /// Include IPv6 prefixes
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Include prefixes from these AWS Regions
    #[arg(short = 'r', long = "region")]
    pub regions: Option<Vec<String>>,

    /// Include prefixes from these Network Border Groups
    #[arg(short = 'g', long = "network-border-group")]
    pub network_border_groups: Option<Vec<String>>,

    /// Include prefixes used by these AWS Services
    #[arg(short = 's', long = "service")]
    pub services: Option<Vec<String>>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Save the matching prefixes to a CSV file
    #[arg(long = "csv")]
    pub csv_file: Option<PathBuf>,

    /// Directory used to cache the AWS IP Ranges JSON [default: per-user cache directory]
    #[arg(long, env = "AWSIPCACHE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Time (in seconds) the cached AWS IP Ranges JSON is considered fresh
    #[arg(long, env = "AWSIPCACHE_CACHE_TIME", allow_negative_numbers = true)]
    pub cache_time: Option<i64>,

    /// URL used to retrieve the AWS IP Ranges JSON
    #[arg(long, env = "AWSIPCACHE_URL")]
    pub url: Option<String>,

    /// Time (in milliseconds) to wait for the AWS IP Ranges JSON to be retrieved
    #[arg(long, env = "AWSIPCACHE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Look up these IP addresses in the AWS IP Ranges
    pub addresses: Option<Vec<String>>,
}

/*--------------------------------------------------------------------------------------
  Output Format
--------------------------------------------------------------------------------------*/

#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// Table of prefixes with their region, network border group, and service
    #[default]
    Table,

    /// List of (RFC4632) CIDR-format prefixes
    Cidr,

    /// List of the AWS Regions
    Regions,

    /// List of the Network Border Groups
    NetworkBorderGroups,

    /// List of the AWS Services
    Services,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
