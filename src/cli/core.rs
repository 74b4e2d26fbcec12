use crate::cli;
use awsipcache::{Client, ClientBuilder, Dataset, Filter, IpVersion, PrefixEntry};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Core functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Build the client from CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_client(args: &cli::Args) -> awsipcache::Result<Client> {
    let mut builder = ClientBuilder::default();

    if let Some(cache_dir) = args.cache_dir.clone().or_else(default_cache_dir) {
        builder.cache_dir(cache_dir);
    }
    if let Some(cache_time) = args.cache_time {
        builder.cache_time(cache_time);
    }
    if let Some(url) = &args.url {
        builder.url(url);
    }
    if let Some(timeout) = args.timeout {
        builder.timeout(timeout);
    }

    builder.build()
}

/// Per-user cache directory: `${XDG_CACHE_HOME}/awsipcache` on Linux.
fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|cache_dir| cache_dir.join("awsipcache"))
}

/*--------------------------------------------------------------------------------------
  Parse IP addresses from CLI arguments
--------------------------------------------------------------------------------------*/

pub fn parse_addresses(args: &cli::Args) -> awsipcache::Result<Option<Vec<IpAddr>>> {
    args.addresses
        .as_ref()
        .map(|addresses| {
            addresses
                .iter()
                .map(|address| awsipcache::parse_address(address))
                .collect::<awsipcache::Result<Vec<IpAddr>>>()
        })
        .transpose()
}

/*--------------------------------------------------------------------------------------
  Build the prefix filter from CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_filter(args: &cli::Args) -> Filter {
    let ip_version = match (args.ipv4, args.ipv6) {
        (true, false) => Some(IpVersion::IPv4),
        (false, true) => Some(IpVersion::IPv6),
        _ => None,
    };

    Filter {
        ip_version,
        regions: to_set(&args.regions),
        network_border_groups: to_set(&args.network_border_groups),
        services: to_set(&args.services),
    }
}

fn to_set(values: &Option<Vec<String>>) -> Option<BTreeSet<String>> {
    values
        .as_ref()
        .map(|values| values.iter().cloned().collect())
}

/*--------------------------------------------------------------------------------------
  Look up IP addresses
--------------------------------------------------------------------------------------*/

/// Results of looking up IP addresses in the AWS IP Ranges.
#[derive(Debug, Default)]
pub struct Lookup<'d> {
    /// Unique prefix entries containing at least one of the addresses, in dataset order.
    pub prefixes: Vec<&'d PrefixEntry>,

    /// Number of addresses found in the AWS IP Ranges.
    pub found: usize,

    /// Addresses not found in the AWS IP Ranges.
    pub not_found: Vec<IpAddr>,
}

pub fn lookup<'d>(dataset: &'d Dataset, addresses: &[IpAddr]) -> Lookup<'d> {
    let mut lookup = Lookup::default();

    // Rows are tracked by position; identical rows in the dataset are distinct entries
    let mut rows = BTreeSet::new();
    for address in addresses {
        let matches: Vec<usize> = dataset
            .prefixes()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.ip_prefix.contains(*address))
            .map(|(row, _)| row)
            .collect();

        if matches.is_empty() {
            lookup.not_found.push(*address);
        } else {
            lookup.found += 1;
            rows.extend(matches);
        }
    }

    lookup.prefixes = rows.into_iter().map(|row| &dataset.prefixes()[row]).collect();
    lookup
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
