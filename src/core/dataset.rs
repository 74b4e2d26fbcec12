use crate::core::datetime;
use crate::core::errors::{Error, Result};
use crate::core::filter::Filter;
use crate::core::json;
use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use std::collections::BTreeSet;
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  Prefix Entry
-------------------------------------------------------------------------------------------------*/

/// A single AWS IP Ranges record associating an IP prefix with a region, network border group,
/// and service. The same prefix appears once per service that uses it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrefixEntry {
    /// IPv4 or IPv6 prefix.
    pub ip_prefix: IpNetwork,

    /// AWS region the IP prefix is associated with.
    pub region: String,

    /// Network border group the IP prefix is advertised from; empty when the source record
    /// does not carry one.
    pub network_border_group: String,

    /// AWS service that uses the IP prefix.
    pub service: String,
}

/*-------------------------------------------------------------------------------------------------
  Dataset
-------------------------------------------------------------------------------------------------*/

/// Decoded AWS IP Ranges document. Prefix entries keep the document order: the IPv4
/// `prefixes` first, then the `ipv6_prefixes`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dataset {
    pub(crate) sync_token: String,
    pub(crate) create_date: String,
    pub(crate) prefixes: Vec<PrefixEntry>,
}

/*--------------------------------------------------------------------------------------
  Dataset Implementation
--------------------------------------------------------------------------------------*/

impl Dataset {
    /// Decode a raw AWS IP Ranges JSON document.
    pub fn from_json(json: &[u8]) -> serde_json::Result<Dataset> {
        json::parse(json).map(Dataset::from)
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// Publication version of the dataset (Unix epoch seconds as published by AWS).
    pub fn sync_token(&self) -> &str {
        &self.sync_token
    }

    /// Publication time of the dataset as published, in `YYYY-MM-DD-hh-mm-ss` format.
    pub fn create_date(&self) -> &str {
        &self.create_date
    }

    /// Publication time of the dataset parsed as a UTC timestamp, when well-formed.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        datetime::parse_create_date(&self.create_date)
    }

    pub fn prefixes(&self) -> &[PrefixEntry] {
        &self.prefixes
    }

    /*-------------------------------------------------------------------------
      CIDR Lists
    -------------------------------------------------------------------------*/

    /// Every IP prefix in dataset order, duplicates preserved.
    pub fn all_cidrs(&self) -> Vec<IpNetwork> {
        self.prefixes.iter().map(|entry| entry.ip_prefix).collect()
    }

    /// IP prefixes whose region exactly matches `region`.
    pub fn cidrs_by_region(&self, region: &str) -> Vec<IpNetwork> {
        self.cidrs_where(|entry| entry.region == region)
    }

    /// IP prefixes whose service exactly matches `service`.
    pub fn cidrs_by_service(&self, service: &str) -> Vec<IpNetwork> {
        self.cidrs_where(|entry| entry.service == service)
    }

    /// IP prefixes whose network border group exactly matches `network_border_group`.
    pub fn cidrs_by_network_border_group(&self, network_border_group: &str) -> Vec<IpNetwork> {
        self.cidrs_where(|entry| entry.network_border_group == network_border_group)
    }

    fn cidrs_where<P>(&self, predicate: P) -> Vec<IpNetwork>
    where
        P: Fn(&PrefixEntry) -> bool,
    {
        self.prefixes
            .iter()
            .filter(|entry| predicate(entry))
            .map(|entry| entry.ip_prefix)
            .collect()
    }

    /*-------------------------------------------------------------------------
      Distinct Tags
    -------------------------------------------------------------------------*/

    pub fn distinct_regions(&self) -> BTreeSet<String> {
        self.prefixes.iter().map(|entry| entry.region.clone()).collect()
    }

    pub fn distinct_services(&self) -> BTreeSet<String> {
        self.prefixes.iter().map(|entry| entry.service.clone()).collect()
    }

    pub fn distinct_network_border_groups(&self) -> BTreeSet<String> {
        self.prefixes
            .iter()
            .map(|entry| entry.network_border_group.clone())
            .filter(|network_border_group| !network_border_group.is_empty())
            .collect()
    }

    /*-------------------------------------------------------------------------
      Address Lookups
    -------------------------------------------------------------------------*/

    /// All prefix entries whose prefix contains `address`, in dataset order.
    pub fn matching_prefixes(&self, address: IpAddr) -> Vec<&PrefixEntry> {
        self.prefixes
            .iter()
            .filter(|entry| entry.ip_prefix.contains(address))
            .collect()
    }

    /// Whether `address` falls inside any prefix, optionally restricted to prefixes used by
    /// `service`.
    pub fn contains(&self, address: IpAddr, service: Option<&str>) -> bool {
        self.prefixes.iter().any(|entry| {
            service.map_or(true, |service| entry.service == service)
                && entry.ip_prefix.contains(address)
        })
    }

    /// Parse `address` and check whether it belongs to the AWS IP Ranges, optionally
    /// restricted to prefixes used by `service`.
    pub fn is_aws_ip(&self, address: &str, service: Option<&str>) -> Result<bool> {
        Ok(self.contains(parse_address(address)?, service))
    }

    /*-------------------------------------------------------------------------
      Filter
    -------------------------------------------------------------------------*/

    /// New [Dataset] containing the prefix entries that match `filter`, in dataset order.
    pub fn filter(&self, filter: &Filter) -> Dataset {
        Dataset {
            sync_token: self.sync_token.clone(),
            create_date: self.create_date.clone(),
            prefixes: self
                .prefixes
                .iter()
                .filter(|entry| filter.include_prefix(entry))
                .cloned()
                .collect(),
        }
    }
}

impl From<json::JsonIpRanges> for Dataset {
    fn from(value: json::JsonIpRanges) -> Self {
        let ipv4_prefixes = value.prefixes.into_iter().map(|prefix| PrefixEntry {
            ip_prefix: IpNetwork::V4(prefix.ip_prefix),
            region: prefix.region,
            network_border_group: prefix.network_border_group,
            service: prefix.service,
        });

        let ipv6_prefixes = value.ipv6_prefixes.into_iter().map(|prefix| PrefixEntry {
            ip_prefix: IpNetwork::V6(prefix.ipv6_prefix),
            region: prefix.region,
            network_border_group: prefix.network_border_group,
            service: prefix.service,
        });

        Dataset {
            sync_token: value.sync_token,
            create_date: value.create_date,
            prefixes: ipv4_prefixes.chain(ipv6_prefixes).collect(),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Parse an IPv4 or IPv6 address literal. Surrounding whitespace is not accepted.
///
/// ```
/// assert!(awsipcache::parse_address("2001:db8::1").is_ok());
/// assert!(awsipcache::parse_address(" 10.0.0.5").is_err());
/// ```
pub fn parse_address(address: &str) -> Result<IpAddr> {
    address
        .parse::<IpAddr>()
        .map_err(|error| Error::InvalidAddress {
            address: address.to_string(),
            reason: error.to_string(),
        })
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
