use crate::core::dataset::PrefixEntry;
use std::collections::BTreeSet;

/*-------------------------------------------------------------------------------------------------
  IP Version
-------------------------------------------------------------------------------------------------*/

/// IP version (IPv4 or IPv6) used to filter the prefix entries.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpVersion {
    IPv4,
    IPv6,
}

/*-------------------------------------------------------------------------------------------------
  Filter
-------------------------------------------------------------------------------------------------*/

/// Filter parameters used to select prefix entries with [Dataset::filter]. Unset (`None`)
/// parameters match every entry; set parameters must all match (exact string equality).
///
/// ```
/// let filter = awsipcache::Filter {
///     ip_version: Some(awsipcache::IpVersion::IPv4),
///     regions: Some(["us-west-2".to_string()].into_iter().collect()),
///     services: Some(["S3".to_string()].into_iter().collect()),
///     ..awsipcache::Filter::default()
/// };
/// ```
///
/// [Dataset::filter]: crate::Dataset::filter
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// Only include IPv4 or IPv6 prefixes.
    pub ip_version: Option<IpVersion>,

    /// Include prefixes from these AWS regions.
    pub regions: Option<BTreeSet<String>>,

    /// Include prefixes from these network border groups.
    pub network_border_groups: Option<BTreeSet<String>>,

    /// Include prefixes used by these services.
    pub services: Option<BTreeSet<String>>,
}

/*--------------------------------------------------------------------------------------
  Filter Implementation
--------------------------------------------------------------------------------------*/

impl Filter {
    fn match_ip_version(&self, entry: &PrefixEntry) -> bool {
        match self.ip_version {
            None => true,
            Some(IpVersion::IPv4) => entry.ip_prefix.is_ipv4(),
            Some(IpVersion::IPv6) => entry.ip_prefix.is_ipv6(),
        }
    }

    fn match_regions(&self, entry: &PrefixEntry) -> bool {
        match_tag(&self.regions, &entry.region)
    }

    fn match_network_border_groups(&self, entry: &PrefixEntry) -> bool {
        match_tag(&self.network_border_groups, &entry.network_border_group)
    }

    fn match_services(&self, entry: &PrefixEntry) -> bool {
        match_tag(&self.services, &entry.service)
    }

    pub(crate) fn include_prefix(&self, entry: &PrefixEntry) -> bool {
        self.match_ip_version(entry)
            && self.match_regions(entry)
            && self.match_network_border_groups(entry)
            && self.match_services(entry)
    }
}

fn match_tag(tags: &Option<BTreeSet<String>>, value: &str) -> bool {
    tags.as_ref().map_or(true, |tags| tags.contains(value))
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
