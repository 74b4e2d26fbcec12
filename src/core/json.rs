use ipnetwork::{Ipv4Network, Ipv6Network};
use serde::Deserialize;

/*-------------------------------------------------------------------------------------------------
  Parse JSON
-------------------------------------------------------------------------------------------------*/

pub fn parse(json: &[u8]) -> serde_json::Result<JsonIpRanges> {
    serde_json::from_slice(json)
}

/*-------------------------------------------------------------------------------------------------
  JSON Data Structures
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  JSON IP Ranges
--------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct JsonIpRanges {
    #[serde(rename = "syncToken", default)]
    pub sync_token: String,

    #[serde(rename = "createDate", default)]
    pub create_date: String,

    pub prefixes: Vec<JsonIpPrefix>,

    #[serde(default)]
    pub ipv6_prefixes: Vec<JsonIpv6Prefix>,
}

/*--------------------------------------------------------------------------------------
  JSON IP (IPv4) Prefix
--------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct JsonIpPrefix {
    pub ip_prefix: Ipv4Network,
    pub region: String,
    #[serde(default)]
    pub network_border_group: String,
    pub service: String,
}

/*--------------------------------------------------------------------------------------
  JSON IPv6 Prefix
--------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct JsonIpv6Prefix {
    pub ipv6_prefix: Ipv6Network,
    pub region: String,
    #[serde(default)]
    pub network_border_group: String,
    pub service: String,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
