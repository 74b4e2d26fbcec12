use crate::cli::core::Lookup;
use log::{info, warn};

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Lookup Results
--------------------------------------------------------------------------------------*/

pub fn lookup_results(addresses: usize, lookup: &Lookup) {
    info!("Looked up {addresses} IP address(es) in the AWS IP Ranges");

    if lookup.found > 0 {
        info!(
            "Found {} IP address(es) contained in {} AWS IP Prefix(es)",
            lookup.found,
            lookup.prefixes.len()
        );
    };

    for address in &lookup.not_found {
        warn!("IP address not found in the AWS IP Ranges: {address}");
    }
}
