use crate::cli::Result;
use awsipcache::PrefixEntry;
use std::path::Path;

/*-------------------------------------------------------------------------------------------------
  Save Prefixes to CSV File
-------------------------------------------------------------------------------------------------*/

pub fn save(prefixes: &[&PrefixEntry], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.serialize([
        "AWS IP Prefix",
        "Region",
        "Network Border Group",
        "Service",
    ])?;

    // Write prefix records
    for entry in prefixes {
        writer.serialize((
            entry.ip_prefix.to_string(),
            &entry.region,
            &entry.network_border_group,
            &entry.service,
        ))?;
    }

    writer.flush()?;

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_save() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("prefixes.csv");
        let entry = PrefixEntry {
            ip_prefix: "2001:db8::/32".parse().unwrap(),
            region: "us-west-2".to_string(),
            network_border_group: "us-west-2".to_string(),
            service: "AMAZON".to_string(),
        };

        save(&[&entry], &path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "AWS IP Prefix,Region,Network Border Group,Service\n\
             2001:db8::/32,us-west-2,us-west-2,AMAZON\n"
        );
    }
}
