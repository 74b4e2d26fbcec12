use awsipcache::PrefixEntry;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::*;
use std::collections::{BTreeSet, HashSet};

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Prefix Table
--------------------------------------------------------------------------------------*/

pub fn prefix_table(prefixes: &[&PrefixEntry]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        ["IP Prefix", "Region", "Network Border Group", "Service"].map(|header| {
            Cell::new(header)
                .add_attribute(Attribute::Bold)
                .fg(Color::Green)
        }),
    );

    for entry in prefixes {
        table.add_row(vec![
            Cell::new(entry.ip_prefix).add_attribute(Attribute::Bold),
            Cell::new(&entry.region),
            Cell::new(&entry.network_border_group),
            Cell::new(&entry.service),
        ]);
    }

    // Right-align the IP Prefix column
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{table}");

    // Print prefix-table summary
    let mut summary_table = Table::new();
    summary_table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);

    summary_table.add_row(vec![Cell::new(prefixes.len()), Cell::new("AWS IP Prefixes")]);
    summary_table.add_row(vec![
        Cell::new(distinct(prefixes, |entry| &entry.region).len()),
        Cell::new("AWS Regions"),
    ]);
    summary_table.add_row(vec![
        Cell::new(distinct(prefixes, |entry| &entry.service).len()),
        Cell::new("AWS Services"),
    ]);

    if let Some(column) = summary_table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{summary_table}");
}

/*--------------------------------------------------------------------------------------
  Prefixes In CIDR Format
--------------------------------------------------------------------------------------*/

pub fn prefixes_in_cidr_format(prefixes: &[&PrefixEntry]) {
    // The same prefix is listed once per service
    let mut printed = HashSet::new();
    for entry in prefixes {
        if printed.insert(entry.ip_prefix) {
            println!("{}", entry.ip_prefix);
        }
    }
}

/*--------------------------------------------------------------------------------------
  Regions, Network Border Groups, and Services
--------------------------------------------------------------------------------------*/

pub fn regions(prefixes: &[&PrefixEntry]) {
    print_lines(distinct(prefixes, |entry| &entry.region));
}

pub fn network_border_groups(prefixes: &[&PrefixEntry]) {
    print_lines(distinct(prefixes, |entry| &entry.network_border_group));
}

pub fn services(prefixes: &[&PrefixEntry]) {
    print_lines(distinct(prefixes, |entry| &entry.service));
}

/*--------------------------------------------------------------------------------------
  Helper Functions
--------------------------------------------------------------------------------------*/

pub(crate) fn distinct<'p, F>(prefixes: &[&'p PrefixEntry], tag: F) -> BTreeSet<&'p str>
where
    F: Fn(&'p PrefixEntry) -> &'p String,
{
    prefixes
        .iter()
        .map(|entry| tag(*entry).as_str())
        .filter(|value| !value.is_empty())
        .collect()
}

fn print_lines(values: BTreeSet<&str>) {
    for value in values {
        println!("{value}");
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(region: &str, network_border_group: &str) -> PrefixEntry {
        PrefixEntry {
            ip_prefix: "10.0.0.0/8".parse().unwrap(),
            region: region.to_string(),
            network_border_group: network_border_group.to_string(),
            service: "EC2".to_string(),
        }
    }

    #[test]
    fn test_distinct_skips_empty_tags() {
        let first = entry("us-east-1", "");
        let second = entry("us-west-2", "us-west-2");
        let third = entry("us-east-1", "us-east-1");
        let prefixes = vec![&first, &second, &third];

        let regions = distinct(&prefixes, |entry| &entry.region);
        assert_eq!(regions, BTreeSet::from(["us-east-1", "us-west-2"]));

        let groups = distinct(&prefixes, |entry| &entry.network_border_group);
        assert_eq!(groups, BTreeSet::from(["us-east-1", "us-west-2"]));
    }
}
