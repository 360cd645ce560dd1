/// Dimension tables, written as plain (unpartitioned) directories.
pub const NON_PARTITIONED_TABLES: &[&str] = &[
    "call_center",
    "catalog_page",
    "customer",
    "customer_address",
    "customer_demographics",
    "date_dim",
    "household_demographics",
    "income_band",
    "item",
    "promotion",
    "reason",
    "ship_mode",
    "store",
    "time_dim",
    "warehouse",
    "web_page",
    "web_site",
];

/// Directory value a null partition key is written under.
pub const NULL_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

/// Fact tables paired with the date key they are partitioned by.
pub const PARTITIONED_TABLES: &[(&str, &str)] = &[
    ("catalog_sales", "cs_sold_date_sk"),
    ("catalog_returns", "cr_returned_date_sk"),
    ("inventory", "inv_date_sk"),
    ("store_sales", "ss_sold_date_sk"),
    ("store_returns", "sr_returned_date_sk"),
    ("web_sales", "ws_sold_date_sk"),
    ("web_returns", "wr_returned_date_sk"),
];

/// Every TPC-DS table, dimensions first.
pub fn all_tables() -> impl Iterator<Item = &'static str> {
    NON_PARTITIONED_TABLES
        .iter()
        .copied()
        .chain(PARTITIONED_TABLES.iter().map(|(table, _)| *table))
}

/// Partition column of a fact table, `None` for dimensions and unknown names.
pub fn partition_column(table: &str) -> Option<&'static str> {
    PARTITIONED_TABLES
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, column)| *column)
}

/// The set of tables a generation pass covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilter {
    tables: Vec<&'static str>,
}

impl TableFilter {
    /// Built from both static lists; the command line exposes no narrower filter.
    pub fn all() -> Self {
        Self {
            tables: all_tables().collect(),
        }
    }

    #[cfg(test)]
    pub fn only(table: &str) -> Option<Self> {
        all_tables()
            .find(|name| *name == table)
            .map(|name| Self { tables: vec![name] })
    }

    pub fn tables(&self) -> &[&'static str] {
        &self.tables
    }

    pub fn is_all(&self) -> bool {
        self.tables.len() == NON_PARTITIONED_TABLES.len() + PARTITIONED_TABLES.len()
    }

    /// The single table to pass to `dsdgen -TABLE`, if the filter is that narrow.
    pub fn single_table(&self) -> Option<&'static str> {
        match self.tables.as_slice() {
            [table] => Some(*table),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_lists_are_disjoint_and_complete() {
        assert_eq!(NON_PARTITIONED_TABLES.len(), 17);
        assert_eq!(PARTITIONED_TABLES.len(), 7);

        let names: HashSet<&str> = all_tables().collect();
        assert_eq!(names.len(), 24);
    }

    #[test]
    fn test_partition_column_lookup() {
        assert_eq!(partition_column("store_sales"), Some("ss_sold_date_sk"));
        assert_eq!(partition_column("inventory"), Some("inv_date_sk"));
        assert_eq!(partition_column("store"), None);
        assert_eq!(partition_column("no_such_table"), None);
    }

    #[test]
    fn test_filter_all_covers_every_table() {
        let filter = TableFilter::all();
        assert!(filter.is_all());
        assert_eq!(filter.single_table(), None);
        assert!(all_tables().all(|table| filter.tables().contains(&table)));
    }

    #[test]
    fn test_filter_only_single_table() {
        let filter = TableFilter::only("web_sales").unwrap();
        assert!(!filter.is_all());
        assert_eq!(filter.single_table(), Some("web_sales"));
        assert_eq!(filter.tables(), &["web_sales"]);
        assert!(TableFilter::only("web").is_none());
    }
}
