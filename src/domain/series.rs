// Series catalog - fixed sensor cardinality and stored column names per series
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("invalid identifier {0:?}: only ASCII letters, digits and '_' are allowed")]
    InvalidIdentifier(String),
    #[error("series {0} declares zero sensors")]
    NoSensors(String),
    #[error("series {0} is declared twice")]
    Duplicate(String),
}

/// One monitored sensor group, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub name: String,
    pub table: String,
    pub sensor_count: usize,
    columns: Vec<String>,
}

impl SeriesSpec {
    pub fn new(
        name: &str,
        table: &str,
        sensor_count: usize,
        column_prefix: &str,
    ) -> Result<Self, CatalogError> {
        for ident in [name, table, column_prefix] {
            ensure_identifier(ident)?;
        }
        if sensor_count == 0 {
            return Err(CatalogError::NoSensors(name.to_string()));
        }

        let columns = (1..=sensor_count)
            .map(|i| format!("{}{}_temperature", column_prefix, i))
            .collect();

        Ok(Self {
            name: name.to_string(),
            table: table.to_string(),
            sensor_count,
            columns,
        })
    }

    /// Stored sensor column names, in sensor order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeriesCatalog {
    series: BTreeMap<String, SeriesSpec>,
}

impl SeriesCatalog {
    pub fn new(specs: Vec<SeriesSpec>) -> Result<Self, CatalogError> {
        let mut series = BTreeMap::new();
        for spec in specs {
            if series.contains_key(&spec.name) {
                return Err(CatalogError::Duplicate(spec.name));
            }
            series.insert(spec.name.clone(), spec);
        }
        Ok(Self { series })
    }

    pub fn get(&self, name: &str) -> Option<&SeriesSpec> {
        self.series.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

/// Names that end up interpolated into SQL must be plain identifiers.
pub fn ensure_identifier(ident: &str) -> Result<(), CatalogError> {
    let valid = !ident.is_empty() && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CatalogError::InvalidIdentifier(ident.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_follow_prefix_and_count() {
        let spec = SeriesSpec::new("t4", "t4", 3, "sensor").unwrap();
        assert_eq!(
            spec.columns(),
            ["sensor1_temperature", "sensor2_temperature", "sensor3_temperature"]
        );
    }

    #[test]
    fn test_rejects_sql_unsafe_names() {
        assert_eq!(
            SeriesSpec::new("t4; drop", "t4", 8, "sensor"),
            Err(CatalogError::InvalidIdentifier("t4; drop".to_string()))
        );
        assert!(SeriesSpec::new("t4", "", 8, "sensor").is_err());
        assert_eq!(
            SeriesSpec::new("t4", "t4", 0, "sensor"),
            Err(CatalogError::NoSensors("t4".to_string()))
        );
    }

    #[test]
    fn test_catalog_lookup_and_duplicates() {
        let a = SeriesSpec::new("g1", "g1", 8, "sensor").unwrap();
        let b = SeriesSpec::new("g2", "g2", 8, "sensor").unwrap();
        let catalog = SeriesCatalog::new(vec![a.clone(), b]).unwrap();
        assert_eq!(catalog.get("g1"), Some(&a));
        assert!(catalog.get("g9").is_none());
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["g1", "g2"]);

        let dup = SeriesCatalog::new(vec![a.clone(), a]);
        assert!(matches!(dup, Err(CatalogError::Duplicate(name)) if name == "g1"));
    }
}
