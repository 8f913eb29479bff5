use serde::Deserialize;

use crate::table::Tabular;

/// A `{type, name}` classification attached to datasets and series.
///
/// Read-only: categories are parsed from API responses, never written back.
///
/// ```compile_fail
/// let category = leveropen::Category::new("Sector", "Services");
/// let _ = serde_json::to_string(&category);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Category {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl Category {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// Two-column (`type`, `name`) table of categories in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    rows: Vec<Category>,
}

impl CategoryTable {
    pub const COLUMNS: [&'static str; 2] = ["type", "name"];

    pub fn rows(&self) -> &[Category] {
        &self.rows
    }

    pub fn types(&self) -> Vec<&str> {
        self.rows.iter().map(|c| c.kind.as_str()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Tabular for CategoryTable {
    fn columns(&self) -> Vec<&str> {
        Self::COLUMNS.to_vec()
    }

    fn string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|c| vec![c.kind.clone(), c.name.clone()])
            .collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Tabulates categories; rows keep input order and duplicates.
pub fn parse_categories(categories: &[Category]) -> CategoryTable {
    CategoryTable {
        rows: categories.to_vec(),
    }
}
