use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

use crate::config::{LeverConfig, load_config};
use crate::dataset::{Dataset, DatasetRecord};
use crate::error::FilterFieldError;
use crate::transport::Transport;

/// Dataset fields the catalog can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetField {
    Name,
    Collection,
    Topic,
}

impl DatasetField {
    pub const ALL: [DatasetField; 3] = [Self::Name, Self::Collection, Self::Topic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Collection => "collection",
            Self::Topic => "topic",
        }
    }

    fn value(self, dataset: &Dataset) -> &str {
        match self {
            Self::Name => &dataset.name,
            Self::Collection => &dataset.collection,
            Self::Topic => &dataset.topic,
        }
    }
}

impl FromStr for DatasetField {
    type Err = FilterFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| FilterFieldError(s.to_string()))
    }
}

impl fmt::Display for DatasetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry point to the Lever Open API: lists datasets and filters them.
///
/// The transport (and the token it carries) stays private:
///
/// ```compile_fail
/// let lever = leveropen::Lever::new("token", "https://api.leveropen.com/", "v1").unwrap();
/// let _ = lever.transport();
/// ```
#[derive(Debug, Clone)]
pub struct Lever {
    transport: Transport,
}

impl Lever {
    /// Creates a catalog for `{base_url}{version}/` authenticated with `access_token`.
    pub fn new(access_token: &str, base_url: &str, version: &str) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(access_token, base_url, version)?,
        })
    }

    /// Creates a catalog from `LEVEROPEN_*` environment variables and/or `.leveropenrc`.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&load_config()?)
    }

    pub fn from_config(cfg: &LeverConfig) -> Result<Self> {
        Self::new(&cfg.access_token, &cfg.base_url, &cfg.version)
    }

    /// Shows a progress bar while [`Dataset::collect_series_data`] runs.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.transport = self.transport.with_progress(progress);
        self
    }

    /// Fetches the full dataset listing. Every call hits the API.
    pub fn get_all_datasets(&self) -> Result<Vec<Dataset>> {
        self.fetch_datasets(&[])
    }

    pub fn get_datasets_by_collection(&self, collection: &str) -> Result<Vec<Dataset>> {
        self.get_datasets_by(DatasetField::Collection, collection)
    }

    pub fn get_datasets_by_topic(&self, topic: &str) -> Result<Vec<Dataset>> {
        self.get_datasets_by(DatasetField::Topic, topic)
    }

    pub fn get_datasets_by_name(&self, name: &str) -> Result<Vec<Dataset>> {
        self.get_datasets_by(DatasetField::Name, name)
    }

    /// Datasets whose `by` field contains `query` (case-sensitive).
    ///
    /// The query is also passed to the API so it can narrow the listing.
    pub fn get_datasets_by(&self, by: DatasetField, query: &str) -> Result<Vec<Dataset>> {
        let datasets = self.fetch_datasets(&[(by.as_str(), query)])?;
        let total = datasets.len();
        let matching: Vec<Dataset> = datasets
            .into_iter()
            .filter(|d| by.value(d).contains(query))
            .collect();
        log::debug!(
            "{} of {} datasets match {}={:?}",
            matching.len(),
            total,
            by,
            query
        );
        Ok(matching)
    }

    /// As [`Lever::get_datasets_by`], naming the field as text; unknown
    /// fields fail with [`FilterFieldError`] without contacting the API.
    pub fn get_datasets_by_field(&self, by: &str, query: &str) -> Result<Vec<Dataset>> {
        let field: DatasetField = by.parse()?;
        self.get_datasets_by(field, query)
    }

    fn fetch_datasets(&self, params: &[(&str, &str)]) -> Result<Vec<Dataset>> {
        let records: Vec<DatasetRecord> = self
            .transport
            .get_json("datasets", params)
            .context("failed to fetch dataset listing")?;
        log::info!("fetched {} datasets", records.len());
        self.parse_datasets(records)
    }

    fn parse_datasets(&self, records: Vec<DatasetRecord>) -> Result<Vec<Dataset>> {
        records
            .into_iter()
            .map(|r| Dataset::from_record(r, self.transport.clone()))
            .collect()
    }
}
