use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use crate::category::{Category, CategoryTable, parse_categories};
use crate::error::LookupError;
use crate::series::{DateTimeRange, Location, Series, SeriesData, SeriesRecord};
use crate::table::Tabular;
use crate::transport::Transport;
use crate::util::parse_date;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct License {
    pub name: String,
    pub url: String,
}

/// One entry of the dataset listing, as sent by the API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DatasetRecord {
    uuid: String,
    name: String,
    released_on: String,
    processed_on: String,
    collection: String,
    topic: String,
    link: String,
    license: License,
    #[serde(default)]
    datetimes: Vec<DateTimeRange>,
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default)]
    categories: Vec<Category>,
    series: String,
}

/// A published collection of related series.
///
/// The member series are fetched from [`Dataset::series_url`] the first time
/// they are needed and kept for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub uuid: String,
    pub name: String,
    pub released_on: NaiveDateTime,
    pub processed_on: NaiveDateTime,
    pub collection: String,
    pub topic: String,
    pub link: String,
    pub license: License,
    pub datetimes: Vec<DateTimeRange>,
    pub locations: Vec<Location>,
    pub categories: Vec<Category>,
    pub series_url: String,
    series: Option<Vec<Series>>,
    transport: Transport,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.name == other.name
            && self.released_on == other.released_on
            && self.processed_on == other.processed_on
            && self.collection == other.collection
            && self.topic == other.topic
            && self.link == other.link
            && self.license == other.license
            && self.datetimes == other.datetimes
            && self.locations == other.locations
            && self.categories == other.categories
            && self.series_url == other.series_url
    }
}

/// Flattened description of a dataset, labeled with its uuid.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMetadata {
    pub label: String,
    pub name: String,
    pub topic: String,
    pub collection: String,
    pub released_on: NaiveDateTime,
    pub processed_on: NaiveDateTime,
    pub link: String,
    pub license_name: String,
    pub license_url: String,
    pub series_names_and_uuids: SeriesIndex,
    pub categories: CategoryTable,
}

/// Two-column (`name`, `uuid`) table of a dataset's series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesIndex {
    rows: Vec<(String, String)>,
}

impl SeriesIndex {
    pub const COLUMNS: [&'static str; 2] = ["name", "uuid"];

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn uuids(&self) -> Vec<&str> {
        self.rows.iter().map(|(_, uuid)| uuid.as_str()).collect()
    }
}

impl Tabular for SeriesIndex {
    fn columns(&self) -> Vec<&str> {
        Self::COLUMNS.to_vec()
    }

    fn string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|(name, uuid)| vec![name.clone(), uuid.clone()])
            .collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

impl Dataset {
    pub(crate) fn from_record(record: DatasetRecord, transport: Transport) -> Result<Self> {
        let released_on = parse_date(&record.released_on)
            .with_context(|| format!("dataset {}: invalid released_on", record.uuid))?;
        let processed_on = parse_date(&record.processed_on)
            .with_context(|| format!("dataset {}: invalid processed_on", record.uuid))?;

        Ok(Self {
            uuid: record.uuid,
            name: record.name,
            released_on,
            processed_on,
            collection: record.collection,
            topic: record.topic,
            link: record.link,
            license: record.license,
            datetimes: record.datetimes,
            locations: record.locations,
            categories: record.categories,
            series_url: record.series,
            series: None,
            transport,
        })
    }

    pub fn get_metadata(&mut self) -> Result<DatasetMetadata> {
        let series_names_and_uuids = self.get_series_names_and_uuids()?;
        Ok(DatasetMetadata {
            label: self.uuid.clone(),
            name: self.name.clone(),
            topic: self.topic.clone(),
            collection: self.collection.clone(),
            released_on: self.released_on,
            processed_on: self.processed_on,
            link: self.link.clone(),
            license_name: self.license.name.clone(),
            license_url: self.license.url.clone(),
            series_names_and_uuids,
            categories: self.get_categories(),
        })
    }

    pub fn get_categories(&self) -> CategoryTable {
        parse_categories(&self.categories)
    }

    /// Member series in listing order, fetched on first call.
    pub fn get_series(&mut self) -> Result<&[Series]> {
        let series = match self.series.take() {
            Some(series) => series,
            None => self.fetch_series_by_url()?,
        };
        Ok(self.series.insert(series).as_slice())
    }

    pub fn get_series_names_and_uuids(&mut self) -> Result<SeriesIndex> {
        let rows = self
            .get_series()?
            .iter()
            .map(|s| (s.name.clone(), s.uuid.clone()))
            .collect();
        Ok(SeriesIndex { rows })
    }

    /// The single series named exactly `name`.
    pub fn get_series_by_name(&mut self, name: &str) -> Result<&Series> {
        self.find_one("name", name, |s| &s.name)
    }

    /// The single series with identifier `uuid`.
    pub fn get_series_by_uuid(&mut self, uuid: &str) -> Result<&Series> {
        self.find_one("uuid", uuid, |s| &s.uuid)
    }

    /// Every series whose name contains `fragment` (case-sensitive), in order.
    /// No match gives an empty list.
    pub fn get_series_by_name_containing(&mut self, fragment: &str) -> Result<Vec<&Series>> {
        Ok(self
            .get_series()?
            .iter()
            .filter(|s| s.name.contains(fragment))
            .collect())
    }

    /// Fetches the observations of every member series, in order.
    pub fn collect_series_data(&mut self) -> Result<Vec<(String, SeriesData)>> {
        let progress = self.transport.progress();
        let series = self.get_series()?;

        let pb = if progress {
            let pb = ProgressBar::new(series.len() as u64);
            pb.set_style(
                ProgressStyle::with_template("{msg} {wide_bar} {pos}/{len} ({eta})")?
                    .progress_chars("=>-"),
            );
            pb.set_message("Parsing series objects");
            Some(pb)
        } else {
            None
        };

        let mut out = Vec::with_capacity(series.len());
        for s in series {
            out.push((s.name.clone(), s.get_data()?));
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }
        Ok(out)
    }

    fn find_one(
        &mut self,
        field: &'static str,
        query: &str,
        key: impl Fn(&Series) -> &String,
    ) -> Result<&Series> {
        let series = self.get_series()?;
        let mut matches = series.iter().filter(|s| key(*s) == query);
        match (matches.next(), matches.count()) {
            (Some(found), 0) => Ok(found),
            (None, _) => Err(LookupError::NotFound {
                field,
                query: query.to_string(),
            }
            .into()),
            (Some(_), rest) => Err(LookupError::Ambiguous {
                field,
                query: query.to_string(),
                matches: rest + 1,
            }
            .into()),
        }
    }

    fn fetch_series_by_url(&self) -> Result<Vec<Series>> {
        log::info!("fetching series of dataset {} ({})", self.name, self.uuid);
        let records: Vec<SeriesRecord> = self
            .transport
            .get_json(&self.series_url, &[])
            .with_context(|| format!("invalid series listing for dataset {}", self.uuid))?;
        log::debug!("dataset {} has {} series", self.uuid, records.len());
        Ok(records
            .into_iter()
            .map(|r| Series::from_record(r, self.transport.clone()))
            .collect())
    }
}
