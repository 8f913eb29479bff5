use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::category::{Category, CategoryTable, parse_categories};
use crate::table::Tabular;
use crate::transport::Transport;
use crate::util::{format_timestamp, parse_timestamp, timestamp_from_millis};

/// The time axis a series covers, e.g. `Month` from `January 1997` to `December 2020`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DateTimeRange {
    pub name: String,
    #[serde(default)]
    pub range: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

/// One entry of a dataset's series listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct SeriesRecord {
    pub(crate) uuid: String,
    pub(crate) name: String,
    pub(crate) units: String,
    pub(crate) magnitude: f64,
    pub(crate) link: String,
    pub(crate) datetime: DateTimeRange,
    pub(crate) location: Location,
    #[serde(default)]
    pub(crate) categories: Vec<Category>,
}

/// A single named time series within a dataset.
///
/// Observations are not part of the listing; [`Series::get_data`] fetches
/// them from the series link each time it is called.
#[derive(Debug, Clone)]
pub struct Series {
    pub uuid: String,
    pub name: String,
    pub units: String,
    /// Scaling factor reported by the API. Never applied to values.
    pub magnitude: f64,
    pub link: String,
    pub date_time: DateTimeRange,
    pub location: Location,
    pub categories: Vec<Category>,
    transport: Transport,
}

impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.name == other.name
            && self.units == other.units
            && self.magnitude == other.magnitude
            && self.link == other.link
            && self.date_time == other.date_time
            && self.location == other.location
            && self.categories == other.categories
    }
}

impl Series {
    pub(crate) fn from_record(record: SeriesRecord, transport: Transport) -> Self {
        Self {
            uuid: record.uuid,
            name: record.name,
            units: record.units,
            magnitude: record.magnitude,
            link: record.link,
            date_time: record.datetime,
            location: record.location,
            categories: record.categories,
            transport,
        }
    }

    pub fn get_categories(&self) -> CategoryTable {
        parse_categories(&self.categories)
    }

    /// Fetches the observations behind this series.
    pub fn get_data(&self) -> Result<SeriesData> {
        log::debug!("fetching data for series {} ({})", self.name, self.uuid);
        let payload: Value = self.transport.get_json(&self.link, &[])?;
        SeriesData::from_payload(&payload)
            .with_context(|| format!("failed to parse data of series {}", self.uuid))
    }
}

/// One row of [`SeriesData`].
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// `NaN` where the API reports no value.
    pub value: f64,
    /// The API's own label for the period, kept verbatim.
    pub date_time: String,
    pub series_name: String,
    pub country: String,
    pub date_from: NaiveDateTime,
    pub date_to: NaiveDateTime,
}

/// Observations of one series, indexed by the API's period keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesData {
    index: Vec<String>,
    rows: Vec<Observation>,
}

const INDEX_COLUMN: &str = "Period";
const VALUE: &str = "Value";
const DATE_TIME: &str = "DateTime";
const SERIES_NAME: &str = "SeriesName";
const COUNTRY: &str = "Country";
const DATE_FROM: &str = "DateFrom";
const DATE_TO: &str = "DateTo";

impl SeriesData {
    pub const COLUMNS: [&'static str; 6] =
        [VALUE, DATE_TIME, SERIES_NAME, COUNTRY, DATE_FROM, DATE_TO];

    /// Parses either a column-oriented object (`{"Value": {period: v}, ...}`)
    /// or an array of row records.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        match payload {
            Value::Object(columns) => Self::from_columns(columns),
            Value::Array(records) => Self::from_records(records),
            other => bail!("expected an object or array of observations, got {}", kind_of(other)),
        }
    }

    fn from_columns(columns: &Map<String, Value>) -> Result<Self> {
        // Periods come from the Value column, or the first column if it is absent.
        let Some(index_source) = columns.get(VALUE).or_else(|| columns.values().next()) else {
            return Ok(Self::default());
        };
        let index_source = index_source
            .as_object()
            .ok_or_else(|| anyhow!("column is not an object keyed by period"))?;

        let mut data = Self::default();
        for period in index_source.keys() {
            let cell = |column: &str| {
                columns
                    .get(column)
                    .and_then(Value::as_object)
                    .and_then(|c| c.get(period))
            };
            let row =
                observation(cell).with_context(|| format!("invalid observation {}", period))?;
            data.index.push(period.clone());
            data.rows.push(row);
        }
        Ok(data)
    }

    fn from_records(records: &[Value]) -> Result<Self> {
        let mut data = Self::default();
        for (position, record) in records.iter().enumerate() {
            let record = record
                .as_object()
                .ok_or_else(|| anyhow!("observation {} is not an object", position))?;
            let period = match record.get(INDEX_COLUMN) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => position.to_string(),
                Some(other) => other.to_string(),
            };
            let row = observation(|column| record.get(column))
                .with_context(|| format!("invalid observation {}", period))?;
            data.index.push(period);
            data.rows.push(row);
        }
        Ok(data)
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.value).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Observation)> {
        self.index.iter().map(String::as_str).zip(self.rows.iter())
    }
}

impl Tabular for SeriesData {
    fn columns(&self) -> Vec<&str> {
        let mut columns = vec![INDEX_COLUMN];
        columns.extend(Self::COLUMNS);
        columns
    }

    fn string_rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|(period, r)| {
                vec![
                    period.to_string(),
                    if r.value.is_nan() {
                        String::new()
                    } else {
                        r.value.to_string()
                    },
                    r.date_time.clone(),
                    r.series_name.clone(),
                    r.country.clone(),
                    format_timestamp(&r.date_from),
                    format_timestamp(&r.date_to),
                ]
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

fn observation<'a>(cell: impl Fn(&str) -> Option<&'a Value>) -> Result<Observation> {
    Ok(Observation {
        value: number_cell(cell(VALUE)).context(VALUE)?,
        date_time: text_cell(cell(DATE_TIME)),
        series_name: text_cell(cell(SERIES_NAME)),
        country: text_cell(cell(COUNTRY)),
        date_from: timestamp_cell(cell(DATE_FROM)).context(DATE_FROM)?,
        date_to: timestamp_cell(cell(DATE_TO)).context(DATE_TO)?,
    })
}

fn number_cell(v: Option<&Value>) -> Result<f64> {
    match v {
        None | Some(Value::Null) => Ok(f64::NAN),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| anyhow!("{} is not a float", n)),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(f64::NAN),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{:?} is not numeric", s)),
        Some(other) => bail!("expected a number, got {}", kind_of(other)),
    }
}

fn text_cell(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn timestamp_cell(v: Option<&Value>) -> Result<NaiveDateTime> {
    match v {
        Some(Value::String(s)) => parse_timestamp(s),
        Some(Value::Number(n)) => {
            let ms = n
                .as_i64()
                .ok_or_else(|| anyhow!("{} is not an epoch timestamp", n))?;
            timestamp_from_millis(ms)
        }
        None | Some(Value::Null) => bail!("missing timestamp"),
        Some(other) => bail!("expected a timestamp, got {}", kind_of(other)),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn series() -> Series {
        let record: SeriesRecord = serde_json::from_value(json!({
            "uuid": "saa",
            "name": "UK, Seasonally adjusted, Monthly GDP",
            "units": "Count",
            "magnitude": 1,
            "link": "http://localhost/v1/datasets/a/series/saa?token=example-access-token",
            "datetime": {"name": "Month", "range": ["January 1997", "December 2020"]},
            "location": {"type": "Country", "name": "UK"},
            "categories": [
                {"type": "Adjustment", "name": "Seasonally adjusted"},
                {"type": "Total", "name": "Monthly GDP"}
            ]
        }))
        .unwrap();
        let transport = Transport::new("tok", "http://localhost/", "v1").unwrap();
        Series::from_record(record, transport)
    }

    #[test]
    fn categories_tabulate_in_order() {
        let table = series().get_categories();
        assert_eq!(table.types(), vec!["Adjustment", "Total"]);
        assert_eq!(table.names(), vec!["Seasonally adjusted", "Monthly GDP"]);
    }

    #[test]
    fn equality_ignores_transport() {
        let a = series();
        let mut b = series();
        b.transport = Transport::new("other", "http://elsewhere/", "v2").unwrap();
        assert_eq!(a, b);
        b.units = "Index".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn column_payload_keeps_period_order() {
        let payload = json!({
            "Value": {"1997 FEB": "101.5", "1997 JAN": 100},
            "DateTime": {"1997 FEB": "February 1997", "1997 JAN": "January 1997"},
            "SeriesName": {"1997 FEB": "GDP", "1997 JAN": "GDP"},
            "Country": {"1997 FEB": "UK", "1997 JAN": "UK"},
            "DateFrom": {"1997 FEB": "1997-02-01", "1997 JAN": 852076800000i64},
            "DateTo": {"1997 FEB": "1997-02-28", "1997 JAN": "1997-01-31"}
        });
        let data = SeriesData::from_payload(&payload).unwrap();
        assert_eq!(data.index(), ["1997 FEB", "1997 JAN"]);
        assert_eq!(data.values(), vec![101.5, 100.0]);
        assert_eq!(data.rows()[1].date_from, midnight(1997, 1, 1));
        assert_eq!(data.rows()[0].date_to, midnight(1997, 2, 28));
        assert_eq!(data.rows()[0].date_time, "February 1997");
    }

    #[test]
    fn record_payload_uses_period_or_position() {
        let payload = json!([
            {"Period": "1997 JAN", "Value": null, "DateTime": "January 1997", "SeriesName": "GDP",
             "Country": "UK", "DateFrom": "1997-01-01", "DateTo": "1997-01-31"},
            {"Value": 2.5, "DateTime": {"month": 2}, "SeriesName": "GDP",
             "Country": "UK", "DateFrom": "1997-02-01T00:00:00", "DateTo": "1997-02-28 00:00:00"}
        ]);
        let data = SeriesData::from_payload(&payload).unwrap();
        assert_eq!(data.index(), ["1997 JAN", "1"]);
        assert!(data.rows()[0].value.is_nan());
        assert_eq!(data.rows()[1].value, 2.5);
        assert_eq!(data.rows()[1].date_time, r#"{"month":2}"#);
    }

    #[test]
    fn missing_timestamp_is_an_error() {
        let payload = json!([{"Value": 1.0, "DateFrom": "1997-01-01"}]);
        let err = SeriesData::from_payload(&payload).unwrap_err();
        assert!(format!("{:#}", err).contains("DateTo"));
    }

    #[test]
    fn scalar_payload_is_rejected() {
        assert!(SeriesData::from_payload(&json!("nope")).is_err());
    }

    #[test]
    fn empty_object_is_empty_data() {
        let data = SeriesData::from_payload(&json!({})).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn csv_leaves_missing_values_blank() {
        let payload = json!([
            {"Period": "1997 JAN", "Value": null, "DateTime": "January 1997", "SeriesName": "GDP",
             "Country": "UK", "DateFrom": "1997-01-01", "DateTo": "1997-01-31"}
        ]);
        let csv = SeriesData::from_payload(&payload)
            .unwrap()
            .to_csv_string()
            .unwrap();
        assert_eq!(
            csv,
            "Period,Value,DateTime,SeriesName,Country,DateFrom,DateTo\n\
             1997 JAN,,January 1997,GDP,UK,1997-01-01 00:00:00,1997-01-31 00:00:00\n"
        );
    }
}
