//! A small Rust client for the Lever Open statistical data API.
//!
//! The API is organised as datasets (collections of related series, e.g. a
//! GDP release) and series (one time-indexed numeric sequence each). This
//! crate lists datasets, fetches their series, and turns series observations
//! into tables.
//!
//! ## Quick start
//! - Provide an access token via `LEVEROPEN_ACCESS_TOKEN` or a `.leveropenrc`
//!   file (current directory or home directory), or pass it to [`Lever::new`].
//! - Find a dataset, then fetch the data of its series.
//!
//! ```no_run
//! use anyhow::Result;
//! use leveropen::Lever;
//!
//! fn main() -> Result<()> {
//!     let lever = Lever::from_env()?;
//!     let mut datasets = lever.get_datasets_by_collection("Gross Domestic Product (GDP)")?;
//!     if let Some(dataset) = datasets.first_mut() {
//!         for series in dataset.get_series()? {
//!             let data = series.get_data()?;
//!             println!("{}: {:?}", series.name, data.values());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Remote failures surface as [`ApiError`]; lookups that do not select
//! exactly one series fail with [`LookupError`]. Both can be recovered from
//! an `anyhow::Error` with `downcast_ref`.

#![forbid(unsafe_code)]

mod category;
mod config;
mod dataset;
mod error;
mod lever;
mod series;
mod table;
mod transport;
mod util;

pub use category::{Category, CategoryTable, parse_categories};
pub use config::LeverConfig;
pub use dataset::{Dataset, DatasetMetadata, License, SeriesIndex};
pub use error::{ApiError, FilterFieldError, LookupError};
pub use lever::{DatasetField, Lever};
pub use series::{DateTimeRange, Location, Observation, Series, SeriesData};
pub use table::Tabular;
pub use transport::{Session, Transport};
