//! # customer_dashboard
//!
//! Filtering and aggregation core of the customer purchase dashboard.
//!
//! A [`data::model::Dataset`] is loaded once, narrowed by a
//! [`data::filter::FilterSelection`] and summarised into a
//! [`pipeline::DashboardReport`], which is handed to any
//! [`pipeline::RenderSurface`].
//!
//! ```no_run
//! use customer_dashboard::config::DashboardConfig;
//! use customer_dashboard::data::{filter, loader};
//! use customer_dashboard::pipeline::{self, LogSurface};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = loader::load_file(Path::new("customers.csv"))?;
//!     let selection = filter::init_selection(&dataset);
//!     let mut surface = LogSurface::default();
//!     pipeline::refresh(&dataset, &selection, &DashboardConfig::default(), &mut surface);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
