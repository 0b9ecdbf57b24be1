//! Per-movie property table backing suggestion scoring
//!
//! Flat CSV with header `label,uri,publication_date,<property...>`;
//! property cells hold pipe-joined value lists. Loaded fully into
//! memory at startup and read-only thereafter.

use chrono::{Datelike, NaiveDate};
use cinegraph_common::errors::{AppError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// One movie row: identifier, label, optional publication year, and
/// the aggregated property-value map.
#[derive(Debug, Clone)]
pub struct MovieRecord {
    pub label: String,
    pub uri: String,
    /// Publication date at year granularity
    pub publication_year: Option<i32>,
    /// Property name -> values, in column order
    pub properties: HashMap<String, Vec<String>>,
}

impl MovieRecord {
    /// Values of one property, empty slice when absent
    pub fn values(&self, property: &str) -> &[String] {
        self.properties
            .get(property)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Descriptive text for indexing: every property value in the
    /// given column order, then the publication year.
    pub fn descriptive_text(&self, property_names: &[String]) -> String {
        let mut parts: Vec<String> = Vec::new();
        for property in property_names {
            parts.extend(self.values(property).iter().cloned());
        }
        if let Some(year) = self.publication_year {
            parts.push(year.to_string());
        }
        parts.join(", ")
    }
}

/// The loaded movie table, keyed by uri
pub struct MovieTable {
    by_uri: HashMap<String, MovieRecord>,
    /// Property column names in header order
    property_names: Vec<String>,
}

impl MovieTable {
    /// Load the table from its CSV file
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.len() < 3 {
            return Err(AppError::MalformedRecord {
                file: path.display().to_string(),
                message: "expected at least label,uri,publication_date columns".to_string(),
            });
        }
        let property_names: Vec<String> =
            headers.iter().skip(3).map(|h| h.to_string()).collect();

        let mut by_uri = HashMap::new();
        for (row_no, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(row = row_no + 1, error = %e, "Skipping unreadable movie row");
                    continue;
                }
            };

            let label = row.get(0).unwrap_or("").trim().to_string();
            let uri = row.get(1).unwrap_or("").trim().to_string();
            if label.is_empty() || uri.is_empty() {
                warn!(row = row_no + 1, "Skipping movie row without label/uri");
                continue;
            }

            let publication_year = row.get(2).and_then(parse_year);

            let mut properties = HashMap::new();
            for (i, name) in property_names.iter().enumerate() {
                let values = row
                    .get(3 + i)
                    .map(split_values)
                    .unwrap_or_default();
                if !values.is_empty() {
                    properties.insert(name.clone(), values);
                }
            }

            by_uri.insert(
                uri.clone(),
                MovieRecord {
                    label,
                    uri,
                    publication_year,
                    properties,
                },
            );
        }

        info!(
            movies = by_uri.len(),
            properties = property_names.len(),
            "Loaded movie property table"
        );
        Ok(Self {
            by_uri,
            property_names,
        })
    }

    /// Build from records directly (tests, fixtures)
    pub fn from_records(records: Vec<MovieRecord>, property_names: Vec<String>) -> Self {
        let by_uri = records.into_iter().map(|r| (r.uri.clone(), r)).collect();
        Self {
            by_uri,
            property_names,
        }
    }

    pub fn record(&self, uri: &str) -> Option<&MovieRecord> {
        self.by_uri.get(uri)
    }

    pub fn property_names(&self) -> &[String] {
        &self.property_names
    }

    pub fn records(&self) -> impl Iterator<Item = &MovieRecord> {
        self.by_uri.values()
    }

    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }
}

/// Split a pipe- or semicolon-joined cell into trimmed values
fn split_values(cell: &str) -> Vec<String> {
    cell.split(['|', ';'])
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a publication date cell down to its year
fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
        return Some(date.year());
    }
    // Year-only or truncated dates
    cell.split('-').next()?.parse().ok()
}
