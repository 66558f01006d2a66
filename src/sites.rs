use crate::Error;
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Cost table of the "Regional Warehouses" exercise.
pub const DEFAULT_COSTS_URL: &str =
    "https://raw.githubusercontent.com/rbaid-9/Models_Assignment3/main/costs.csv";

/// A candidate warehouse site, identified by its row in the cost table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Paid once if the site is opened.
    #[serde(alias = "Fixed")]
    pub fixed: f64,
    /// Paid per unit stored at the site.
    #[serde(alias = "Variable")]
    pub variable: f64,
}

/// Where the cost table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(raw: &str) -> Source {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Source::Url(raw.to_owned())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Url(DEFAULT_COSTS_URL.to_owned())
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// Load the cost table from a local file or over HTTP(S).
pub fn load_sites(source: &Source) -> Result<Vec<Site>, Error> {
    info!("Loading cost table from {}", source);
    let sites = match source {
        Source::Path(path) => read_sites(File::open(path)?)?,
        Source::Url(url) => {
            let response = reqwest::blocking::get(url)?.error_for_status()?;
            read_sites(response)?
        }
    };
    info!("Loaded {} candidate sites", sites.len());
    Ok(sites)
}

/// Parse a CSV with `Fixed` and `Variable` columns, one row per site.
pub fn read_sites(reader: impl Read) -> Result<Vec<Site>, Error> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut sites = Vec::new();
    for (idx, record) in reader.deserialize().enumerate() {
        let site: Site = record?;
        debug!(
            "site {}: fixed {} variable {}",
            idx + 1,
            site.fixed,
            site.variable
        );
        sites.push(site);
    }

    validate_sites(&sites)?;
    Ok(sites)
}

/// Reject an empty table and any negative or non-finite cost.
pub fn validate_sites(sites: &[Site]) -> Result<(), Error> {
    if sites.is_empty() {
        return Err(Error::EmptyCostTable);
    }
    for (idx, site) in sites.iter().enumerate() {
        check_cost(idx + 1, "fixed", site.fixed)?;
        check_cost(idx + 1, "variable", site.variable)?;
    }
    Ok(())
}

fn check_cost(row: usize, column: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidCost { row, column, value })
    }
}
