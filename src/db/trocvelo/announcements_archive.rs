use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use jiff::Timestamp;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One troc-velo announcement. Field order matches the column order of
/// the historical baseline CSV.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub title: String,
    /// In euros. The API reports centimes.
    pub price: f64,
    pub postcode: String,
    pub city: String,
    pub country: String,
    pub brand: Option<i64>,
    pub id: i64,
    pub user_id: Option<i64>,
    pub publish_date: String,
    pub update_date: String,
    pub date_pulled: String,
    pub url_pulled: String,
}

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error("missing or non-numeric '{0}' field")]
    MissingNumeric(&'static str),
}

impl Announcement {
    /// Coerce one raw API object into an announcement. Missing string
    /// fields become "N/A", missing optional numbers become None. A
    /// record without a usable `id` or `price` fails on its own,
    /// without taking the page down with it.
    pub fn from_json(
        announce: &Value,
        date_pulled: &str,
        url_pulled: &str,
    ) -> Result<Announcement, RecordError> {
        let user = announce.get("user");
        let country = user.and_then(|u| u.get("country"));

        let id = announce
            .get("id")
            .and_then(Value::as_i64)
            .ok_or(RecordError::MissingNumeric("id"))?;
        let price = announce
            .get("price")
            .and_then(Value::as_f64)
            .ok_or(RecordError::MissingNumeric("price"))?
            / 100.0;

        Ok(Announcement {
            title: str_or_na(announce.get("title")),
            price,
            postcode: str_or_na(user.and_then(|u| u.get("postcode"))),
            city: str_or_na(user.and_then(|u| u.get("city"))),
            country: str_or_na(country.and_then(|c| c.get("name"))),
            brand: announce.get("brand").and_then(Value::as_i64),
            id,
            user_id: user.and_then(|u| u.get("id")).and_then(Value::as_i64),
            publish_date: str_or_na(announce.get("publishAt")),
            update_date: str_or_na(announce.get("updatedAt")),
            date_pulled: date_pulled.to_string(),
            url_pulled: url_pulled.to_string(),
        })
    }
}

fn str_or_na(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// The accumulated, deduplicated announcements table, carried across
/// runs. Keeps row order stable so updates overwrite in place.
#[derive(Default)]
pub struct Baseline {
    rows: Vec<Announcement>,
    index: HashMap<i64, usize>,
}

impl Baseline {
    pub fn new() -> Baseline {
        Baseline::default()
    }

    /// Replaying rows through reconcile deduplicates a baseline file
    /// that somehow acquired duplicate ids, keeping the freshest row.
    pub fn from_rows(rows: Vec<Announcement>) -> Baseline {
        let mut baseline = Baseline::new();
        for row in rows {
            baseline.reconcile(row);
        }
        baseline
    }

    pub fn rows(&self) -> &[Announcement] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Insert the incoming announcement if its id is unseen, overwrite
    /// the stored row in place if the incoming `update_date` is newer,
    /// otherwise leave the baseline alone (stale or duplicate fetch).
    pub fn reconcile(&mut self, incoming: Announcement) -> ReconcileOutcome {
        match self.index.get(&incoming.id) {
            None => {
                self.index.insert(incoming.id, self.rows.len());
                self.rows.push(incoming);
                ReconcileOutcome::Inserted
            }
            Some(&i) => {
                if newer_than(&incoming.update_date, &self.rows[i].update_date) {
                    self.rows[i] = incoming;
                    ReconcileOutcome::Updated
                } else {
                    ReconcileOutcome::Unchanged
                }
            }
        }
    }

    pub fn country_rows(&self, country: &str) -> Vec<Announcement> {
        self.rows
            .iter()
            .filter(|r| r.country == country)
            .cloned()
            .collect()
    }
}

/// Compare two update timestamps. The API emits RFC-3339 strings, so
/// parse and compare as instants; when either side doesn't parse, fall
/// back to the raw string ordering of the historical data.
fn newer_than(incoming: &str, stored: &str) -> bool {
    match (
        incoming.parse::<Timestamp>(),
        stored.parse::<Timestamp>(),
    ) {
        (Ok(a), Ok(b)) => a > b,
        _ => incoming > stored,
    }
}

#[derive(Clone)]
pub struct AnnouncementsArchive {
    pub base_dir: String,
}

impl AnnouncementsArchive {
    /// Path to the published baseline CSV.
    pub fn filename(&self) -> String {
        self.base_dir.to_owned() + "/troc_velo_announcements.csv"
    }

    /// Sidecar file holding the full unfiltered baseline, written after
    /// each page when checkpointing is on.
    pub fn checkpoint_filename(&self) -> String {
        self.base_dir.to_owned() + "/troc_velo_announcements_checkpoint.csv"
    }

    /// Read the stored baseline. A missing file is an empty baseline,
    /// so the very first run doesn't need a seed file.
    pub fn read_baseline(&self) -> Result<Vec<Announcement>, Box<dyn Error>> {
        let path = self.filename();
        if !Path::new(&path).exists() {
            info!("no baseline file at {}, starting empty", path);
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(&path)?;
        let mut out: Vec<Announcement> = Vec::new();
        for result in rdr.deserialize() {
            out.push(result?);
        }
        Ok(out)
    }

    pub fn write_baseline(&self, rows: &[Announcement]) -> Result<(), Box<dyn Error>> {
        write_csv(&self.filename(), rows)
    }

    pub fn write_checkpoint(&self, rows: &[Announcement]) -> Result<(), Box<dyn Error>> {
        write_csv(&self.checkpoint_filename(), rows)
    }
}

fn write_csv(path: &str, rows: &[Announcement]) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = Path::new(path).parent() {
        fs::create_dir_all(dir)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
