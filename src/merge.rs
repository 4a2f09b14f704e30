use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::db::laposte::communes_archive::CommuneRecord;
use crate::db::trocvelo::announcements_archive::Announcement;
use crate::normalize::normalize_city;

/// An announcement joined with its commune reference row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub user_id: Option<i64>,
    pub postcode: String,
    /// Normalized city name, i.e. the join key.
    pub city: String,
    pub insee_code: String,
    pub commune: String,
    pub department: String,
    pub population: f64,
}

pub struct MergeOutcome {
    pub rows: Vec<MergedRow>,
    /// Announcements with no matching reference row. They are dropped
    /// from the merged output, but callers should log this count.
    pub unmatched: usize,
}

/// Inner join of announcements against the communes reference on
/// (postal code, normalized city name). Both fields are required:
/// neither a postal code nor a commune name is unique on its own.
pub fn merge_announcements(
    announcements: &[Announcement],
    communes: &[CommuneRecord],
) -> MergeOutcome {
    let mut by_key: HashMap<(String, String), &CommuneRecord> = HashMap::new();
    for record in communes {
        by_key
            .entry((record.postal_code.clone(), normalize_city(&record.commune)))
            .or_insert(record);
    }

    let mut rows: Vec<MergedRow> = Vec::new();
    let mut unmatched = 0;
    for a in announcements {
        let key = (a.postcode.trim().to_string(), normalize_city(&a.city));
        match by_key.get(&key) {
            Some(record) => rows.push(MergedRow {
                id: a.id,
                title: a.title.clone(),
                price: a.price,
                user_id: a.user_id,
                postcode: key.0,
                city: key.1,
                insee_code: record.insee_code.clone(),
                commune: record.commune.clone(),
                department: record.department.clone(),
                population: record.population,
            }),
            None => unmatched += 1,
        }
    }
    MergeOutcome { rows, unmatched }
}

/// Write the merged rows as a CSV artifact next to the baseline.
pub fn write_merged(path: &str, rows: &[MergedRow]) -> Result<(), Box<dyn Error>> {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(id: i64, postcode: &str, city: &str) -> Announcement {
        Announcement {
            title: format!("Vélo {}", id),
            price: 450.0,
            postcode: postcode.to_string(),
            city: city.to_string(),
            country: "France".to_string(),
            brand: Some(12),
            id,
            user_id: Some(id * 10),
            publish_date: "2024-05-01T09:00:00+02:00".to_string(),
            update_date: "2024-06-01T10:00:00+02:00".to_string(),
            date_pulled: "2024-06-01".to_string(),
            url_pulled: "https://api.troc-velo.com/api/products".to_string(),
        }
    }

    fn commune(postal_code: &str, name: &str, insee: &str, dept: &str) -> CommuneRecord {
        CommuneRecord {
            postal_code: postal_code.to_string(),
            commune: name.to_string(),
            insee_code: insee.to_string(),
            department: dept.to_string(),
            population: 15000.0,
        }
    }

    #[test]
    fn joins_arrondissement_listing_to_parent_commune() {
        let listings = vec![announcement(1, "75001", "Paris 1er Arrondissement")];
        let geo = vec![commune("75001", "PARIS", "75056", "75")];
        let outcome = merge_announcements(&listings, &geo);
        assert_eq!(outcome.unmatched, 0);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].city, "PARIS");
        assert_eq!(outcome.rows[0].insee_code, "75056");
    }

    #[test]
    fn requires_both_postal_code_and_name_to_match() {
        let listings = vec![
            announcement(1, "69007", "Lyon"),
            // right name, wrong postal code
            announcement(2, "69100", "Lyon"),
            // right postal code, wrong name
            announcement(3, "69007", "Villeurbanne"),
        ];
        let geo = vec![commune("69007", "LYON", "69387", "69")];
        let outcome = merge_announcements(&listings, &geo);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].id, 1);
        assert_eq!(outcome.unmatched, 2);
    }

    #[test]
    fn matches_despite_accents_and_abbreviations() {
        let listings = vec![announcement(1, "42000", "ST ETIENNE")];
        let geo = vec![commune("42000", "Saint-Étienne", "42218", "42")];
        let outcome = merge_announcements(&listings, &geo);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].commune, "Saint-Étienne");
    }

    #[test]
    fn unmatched_listings_are_dropped_but_counted() {
        let listings = vec![
            announcement(1, "75001", "Paris"),
            announcement(2, "99999", "Nowhere"),
        ];
        let geo = vec![commune("75001", "PARIS", "75056", "75")];
        let outcome = merge_announcements(&listings, &geo);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.unmatched, 1);
    }
}
