use std::collections::HashSet;

use itertools::Itertools;
use tabled::{builder::Builder, settings::Style};

use crate::merge::MergedRow;

#[derive(Clone, Debug, PartialEq)]
pub struct CommuneStats {
    pub insee_code: String,
    pub commune: String,
    pub department: String,
    pub total_population: f64,
    pub total_unique_users: usize,
    pub total_announcements: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepartmentStats {
    pub department: String,
    pub total_population: f64,
    pub total_unique_users: usize,
    pub total_announcements: usize,
}

/// Aggregate merged rows per commune. Population is the mean of the
/// per-row values, which the reference keeps constant per commune, so
/// the mean just shields against a stray inconsistent row.
pub fn by_commune(rows: &[MergedRow]) -> Vec<CommuneStats> {
    let groups = rows.iter().into_group_map_by(|r| r.insee_code.clone());
    let mut out: Vec<CommuneStats> = groups
        .into_iter()
        .map(|(insee_code, rs)| {
            let users: HashSet<i64> = rs.iter().filter_map(|r| r.user_id).collect();
            CommuneStats {
                insee_code,
                commune: rs[0].commune.clone(),
                department: rs[0].department.clone(),
                total_population: rs.iter().map(|r| r.population).sum::<f64>() / rs.len() as f64,
                total_unique_users: users.len(),
                total_announcements: rs.len(),
            }
        })
        .collect();
    out.sort_by(|a, b| a.insee_code.cmp(&b.insee_code));
    out
}

/// Roll commune aggregates up to department level by summing. Summing
/// per-commune distinct-user counts can count a user once per commune
/// they are active in, a known overcount we accept.
pub fn by_department(communes: &[CommuneStats]) -> Vec<DepartmentStats> {
    let groups = communes
        .iter()
        .into_group_map_by(|c| c.department.clone());
    let mut out: Vec<DepartmentStats> = groups
        .into_iter()
        .map(|(department, cs)| DepartmentStats {
            department,
            total_population: cs.iter().map(|c| c.total_population).sum(),
            total_unique_users: cs.iter().map(|c| c.total_unique_users).sum(),
            total_announcements: cs.iter().map(|c| c.total_announcements).sum(),
        })
        .collect();
    out.sort_by(|a, b| a.department.cmp(&b.department));
    out
}

/// Make an ASCII table from the commune aggregates
pub fn commune_table(data: &[CommuneStats]) -> tabled::Table {
    let mut builder = Builder::new();
    builder.push_record(vec![
        "INSEE Code",
        "Commune",
        "Department",
        "Population",
        "Unique Users",
        "Announcements",
    ]);
    for stats in data {
        builder.push_record(vec![
            stats.insee_code.clone(),
            stats.commune.clone(),
            stats.department.clone(),
            format!("{:.0}", stats.total_population),
            stats.total_unique_users.to_string(),
            stats.total_announcements.to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::empty());
    table
}

/// Make an ASCII table from the department aggregates
pub fn department_table(data: &[DepartmentStats]) -> tabled::Table {
    let mut builder = Builder::new();
    builder.push_record(vec![
        "Department",
        "Population",
        "Unique Users",
        "Announcements",
    ]);
    for stats in data {
        builder.push_record(vec![
            stats.department.clone(),
            format!("{:.0}", stats.total_population),
            stats.total_unique_users.to_string(),
            stats.total_announcements.to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::empty());
    table
}
