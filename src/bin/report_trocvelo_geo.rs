use std::{error::Error, path::Path};

use clap::Parser;
use log::info;
use velotrack::db::prod_db::ProdDb;
use velotrack::merge::{merge_announcements, write_merged};
use velotrack::stats::{by_commune, by_department, commune_table, department_table};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,
}

/// Run this job after update_trocvelo_announcements
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let env_file = format!(".env/{}.env", args.env);
    if Path::new(&env_file).exists() {
        dotenvy::from_path(Path::new(&env_file))?;
    }

    let archive = ProdDb::trocvelo_announcements();
    let announcements = archive.read_baseline()?;
    info!("loaded {} announcements", announcements.len());

    let communes = ProdDb::laposte_communes().read_file()?;
    info!("loaded {} commune/postal-code pairs", communes.len());

    let outcome = merge_announcements(&announcements, &communes);
    info!(
        "merged {} announcements, {} had no geographic match",
        outcome.rows.len(),
        outcome.unmatched
    );

    let merged_path = format!("{}/troc_velo_announcements_geo.csv", archive.base_dir);
    write_merged(&merged_path, &outcome.rows)?;
    info!("wrote merged rows to {}", merged_path);

    let communes_stats = by_commune(&outcome.rows);
    let departments = by_department(&communes_stats);

    println!("Announcements by commune:");
    println!("{}", commune_table(&communes_stats));
    println!();
    println!("Announcements by department:");
    println!("{}", department_table(&departments));

    Ok(())
}
