use std::{error::Error, path::Path, thread, time::Duration};

use clap::Parser;
use jiff::Zoned;
use log::{error, info, warn};
use velotrack::db::prod_db::ProdDb;
use velotrack::db::trocvelo::announcements_archive::{Announcement, Baseline, ReconcileOutcome};
use velotrack::db::trocvelo::lib_api::TrocVeloClient;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,
    /// Number of API pages to request
    #[arg(long, default_value_t = 34)]
    pages: usize,
    /// Pause between page requests, to not overwhelm the server
    #[arg(long, default_value_t = 2)]
    delay_secs: u64,
    /// Persist the full unfiltered baseline after every page
    #[arg(long)]
    checkpoint: bool,
}

/// Run this job every day, early morning
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
    let mut baseline = Baseline::from_rows(archive.read_baseline()?);
    info!("loaded baseline with {} announcements", baseline.len());

    let client = TrocVeloClient::new()?;
    let today = Zoned::now().date().to_string();

    let mut inserted = 0;
    let mut updated = 0;
    let mut unchanged = 0;
    let mut skipped = 0;
    for page in 1..=args.pages {
        match client.fetch_page(page) {
            Ok(items) => {
                info!("page {}: {} announcements", page, items.len());
                for item in &items {
                    match Announcement::from_json(item, &today, client.base_url()) {
                        Ok(announcement) => match baseline.reconcile(announcement) {
                            ReconcileOutcome::Inserted => inserted += 1,
                            ReconcileOutcome::Updated => updated += 1,
                            ReconcileOutcome::Unchanged => unchanged += 1,
                        },
                        Err(e) => {
                            warn!("skipping one record on page {}: {}", page, e);
                            skipped += 1;
                        }
                    }
                }
                if args.checkpoint {
                    archive.write_checkpoint(baseline.rows())?;
                }
            }
            Err(e) => error!("skipping page {}: {}", page, e),
        }
        thread::sleep(Duration::from_secs(args.delay_secs));
    }
    info!(
        "{} inserted, {} updated, {} unchanged, {} records skipped",
        inserted, updated, unchanged, skipped
    );

    // Only announcements located in France go into the published file
    let france = baseline.country_rows("France");
    archive.write_baseline(&france)?;
    info!(
        "wrote {} announcements to {}",
        france.len(),
        archive.filename()
    );

    Ok(())
}
