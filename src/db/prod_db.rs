use std::env;

use crate::db::laposte::communes_archive::CommunesArchive;
use crate::db::trocvelo::announcements_archive::AnnouncementsArchive;

pub struct ProdDb {}

impl ProdDb {
    pub fn trocvelo_announcements() -> AnnouncementsArchive {
        AnnouncementsArchive {
            base_dir: format!("{}/TrocVelo", archive_root()),
        }
    }

    pub fn laposte_communes() -> CommunesArchive {
        CommunesArchive {
            path: format!("{}/LaPoste/communes_departements.csv", archive_root()),
        }
    }
}

fn archive_root() -> String {
    env::var("ARCHIVE_DIR").unwrap_or_else(|_| "archive".to_string())
}
