use std::error::Error;
use std::fs::File;

use serde::Deserialize;

/// One commune/postal-code pair from the reference table, after
/// exploding multi-code rows. Population comes from the same file.
#[derive(Clone, Debug, PartialEq)]
pub struct CommuneRecord {
    pub postal_code: String,
    pub commune: String,
    pub insee_code: String,
    pub department: String,
    pub population: f64,
}

/// A raw row as stored in the file. One commune may list several
/// postal codes separated by '/'.
#[derive(Debug, Deserialize)]
struct RawRow {
    code_commune_insee: String,
    nom_commune: String,
    code_postal: String,
    code_departement: String,
    population: f64,
}

#[derive(Clone)]
pub struct CommunesArchive {
    pub path: String,
}

impl CommunesArchive {
    /// Read the semicolon-delimited reference file. Rows with several
    /// '/'-separated postal codes are exploded into one record per
    /// code, all other columns duplicated.
    pub fn read_file(&self) -> Result<Vec<CommuneRecord>, Box<dyn Error>> {
        let file = File::open(&self.path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(file);

        let mut out: Vec<CommuneRecord> = Vec::new();
        for result in rdr.deserialize() {
            let raw: RawRow = result?;
            for code in raw.code_postal.split('/') {
                out.push(CommuneRecord {
                    postal_code: code.trim().to_string(),
                    commune: raw.nom_commune.clone(),
                    insee_code: raw.code_commune_insee.clone(),
                    department: raw.code_departement.clone(),
                    population: raw.population,
                });
            }
        }
        Ok(out)
    }
}
