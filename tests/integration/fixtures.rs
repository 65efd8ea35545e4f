//! Shared datasets for the integration tests.

use dupecases::dataset::{read_csv_from, Dataset};
use std::path::{Path, PathBuf};

/// Ten people, three names appearing twice.
pub const PEOPLE_CSV: &str = "\
ID,Name,Age,City
101,John Smith,34,New York
102,Mary Johnson,29,Chicago
103,Robert Brown,45,Boston
104,Linda Davis,52,Seattle
105,John Smith,34,New York
106,James Wilson,41,Denver
107,Patricia Moore,38,Austin
108,Mary Johnson,29,Chicago
109,Michael Taylor,27,Miami
110,Robert Brown,45,Houston
";

pub fn people() -> Dataset {
    read_csv_from(PEOPLE_CSV.as_bytes(), ',').unwrap()
}

pub fn write_people(dir: &Path) -> PathBuf {
    let path = dir.join("people.csv");
    std::fs::write(&path, PEOPLE_CSV).unwrap();
    path
}
