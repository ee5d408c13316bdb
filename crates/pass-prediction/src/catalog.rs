//! Element-set files.

use std::path::Path;

use orbital_mechanics::{tle, Satellite};
use tracing::info;

use crate::error::{PassError, Result};

/// Read a two- or three-line element file into satellites.
pub fn load_satellites(path: impl AsRef<Path>) -> Result<Vec<Satellite>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| PassError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let satellites: Vec<Satellite> = tle::parse_catalog(&text)?
        .into_iter()
        .map(Satellite::new)
        .collect();
    info!(path = %path.display(), count = satellites.len(), "loaded element sets");
    Ok(satellites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = "ISS (ZARYA)
1 25544U 98067A   19343.69339541  .00001764  00000-0  38792-4 0  9991
2 25544  51.6439 211.2001 0007417  17.6667  85.6398 15.50103472202482
";

    #[test]
    fn test_load_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();
        let satellites = load_satellites(file.path()).unwrap();
        assert_eq!(satellites.len(), 1);
        assert_eq!(satellites[0].name(), "ISS (ZARYA)");
        assert_eq!(satellites[0].catalog_number(), 25544);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            load_satellites("/nonexistent/catalog.txt"),
            Err(PassError::Io { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.replace("2 25544", "2 2554X").as_bytes()).unwrap();
        assert!(matches!(
            load_satellites(file.path()),
            Err(PassError::Orbital(_))
        ));
    }
}
