//! JSON file cache for price series, one file per instrument.

use log::debug;
use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use crate::errors::{Result, StorageError};
use tradelens_core::instruments::InstrumentId;
use tradelens_core::quotes::{PricePoint, SeriesCache};

/// Stores each series at `<root>/<instrument>.json`.
#[derive(Debug, Clone)]
pub struct JsonSeriesCache {
    root: PathBuf,
}

impl JsonSeriesCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache file for an instrument. Path separators in the identifier are
    /// replaced so every instrument maps to a file directly under the root.
    pub fn path_for(&self, instrument: &InstrumentId) -> PathBuf {
        let file_name: String = instrument
            .as_str()
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.root.join(format!("{file_name}.json"))
    }

    fn read(&self, instrument: &InstrumentId) -> Result<Option<Vec<PricePoint>>> {
        let path = self.path_for(instrument);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };
        let series: Vec<PricePoint> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StorageError::json(&path, e))?;
        debug!("Loaded {} points from {}", series.len(), path.display());
        Ok(Some(series))
    }

    /// Writes to a temporary sibling, then renames it over the target.
    fn write(&self, instrument: &InstrumentId, series: &[PricePoint]) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| StorageError::io(&self.root, e))?;
        let path = self.path_for(instrument);
        let tmp = path.with_extension("json.tmp");

        let file = fs::File::create(&tmp).map_err(|e| StorageError::io(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, series).map_err(|e| StorageError::json(&tmp, e))?;
        writer.flush().map_err(|e| StorageError::io(&tmp, e))?;
        drop(writer);

        fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e))?;
        debug!("Saved {} points to {}", series.len(), path.display());
        Ok(())
    }
}

impl SeriesCache for JsonSeriesCache {
    fn load_series(
        &self,
        instrument: &InstrumentId,
    ) -> tradelens_core::Result<Option<Vec<PricePoint>>> {
        Ok(self.read(instrument)?)
    }

    fn save_series(
        &self,
        instrument: &InstrumentId,
        series: &[PricePoint],
    ) -> tradelens_core::Result<()> {
        Ok(self.write(instrument, series)?)
    }
}
