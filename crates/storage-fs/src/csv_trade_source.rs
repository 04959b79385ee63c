//! CSV tradebook reader.
//!
//! Reads broker tradebook exports (Zerodha column layout). A location may be
//! a single file or a directory; directories are scanned for `*.csv` files,
//! which are read in file-name order.

use csv::{ReaderBuilder, Trim};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, StorageError};
use tradelens_core::trades::{RawTradeRow, TradeSource};

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvTradeSource;

impl CsvTradeSource {
    pub fn new() -> Self {
        Self
    }

    /// CSV files at `location`, sorted by name.
    pub fn tradebook_files(location: &Path) -> Result<Vec<PathBuf>> {
        if location.is_file() {
            return Ok(vec![location.to_path_buf()]);
        }
        if !location.is_dir() {
            return Err(StorageError::NotADirectory(location.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(location)
            .map_err(|e| StorageError::io(location, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Reads one CSV file. Headers are required; unknown columns are ignored
    /// and missing ones default to empty.
    pub fn read_file(path: &Path) -> Result<Vec<RawTradeRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| StorageError::csv(path, e))?;

        let rows = reader
            .deserialize::<RawTradeRow>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StorageError::csv(path, e))?;
        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    fn read_location(location: &Path) -> Result<Vec<RawTradeRow>> {
        let mut rows = Vec::new();
        for file in Self::tradebook_files(location)? {
            rows.extend(Self::read_file(&file)?);
        }
        Ok(rows)
    }
}

impl TradeSource for CsvTradeSource {
    fn fetch_trade_records(&self, location: &Path) -> tradelens_core::Result<Vec<RawTradeRow>> {
        Ok(Self::read_location(location)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "symbol,isin,trade_date,exchange,segment,series,trade_type,auction,quantity,price,trade_id,order_id,order_execution_time";

    #[test]
    fn test_reads_directory_in_file_name_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("2024.csv"),
            format!("{HEADER}\nTCS,INE467B01029,2024-01-05,NSE,EQ,EQ,buy,false,2.000000,3500.00,T2,O2,2024-01-05T10:00:00\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join("2023.csv"),
            format!("{HEADER}\n INFY , INE009A01021,2023-01-02,NSE,EQ,EQ,buy,false,10,1500.5,T1,O1,2023-01-02T09:30:00\n"),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let rows = CsvTradeSource::new()
            .fetch_trade_records(dir.path())
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "INFY");
        assert_eq!(rows[0].isin, "INE009A01021");
        assert_eq!(rows[0].quantity, "10");
        assert_eq!(rows[1].trade_id, "T2");
        assert_eq!(rows[1].order_execution_time, "2024-01-05T10:00:00");
    }

    #[test]
    fn test_missing_columns_default_to_empty() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("mf.csv");
        fs::write(
            &file,
            "symbol,isin,trade_date,trade_type,quantity,price,trade_id\nAlpha Fund,INF1,2023-01-02,buy,1.5,52.1,M1\n",
        )
        .unwrap();

        let rows = CsvTradeSource::new().fetch_trade_records(&file).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "Alpha Fund");
        assert!(rows[0].exchange.is_empty());
    }

    #[test]
    fn test_missing_location_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let err = CsvTradeSource::new()
            .fetch_trade_records(&dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, tradelens_core::Error::Storage(_)));
    }
}
