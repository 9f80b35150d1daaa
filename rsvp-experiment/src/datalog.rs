use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rsvp_core::TestRecord;

/// CSV data log, one row per tested picture.
pub struct DataLog<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl DataLog<File> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create data folder {}", dir.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("cannot create data file {}", path.display()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> DataLog<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            rows: 0,
        }
    }

    pub fn append(&mut self, record: &TestRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("cannot flush data log: {}", e.error()))
    }
}

pub fn read_records(path: &Path) -> Result<Vec<TestRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open data file {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<TestRecord>, _>>()
        .with_context(|| format!("malformed data file {}", path.display()))
}
