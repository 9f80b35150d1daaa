use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rsvp_core::TestRecord;

/// `num / den`, shown as a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ratio {
    pub num: usize,
    pub den: usize,
}

impl Ratio {
    fn add(&mut self, hit: bool) {
        self.num += usize::from(hit);
        self.den += 1;
    }

    pub fn percent(&self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f64 / self.den as f64 * 100.0
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}% ({} / {})", self.percent(), self.num, self.den)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryReport {
    pub data_file: String,
    pub accuracy: Ratio,
    /// "yes" to old pictures, by group size, all durations together.
    pub hits_by_n_value: BTreeMap<u8, Ratio>,
    /// "yes" to old pictures, by duration, all group sizes together.
    pub hits_by_duration: BTreeMap<u64, Ratio>,
    /// "yes" to new pictures, by duration.
    pub false_alarms_by_duration: BTreeMap<u64, Ratio>,
}

pub fn analyze(data_file: &str, records: &[TestRecord]) -> SummaryReport {
    let mut report = SummaryReport {
        data_file: data_file.to_string(),
        ..Default::default()
    };

    for r in records {
        report.accuracy.add(r.correct);
        let yes = r.said_yes();
        let hits = report.hits_by_duration.entry(r.duration_ms).or_default();
        let false_alarms = report
            .false_alarms_by_duration
            .entry(r.duration_ms)
            .or_default();
        if r.is_old {
            hits.add(yes);
            if let Some(n) = r.n_value {
                report.hits_by_n_value.entry(n).or_default().add(yes);
            }
        } else {
            false_alarms.add(yes);
        }
    }
    report
}

impl SummaryReport {
    pub fn overall_line(&self) -> String {
        format!("Overall Accuracy: {:.2}%", self.accuracy.percent())
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(40);
        writeln!(f, "--- Experiment 2 Summary Report ---")?;
        writeln!(f, "Data file: {}", self.data_file)?;
        writeln!(f)?;
        writeln!(f, "Overall Accuracy (All Responses): {}", self.accuracy)?;
        writeln!(f, "\n{rule}\n")?;

        writeln!(f, "Hit Rate (% 'Yes' to OLD pictures) by N-Value (All Durations Combined):")?;
        for (n, ratio) in &self.hits_by_n_value {
            writeln!(f, "  N={n} Frames: {ratio}")?;
        }
        writeln!(f, "\n{rule}\n")?;

        writeln!(f, "Hit Rate (% 'Yes' to OLD pictures) by Duration (All N-Values Combined):")?;
        for (dur, ratio) in &self.hits_by_duration {
            writeln!(f, "  {dur} ms: {ratio}")?;
        }
        writeln!(f, "\n{rule}\n")?;

        writeln!(f, "False Alarm Rate (% 'Yes' to NEW pictures) by Duration:")?;
        for (dur, ratio) in &self.false_alarms_by_duration {
            writeln!(f, "  {dur} ms: {ratio}")?;
        }
        write!(f, "\n\n--- End of Report ---")
    }
}

/// `results/run.csv` -> `results/run_summary.txt`
pub fn summary_path(data_file: &Path) -> PathBuf {
    let stem = data_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    data_file.with_file_name(format!("{stem}_summary.txt"))
}

pub fn write_summary(data_file: &Path, report: &SummaryReport) -> Result<PathBuf> {
    let path = summary_path(data_file);
    fs::write(&path, report.to_string())
        .with_context(|| format!("cannot write summary {}", path.display()))?;
    Ok(path)
}
