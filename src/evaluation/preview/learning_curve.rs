use crate::evaluation::Snapshot;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Error, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveFormat {
    Csv,
    Tsv,
    Json,
}

/// Ordered history of evaluation snapshots.
#[derive(Clone, Debug, Default)]
pub struct LearningCurve {
    snapshots: Vec<Snapshot>,
}

impl LearningCurve {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn export(&self, path: &Path, format: CurveFormat) -> Result<(), Error> {
        let mut out = BufWriter::new(File::create(path)?);
        match format {
            CurveFormat::Csv => self.write_delimited(&mut out, ',')?,
            CurveFormat::Tsv => self.write_delimited(&mut out, '\t')?,
            CurveFormat::Json => serde_json::to_writer_pretty(&mut out, &self.snapshots)?,
        }
        out.flush()
    }

    /// One row per snapshot; extra metrics become columns, empty where absent.
    pub fn write_delimited<W: Write>(&self, out: &mut W, sep: char) -> Result<(), Error> {
        let extra_keys: BTreeSet<&str> = self
            .snapshots
            .iter()
            .flat_map(|s| s.extras.keys().map(String::as_str))
            .collect();

        let mut columns = vec!["instances_seen", "accuracy", "kappa", "ram_hours", "seconds"];
        columns.extend(extra_keys.iter().copied());
        writeln!(out, "{}", columns.join(&sep.to_string()))?;

        for s in &self.snapshots {
            let mut row = vec![
                s.instances_seen.to_string(),
                s.accuracy.to_string(),
                s.kappa.to_string(),
                s.ram_hours.to_string(),
                s.seconds.to_string(),
            ];
            row.extend(
                extra_keys
                    .iter()
                    .map(|k| s.extras.get(*k).map(f64::to_string).unwrap_or_default()),
            );
            writeln!(out, "{}", row.join(&sep.to_string()))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a LearningCurve {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
