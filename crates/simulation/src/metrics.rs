//! Per-step metrics records and the CSV sink.
//!
//! Exactly one record is emitted per timestep and flushed immediately;
//! the row-per-step cadence is part of the output contract, not a
//! performance knob.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use dagwidth_core::SimError;

/// A row type with a fixed CSV header.
pub trait MetricsRecord {
    /// The exact header line, without trailing newline.
    const HEADER: &'static str;

    /// Write one CSV row, without trailing newline.
    fn write_fields(&self, out: &mut dyn Write) -> std::io::Result<()>;
}

/// One tangle-mode row: global width, local-view width statistics, and
/// cumulative message overhead.
#[derive(Debug, Clone, PartialEq)]
pub struct TangleRecord {
    /// Step time.
    pub time: f64,
    /// True DAG width: nodes with zero children in the full graph.
    pub global_tips: usize,
    /// Mean local tip count across processes.
    pub avg_local_tips: f64,
    /// Smallest local tip count.
    pub min_local_tips: usize,
    /// Largest local tip count.
    pub max_local_tips: usize,
    /// Total nodes, genesis included.
    pub total_nodes: usize,
    /// `global_tips / total_nodes`, 0 if the graph were empty.
    pub tip_ratio: f64,
    /// Broadcast events scheduled since run start.
    pub messages_sent: u64,
}

impl MetricsRecord for TangleRecord {
    const HEADER: &'static str =
        "time,global_tips,avg_local_tips,min_local_tips,max_local_tips,total_nodes,tip_ratio,messages_sent";

    fn write_fields(&self, out: &mut dyn Write) -> std::io::Result<()> {
        write!(
            out,
            "{},{},{},{},{},{},{},{}",
            self.time,
            self.global_tips,
            self.avg_local_tips,
            self.min_local_tips,
            self.max_local_tips,
            self.total_nodes,
            self.tip_ratio,
            self.messages_sent
        )
    }
}

/// One witness-mode row: global leaf count only; the bounded-width scheme
/// has no local-leaf notion.
#[derive(Debug, Clone, PartialEq)]
pub struct WitnessRecord {
    /// Step time.
    pub time: f64,
    /// Nodes with zero children in the full graph.
    pub global_leaves: usize,
    /// Total nodes, genesis included.
    pub total_nodes: usize,
}

impl MetricsRecord for WitnessRecord {
    const HEADER: &'static str = "time,global_leaves,total_nodes";

    fn write_fields(&self, out: &mut dyn Write) -> std::io::Result<()> {
        write!(out, "{},{},{}", self.time, self.global_leaves, self.total_nodes)
    }
}

/// CSV sink that writes the header on creation and one flushed row per
/// record.
#[derive(Debug)]
pub struct MetricsWriter<W: Write> {
    out: W,
}

impl MetricsWriter<BufWriter<File>> {
    /// Open `path` for writing. Failure here is a fatal setup error: the
    /// run aborts before producing any output.
    pub fn create<R: MetricsRecord>(path: &Path) -> Result<Self, SimError> {
        let file = File::create(path).map_err(|source| SimError::OutputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new::<R>(BufWriter::new(file))
    }
}

impl<W: Write> MetricsWriter<W> {
    /// Wrap an arbitrary writer (tests use `Vec<u8>`) and emit the header.
    pub fn new<R: MetricsRecord>(mut out: W) -> Result<Self, SimError> {
        writeln!(out, "{}", R::HEADER)?;
        out.flush()?;
        Ok(Self { out })
    }

    /// Append one row and flush.
    pub fn write_record<R: MetricsRecord>(&mut self, record: &R) -> Result<(), SimError> {
        record.write_fields(&mut self.out)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
