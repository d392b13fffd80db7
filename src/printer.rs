use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::channel::PivotChannel;
use crate::distribution::RowDistribution;
use crate::matrix::DenseMatrix;
use crate::timing::TimesSummary;

/// Report file for one engine configuration, e.g. `output_block_bcast`.
pub fn report_path(dir: &str, dist: RowDistribution, chan: PivotChannel) -> PathBuf {
    Path::new(dir).join(format!("output_{}_{}", dist.file_tag(), chan.file_tag()))
}

/// Truncate the configuration's report; later sections append to it.
pub fn start_report(path: &Path) -> io::Result<()> {
    File::create(path)?;
    Ok(())
}

/// Append a titled dump of the first `rows` rows, space-separated decimals,
/// one line per row.
pub fn append_section(
    path: &Path,
    title: &str,
    matrix: &DenseMatrix,
    rows: usize,
) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "\n****{title}****")?;
    for i in 0..rows {
        for v in matrix.row(i) {
            write!(out, "{:.6} ", v)?;
        }
        writeln!(out)?;
    }
    out.flush()
}

/// Root-only run summary on stdout.
pub fn print_summary(label: &str, n: usize, num_pes: usize, summary: &TimesSummary) {
    println!("{label}\tSize\t{n}\tProcesses\t{num_pes}");
    println!(
        "Max times:\tTotal\t{:.6}\tComp\t{:.6}\tComm\t{:.6}",
        summary.max.total, summary.max.computation, summary.max.communication
    );
    println!(
        "Avg times:\tTotal\t{:.6}\tComp\t{:.6}\tComm\t{:.6}",
        summary.avg.total, summary.avg.computation, summary.avg.communication
    );
}
