//! Writing unpacked matrices to Parquet or CSV

use std::fs::File;
use std::path::Path;

use itertools::Itertools;
use ndarray::Axis;
use polars::prelude::*;
use polars_io::prelude::ParquetWriter;
use tracing::info;

use crate::error::{UnpackError, UnpackResult};
use crate::types::{Timestamp, TimestampMatrix};

/// One `Float64` column per pixel (`pixel_000` ...), one row per
/// (cycle, slot). Empty slots become nulls unless `keep_sentinel` is set.
pub fn matrix_to_dataframe(
    matrix: &TimestampMatrix,
    keep_sentinel: bool,
) -> UnpackResult<DataFrame> {
    let columns: Vec<Column> = matrix
        .as_array()
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(pixel, row)| {
            let name = format!("pixel_{pixel:03}");
            if keep_sentinel {
                Series::new(name.into(), row.to_vec()).into()
            } else {
                let values = row
                    .iter()
                    .map(|&v| Timestamp::from_sentinel(v).ps())
                    .collect_vec();
                Series::new(name.into(), values).into()
            }
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Writes `matrix` to `path`, choosing the format from the extension
pub fn write_matrix(
    path: impl AsRef<Path>,
    matrix: &TimestampMatrix,
    keep_sentinel: bool,
) -> UnpackResult<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let mut df = matrix_to_dataframe(matrix, keep_sentinel)?;
    match extension.as_deref() {
        Some("parquet") => {
            let mut file = File::create(path)?;
            ParquetWriter::new(&mut file).finish(&mut df)?;
        }
        Some("csv") => {
            let mut file = File::create(path)?;
            CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        }
        _ => {
            return Err(UnpackError::config(format!(
                "unsupported output format '{}', use .parquet or .csv",
                path.display()
            )));
        }
    }

    info!(path = %path.display(), rows = df.height(), "wrote unpacked matrix");
    Ok(())
}
