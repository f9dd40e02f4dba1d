mod chart;
mod workbook;

pub use chart::{BalanceChart, BalanceSeries};
pub use workbook::{build_workbook, write_workbook};

use crate::error::{ScheduleError, ScheduleResult};
use crate::plan::Schedule;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the two output files go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportPaths {
    pub excel: PathBuf,
    pub png: PathBuf,
    /// Create missing parent directories instead of failing.
    pub create_dirs: bool,
}

impl ExportPaths {
    pub fn new(excel: impl Into<PathBuf>, png: impl Into<PathBuf>) -> Self {
        Self {
            excel: excel.into(),
            png: png.into(),
            create_dirs: false,
        }
    }

    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

/// Checks that the directory holding `path` exists, creating it when asked to.
pub fn prepare_output_path(path: &Path, create_dirs: bool) -> ScheduleResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return Ok(()),
    };
    if dir.is_dir() {
        return Ok(());
    }
    if !create_dirs {
        return Err(ScheduleError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    fs::create_dir_all(dir).map_err(|source| ScheduleError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!("created output directory {}", dir.display());
    Ok(())
}

/// Writes the workbook and the balance chart. Both directories are checked before
/// either file is written.
pub fn export_all(schedules: &[Schedule], paths: &ExportPaths) -> ScheduleResult<()> {
    prepare_output_path(&paths.excel, paths.create_dirs)?;
    prepare_output_path(&paths.png, paths.create_dirs)?;

    write_workbook(schedules, &paths.excel)?;
    info!("wrote {} sheets to {}", schedules.len(), paths.excel.display());

    let chart = BalanceChart::from_schedules(schedules);
    chart.render_png(&paths.png)?;
    info!("wrote {} balance series to {}", chart.series.len(), paths.png.display());
    Ok(())
}
