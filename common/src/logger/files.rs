//! Daily log files.
//!
//! One file per local calendar day, named `YYYYMMDD_log.txt`, appended to on
//! every write. Old days are removed by [`prune_old_logs`], which the
//! scheduler calls on its heartbeat cadence.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Days, Local, NaiveDate};
use tracing_subscriber::fmt::MakeWriter;

pub const LOG_FILE_SUFFIX: &str = "_log.txt";

pub fn log_file_name(day: NaiveDate) -> String {
    format!("{}{}", day.format("%Y%m%d"), LOG_FILE_SUFFIX)
}

/// `MakeWriter` that resolves the target file from the current local date
/// on every event, so the file rolls over at midnight without a restart.
#[derive(Clone, Debug)]
pub struct DailyLogFile {
    dir: PathBuf,
}

impl DailyLogFile {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn open_today(&self) -> io::Result<File> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(log_file_name(Local::now().date_naive()));
        OpenOptions::new().create(true).append(true).open(path)
    }
}

/// Falls back to a sink when the file cannot be opened; stdout still gets
/// the line.
pub enum LogFileWriter {
    File(File),
    Sink(io::Sink),
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogFileWriter::File(f) => f.write(buf),
            LogFileWriter::Sink(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogFileWriter::File(f) => f.flush(),
            LogFileWriter::Sink(s) => s.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for DailyLogFile {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self.open_today() {
            Ok(f) => LogFileWriter::File(f),
            Err(_) => LogFileWriter::Sink(io::sink()),
        }
    }
}

/// Deletes daily log files that are `keep_days` or more days old, keeping
/// today and the `keep_days - 1` days before it.
pub fn prune_old_logs(dir: &Path, keep_days: u64) -> io::Result<usize> {
    let today = Local::now().date_naive();
    let cutoff = today
        .checked_sub_days(Days::new(keep_days))
        .unwrap_or(NaiveDate::MIN);
    prune_logs_before(dir, cutoff)
}

/// Deletes every `YYYYMMDD_log.txt` in `dir` dated on or before `cutoff`.
/// Files that do not follow the naming scheme are left alone. A missing
/// directory counts as nothing to prune.
pub fn prune_logs_before(dir: &Path, cutoff: NaiveDate) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(stamp) = name.to_str().and_then(|n| n.strip_suffix(LOG_FILE_SUFFIX)) else {
            continue;
        };
        let Ok(day) = NaiveDate::parse_from_str(stamp, "%Y%m%d") else {
            continue;
        };

        if day <= cutoff {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn file_name_uses_compact_date() {
        assert_eq!(log_file_name(day(2024, 3, 7)), "20240307_log.txt");
    }

    #[test]
    fn prunes_only_dated_files_on_or_before_cutoff() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "20240301_log.txt");
        touch(tmp.path(), "20240304_log.txt");
        touch(tmp.path(), "20240305_log.txt");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "garbage_log.txt");

        let removed = prune_logs_before(tmp.path(), day(2024, 3, 4)).unwrap();

        assert_eq!(removed, 2);
        assert!(!tmp.path().join("20240301_log.txt").exists());
        assert!(!tmp.path().join("20240304_log.txt").exists());
        assert!(tmp.path().join("20240305_log.txt").exists());
        assert!(tmp.path().join("notes.txt").exists());
        assert!(tmp.path().join("garbage_log.txt").exists());
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let removed = prune_logs_before(&tmp.path().join("nope"), day(2024, 1, 1)).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn keeps_todays_file() {
        let tmp = TempDir::new().unwrap();
        let today = Local::now().date_naive();
        touch(tmp.path(), &log_file_name(today));
        touch(
            tmp.path(),
            &log_file_name(today.checked_sub_days(Days::new(3)).unwrap()),
        );

        let removed = prune_old_logs(tmp.path(), 3).unwrap();

        assert_eq!(removed, 1);
        assert!(tmp.path().join(log_file_name(today)).exists());
    }

    #[test]
    fn writer_appends_to_todays_file() {
        let tmp = TempDir::new().unwrap();
        let make = DailyLogFile::new(tmp.path().join("logs"));

        make.make_writer().write_all(b"first\n").unwrap();
        make.make_writer().write_all(b"second\n").unwrap();

        let path = tmp
            .path()
            .join("logs")
            .join(log_file_name(Local::now().date_naive()));
        assert_eq!(fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }
}
