use crate::error::{ExperimentError, Result};
use csv::{Writer, WriterBuilder};
use lexis_core::{ResponseRecord, SessionInfo};
use log::info;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination for per-trial records.
pub trait RecordSink {
    fn append(&mut self, record: &ResponseRecord) -> Result<()>;
    /// Flushes and releases the destination. Called once at an exit point.
    fn close(&mut self) -> Result<()>;
}

/// CSV result file: header on creation, one flushed row per trial.
pub struct ResultWriter<W: Write> {
    writer: Writer<W>,
    rows: usize,
}

impl ResultWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| ExperimentError::OutputCreate {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_writer(file)
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn from_writer(mut inner: W) -> Result<Self> {
        // Written verbatim: the column names carry leading spaces.
        writeln!(inner, "{}", ResponseRecord::HEADER.join(","))?;
        inner.flush()?;
        let writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        Ok(Self { writer, rows: 0 })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| ExperimentError::Io(err.into_error()))
    }
}

impl<W: Write> RecordSink for ResultWriter<W> {
    fn append(&mut self, record: &ResponseRecord) -> Result<()> {
        self.writer.write_record(record.fields())?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl RecordSink for Vec<ResponseRecord> {
    fn append(&mut self, record: &ResponseRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Creates `<dir>/<ParticipantID>_<Date>.csv` with its header row.
pub fn create_output(dir: &Path, session: &SessionInfo) -> Result<(PathBuf, ResultWriter<File>)> {
    fs::create_dir_all(dir).map_err(|source| ExperimentError::OutputCreate {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(session.output_file_name());
    let writer = ResultWriter::create(&path)?;
    info!("File created: {}", path.display());
    Ok((path, writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexis_core::{Condition, Response, ResponseKey, Trial};
    use std::time::Duration;
    use tempfile::tempdir;

    const HEADER_LINE: &str =
        "Condition, Target, Word1, Word2, Word3, Answer, CorrectAnswer,RT, IsCorrect, Time";

    fn trial(target: &str) -> Trial {
        Trial {
            condition: Condition::Size,
            condition_label: "size".into(),
            target: target.into(),
            words: ["ant".into(), "bus".into(), "cup, small".into()],
            correct: "2".into(),
        }
    }

    #[test]
    fn header_is_written_on_creation() {
        let writer = ResultWriter::from_writer(Vec::new()).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, format!("{HEADER_LINE}\n"));
    }

    #[test]
    fn rows_are_appended_and_quoted() {
        let mut writer = ResultWriter::from_writer(Vec::new()).unwrap();
        let record = ResponseRecord::new(
            &trial("whale"),
            Response::Pressed {
                key: ResponseKey::Two,
                reaction_time: Duration::from_millis(812),
            },
            Duration::from_millis(95_000),
        );
        writer.append(&record).unwrap();
        assert_eq!(writer.rows(), 1);
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines[1],
            "size,whale,ant,bus,\"cup, small\",2,2,0.812,1,01 : 35.0"
        );
    }

    #[test]
    fn each_row_reaches_disk_immediately() {
        let dir = tempdir().unwrap();
        let session = SessionInfo {
            experiment_name: "x".into(),
            date: "20260101_000000".into(),
            participant_id: "p9".into(),
        };
        let (path, mut writer) = create_output(&dir.path().join("out"), &session).unwrap();
        assert!(path.ends_with("p9_20260101_000000.csv"));
        writer
            .append(&ResponseRecord::new(&trial("a"), Response::TimedOut, Duration::ZERO))
            .unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().nth(1).unwrap().contains(",none,2,NA,0,"));
        drop(writer);
    }
}
