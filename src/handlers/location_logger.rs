use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::models::error::StorageError;
use crate::models::location_log::LogRecord;

/// Where accepted locations end up. The HTTP layer only talks to this.
#[async_trait]
pub trait LocationSink: Send + Sync {
    async fn append(&self, record: LogRecord) -> Result<PathBuf, StorageError>;
    async fn read_today(&self) -> Result<Option<String>, StorageError>;
}

/// Append-only NDJSON files under `base_dir`, one per host-local calendar day.
#[derive(Debug, Clone)]
pub struct DayLog {
    base_dir: PathBuf,
}

impl DayLog {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for_day(&self, day: NaiveDate) -> PathBuf {
        self.base_dir.join(format!("locations-{}", day.format("%Y%m%d")))
    }

    /// Today's path, without touching the disk.
    pub fn today_path(&self) -> PathBuf {
        self.path_for_day(Local::now().date_naive())
    }

    /// Makes sure today's file exists and returns it. Existing content is
    /// left alone.
    pub async fn path_for_today(&self) -> Result<PathBuf, StorageError> {
        let path = self.today_path();
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| unavailable(&self.base_dir, e))?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| unavailable(&path, e))?;
        Ok(path)
    }

    /// Writes `record` as one line in a single append, then closes the file.
    pub async fn append(&self, record: &LogRecord) -> Result<PathBuf, StorageError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let path = self.path_for_today().await?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .map_err(|e| unavailable(&path, e))?;
        file.write_all(&line).await.map_err(|e| unavailable(&path, e))?;
        file.flush().await.map_err(|e| unavailable(&path, e))?;
        file.sync_data().await.map_err(|e| unavailable(&path, e))?;

        debug!("Appended {} bytes to {}", line.len(), path.display());
        Ok(path)
    }

    /// `None` until something has been written today.
    pub async fn read_today(&self) -> Result<Option<String>, StorageError> {
        let path = self.today_path();
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(&path, e)),
        }
    }
}

fn unavailable(path: &Path, source: io::Error) -> StorageError {
    StorageError::Unavailable {
        path: path.to_path_buf(),
        source,
    }
}

enum LogCommand {
    Append {
        record: LogRecord,
        reply: oneshot::Sender<Result<PathBuf, StorageError>>,
    },
    ReadToday {
        reply: oneshot::Sender<Result<Option<String>, StorageError>>,
    },
}

/// Single writer for the day log. Every append and read goes through its
/// queue, so lines from concurrent requests never interleave.
pub struct LocationLogger {
    log: DayLog,
    rx: mpsc::Receiver<LogCommand>,
}

impl LocationLogger {
    pub fn spawn(log: DayLog) -> LocationLoggerHandle {
        let (tx, rx) = mpsc::channel(1024);
        info!("Starting location logger in {}", log.base_dir().display());
        tokio::spawn(LocationLogger { log, rx }.run_actor());
        LocationLoggerHandle { tx }
    }

    async fn run_actor(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                LogCommand::Append { record, reply } => {
                    reply.send(self.log.append(&record).await).ok();
                }
                LogCommand::ReadToday { reply } => {
                    reply.send(self.log.read_today().await).ok();
                }
            }
        }
        info!("Location logger channel closed");
    }
}

#[derive(Clone)]
pub struct LocationLoggerHandle {
    tx: mpsc::Sender<LogCommand>,
}

#[async_trait]
impl LocationSink for LocationLoggerHandle {
    async fn append(&self, record: LogRecord) -> Result<PathBuf, StorageError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(LogCommand::Append { record, reply })
            .await
            .map_err(|_| StorageError::LoggerClosed)?;
        response.await.map_err(|_| StorageError::LoggerClosed)?
    }

    async fn read_today(&self) -> Result<Option<String>, StorageError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(LogCommand::ReadToday { reply })
            .await
            .map_err(|_| StorageError::LoggerClosed)?;
        response.await.map_err(|_| StorageError::LoggerClosed)?
    }
}
