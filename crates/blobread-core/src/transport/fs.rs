//! Blob store backed by a local directory: `root/<container>/<name>`.
//!
//! Mostly useful for the CLI and tests; local reads never over-fetch, so the
//! chunk size is only tracked, not applied.

use super::{BlobStoreClient, RawChannel, TransportError, DEFAULT_FETCH_CHUNK_SIZE};
use crate::locator::BlobLocator;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    max_attempts: u32,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, max_attempts: u32) -> Self {
        Self {
            root: root.into(),
            max_attempts,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of a blob. Rejects names that would escape the container.
    pub fn blob_path(&self, locator: &BlobLocator) -> Result<PathBuf, TransportError> {
        let rel = Path::new(locator.container()).join(locator.name());
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("blob locator [{}] escapes the store root", locator),
            )));
        }
        Ok(self.root.join(rel))
    }
}

impl BlobStoreClient for FsBlobStore {
    type Channel = FsChannel;

    fn open_read_channel(&self, locator: &BlobLocator) -> Result<FsChannel, TransportError> {
        let path = self.blob_path(locator)?;
        match File::open(&path) {
            Ok(file) => Ok(FsChannel {
                file: Some(file),
                chunk_size: DEFAULT_FETCH_CHUNK_SIZE,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(TransportError::ObjectMissing(path.display().to_string()))
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn max_transport_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[derive(Debug)]
pub struct FsChannel {
    file: Option<File>,
    chunk_size: usize,
}

impl FsChannel {
    pub fn fetch_chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn file(&mut self) -> Result<&mut File, TransportError> {
        self.file.as_mut().ok_or(TransportError::Closed)
    }
}

impl RawChannel for FsChannel {
    fn seek(&mut self, offset: u64) -> Result<(), TransportError> {
        self.file()?.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn set_fetch_chunk_size(&mut self, size: usize) {
        self.chunk_size = if size == 0 {
            DEFAULT_FETCH_CHUNK_SIZE
        } else {
            size
        };
    }

    fn default_fetch_chunk_size(&self) -> usize {
        DEFAULT_FETCH_CHUNK_SIZE
    }

    fn fetch(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let file = self.file()?;
        loop {
            match file.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.file = None;
        Ok(())
    }
}
