//! `blobread read <container/name>` – stream a byte range to a file or stdout.

use anyhow::{Context, Result};
use blobread_core::checksum;
use blobread_core::config::BlobReadConfig;
use blobread_core::transport::{BlobStoreClient, FsBlobStore, HttpBlobStore};
use blobread_core::{BlobLocator, ByteRange, RangeStream};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug)]
pub struct ReadArgs {
    pub blob: BlobLocator,
    pub start: u64,
    pub length: Option<i64>,
    pub out: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub sha256: bool,
}

/// Where blobs come from, after flags override config.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Source {
    Http(String),
    Fs(PathBuf),
}

pub(crate) fn choose_source(cfg: &BlobReadConfig, args: &ReadArgs) -> Result<Source> {
    if let Some(url) = &args.endpoint {
        return Ok(Source::Http(url.clone()));
    }
    if let Some(root) = &args.root {
        return Ok(Source::Fs(root.clone()));
    }
    if let Some(url) = &cfg.endpoint {
        return Ok(Source::Http(url.clone()));
    }
    if let Some(root) = &cfg.root {
        return Ok(Source::Fs(root.clone()));
    }
    anyhow::bail!("no blob store: pass --endpoint or --root, or set one in the config file")
}

pub(crate) fn byte_range(args: &ReadArgs) -> ByteRange {
    match args.length {
        Some(len) => ByteRange::from_signed(args.start, len),
        None => ByteRange::unbounded(args.start),
    }
}

pub fn run_read(cfg: &BlobReadConfig, args: ReadArgs) -> Result<()> {
    let range = byte_range(&args);
    match choose_source(cfg, &args)? {
        Source::Http(url) => {
            let store = HttpBlobStore::from_config(&url, cfg)
                .with_context(|| format!("invalid endpoint {}", url))?;
            copy_range(&store, &args, range)
        }
        Source::Fs(root) => {
            let store = FsBlobStore::new(root, cfg.transport.max_attempts);
            copy_range(&store, &args, range)
        }
    }
}

fn copy_range<C: BlobStoreClient>(client: &C, args: &ReadArgs, range: ByteRange) -> Result<()> {
    let mut stream = RangeStream::open(client, args.blob.clone(), range)
        .with_context(|| format!("open {}", args.blob))?;

    let mut writer: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let copied = checksum::copy_with_sha256(&mut stream, &mut writer);
    stream.close();
    let (bytes, digest) = copied.with_context(|| format!("read {}", args.blob))?;
    writer.flush()?;

    tracing::info!(
        blob = %args.blob,
        bytes,
        attempts = stream.attempt(),
        "range read complete"
    );
    if args.sha256 {
        match &args.out {
            Some(path) => println!("{}  {}", digest, path.display()),
            None => eprintln!("{}  -", digest),
        }
    }
    Ok(())
}
