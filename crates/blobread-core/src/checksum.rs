//! SHA-256 over a byte stream, for verifying delivered ranges.

use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};

const BUF_SIZE: usize = 64 * 1024;

/// Copies `reader` to `writer` while hashing. Returns the byte count and the
/// lowercase hex SHA-256 of everything copied.
pub fn copy_with_sha256<R, W>(reader: &mut R, writer: &mut W) -> io::Result<(u64, String)>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok((total, hex::encode(hasher.finalize())))
}
