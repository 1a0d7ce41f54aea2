//! File handles: reads and seeks with lazy inflation.

use std::io::{self, Read, SeekFrom};
use std::sync::Arc;

use flate2::read::ZlibDecoder;
use tracing::{debug, trace};

use crate::descriptor::{Metadata, ResourceDescriptor};
use crate::error::{Result, VfsError};
use crate::policy::Encoding;

/// Reads a descriptor's payload without borrowing it, so the inflater can be
/// owned by the handle.
struct PayloadReader {
    resource: Arc<ResourceDescriptor>,
    pos: usize,
}

impl Read for PayloadReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let payload = self.resource.payload();
        let remaining = payload.get(self.pos..).unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// Inflation state for a compressed payload.
struct Inflater {
    decoder: ZlibDecoder<PayloadReader>,
    /// Decoded bytes consumed so far
    position: u64,
}

impl Inflater {
    fn new(resource: Arc<ResourceDescriptor>) -> Self {
        Self {
            decoder: ZlibDecoder::new(PayloadReader { resource, pos: 0 }),
            position: 0,
        }
    }

    /// Discard decoded bytes until `target`.
    fn skip_to(&mut self, target: u64) -> io::Result<()> {
        let wanted = target - self.position;
        if wanted == 0 {
            return Ok(());
        }
        let skipped = io::copy(&mut (&mut self.decoder).take(wanted), &mut io::sink())?;
        self.position += skipped;
        if skipped < wanted {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compressed stream ended before the recorded size",
            ));
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.decoder.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// An open file.
///
/// Each handle carries its own offset and inflater, so any number of handles
/// can read the same descriptor concurrently.
pub struct FileHandle {
    resource: Arc<ResourceDescriptor>,
    offset: u64,
    inflater: Option<Inflater>,
    closed: bool,
}

impl FileHandle {
    pub fn new(resource: Arc<ResourceDescriptor>) -> Self {
        Self {
            resource,
            offset: 0,
            inflater: None,
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.resource
    }

    pub fn stat(&self) -> Metadata {
        self.resource.metadata()
    }

    /// Current offset in decoded bytes.
    pub fn position(&self) -> u64 {
        self.offset
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read at the current offset. `Ok(0)` means end of file.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        let size = self.resource.size();
        if buf.is_empty() || self.offset >= size {
            return Ok(0);
        }
        let wanted = buf.len().min((size - self.offset) as usize);
        let n = match self.resource.encoding() {
            Encoding::Raw => self.read_raw(&mut buf[..wanted]),
            Encoding::Compressed => self.read_compressed(&mut buf[..wanted])?,
        };
        self.offset += n as u64;
        Ok(n)
    }

    fn read_raw(&self, buf: &mut [u8]) -> usize {
        let payload = self.resource.payload();
        let remaining = usize::try_from(self.offset)
            .ok()
            .and_then(|start| payload.get(start..))
            .unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        n
    }

    fn read_compressed(&mut self, buf: &mut [u8]) -> Result<usize> {
        let target = self.offset;
        let inflater = match self.inflater.take() {
            Some(inflater) if inflater.position <= target => inflater,
            stale => {
                if let Some(stale) = stale {
                    debug!(
                        file = %self.resource.original_path(),
                        from = stale.position,
                        to = target,
                        "replaying compressed stream for backward seek"
                    );
                } else {
                    trace!(file = %self.resource.original_path(), "creating inflater");
                }
                Inflater::new(Arc::clone(&self.resource))
            }
        };
        let inflater = self.inflater.insert(inflater);

        let result = inflater.skip_to(target).and_then(|()| inflater.read(buf));
        match result {
            Ok(0) => Err(self.decode_failure(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compressed stream ended before the recorded size",
            ))),
            Ok(n) => Ok(n),
            Err(err) => Err(self.decode_failure(err)),
        }
    }

    fn decode_failure(&mut self, source: io::Error) -> VfsError {
        self.inflater = None;
        VfsError::DecodeFailure {
            path: self.resource.original_path().to_string(),
            source,
        }
    }

    /// Move the offset. `End` is relative to the uncompressed size; negative
    /// results clamp to zero.
    ///
    /// Compressed files support arbitrary seeks: moving backwards replays the
    /// stream from the start on the next read.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.ensure_open()?;
        let target: i128 = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.offset as i128 + delta as i128,
            SeekFrom::End(delta) => self.resource.size() as i128 + delta as i128,
        };
        let target = u64::try_from(target.max(0)).map_err(|_| VfsError::InvalidSeek {
            path: self.resource.original_path().to_string(),
            reason: format!("offset {} is out of range", target),
        })?;
        self.offset = target;
        Ok(target)
    }

    /// Release the inflater. Closing twice is fine.
    pub fn close(&mut self) {
        self.inflater = None;
        self.closed = true;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(VfsError::Closed {
                path: self.resource.original_path().to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("resource", &self.resource)
            .field("offset", &self.offset)
            .field("inflating", &self.inflater.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}

impl io::Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        FileHandle::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        FileHandle::seek(self, pos).map_err(io::Error::from)
    }
}
