//! Byte transports the parser reads from and the formatter can write to.

use std::borrow::Cow;
use std::io::{self, Read, Write};
use tracing::{trace, warn};

/// A byte source and sink shared by the parser and a transport.
pub trait Stream {
    /// Bulk read; returns the number of bytes copied into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, buf: &[u8]) -> io::Result<()>;

    /// True once no further byte can be read. May block on a live transport.
    fn at_eof(&mut self) -> bool;

    /// Next byte, or `None` at end of input.
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8];
        match self.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    /// Called once after every top-level parse attempt, successful or not.
    fn resync(&mut self) {}

    fn write_sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Stream + ?Sized> Stream for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write(buf)
    }
    fn at_eof(&mut self) -> bool {
        (**self).at_eof()
    }
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
    fn resync(&mut self) {
        (**self).resync()
    }
    fn write_sync(&mut self) -> io::Result<()> {
        (**self).write_sync()
    }
}

/// In-memory stream. Reads walk the buffer from the front; writes append.
#[derive(Debug, Clone, Default)]
pub struct MemoryStream<'a> {
    data: Cow<'a, [u8]>,
    pos: usize,
}

impl<'a> MemoryStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            pos: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data.into_owned()
    }
}

impl MemoryStream<'static> {
    pub fn owned(data: Vec<u8>) -> Self {
        Self {
            data: Cow::Owned(data),
            pos: 0,
        }
    }
}

impl Stream for MemoryStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.data.to_mut().extend_from_slice(buf);
        Ok(())
    }

    fn at_eof(&mut self) -> bool {
        self.pos >= self.data.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        let b = self.data.get(self.pos).copied()?;
        self.pos += 1;
        Some(b)
    }
}

const BUFFER_LEN: usize = 1024;

/// Buffered stream over any reader, with an optional writer for replies.
///
/// `IoStream::new(file)` reads a file or stdin; pairing both halves of a
/// `TcpStream` through [`IoStream::duplex`] gives a request/response channel.
pub struct IoStream<R, W = io::Sink> {
    reader: R,
    writer: Option<W>,
    buffer: Box<[u8]>,
    pos: usize,
    filled: usize,
    eof: bool,
    error: Option<io::Error>,
}

impl<R: Read> IoStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_writer(reader, None)
    }
}

impl<R: Read, W: Write> IoStream<R, W> {
    pub fn duplex(reader: R, writer: W) -> Self {
        Self::with_writer(reader, Some(writer))
    }

    fn with_writer(reader: R, writer: Option<W>) -> Self {
        Self {
            reader,
            writer,
            buffer: vec![0; BUFFER_LEN].into_boxed_slice(),
            pos: 0,
            filled: 0,
            eof: false,
            error: None,
        }
    }

    /// The read error that ended input early, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn fill(&mut self) {
        while self.pos == self.filled && !self.eof {
            match self.reader.read(&mut self.buffer) {
                Ok(0) => self.eof = true,
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(error = %e, "read failed, treating as end of input");
                    self.error = Some(e);
                    self.eof = true;
                }
            }
        }
    }
}

impl<R: Read, W: Write> Stream for IoStream<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.filled {
            let n = buf.len().min(self.filled - self.pos);
            buf[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.reader.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stream was opened read-only",
            )),
        }
    }

    fn at_eof(&mut self) -> bool {
        self.fill();
        self.pos == self.filled && self.eof
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.at_eof() {
            return None;
        }
        let b = self.buffer[self.pos];
        self.pos += 1;
        Some(b)
    }

    // Keeps buffered bytes: they belong to the next document.
    fn resync(&mut self) {
        trace!(buffered = self.filled - self.pos, "resync");
        if self.error.is_none() {
            self.eof = false;
        }
    }

    fn write_sync(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}
