use flate2::read::GzDecoder;
use gzp::{deflate::Gzip, Compression, GzpError, ZBuilder, ZWriter};
use log::warn;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::fs::is_bgzipped;

const READ_BUFFER_CAPACITY: usize = 256 * 1024;

enum Sink {
    Plain(Box<dyn Write + Send>),
    Compressed(Box<dyn ZWriter>),
    Finished,
}

/// Table output, plain or gzip-compressed.
///
/// [`OutputWriter::finish`] must be called once everything is written; only
/// then are buffered bytes and the gzip trailer known to have reached the sink.
pub struct OutputWriter {
    sink: Sink,
}

impl OutputWriter {
    pub fn plain(writer: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Sink::Plain(writer),
        }
    }

    /// Compress into `writer` with gzp; more than one thread uses the parallel encoder.
    pub fn gzip(writer: Box<dyn Write + Send>, threads: usize, compression_level: u32) -> Self {
        let compressed = ZBuilder::<Gzip, _>::new()
            .num_threads(threads.max(1))
            .compression_level(Compression::new(compression_level))
            .from_writer(writer);
        Self {
            sink: Sink::Compressed(compressed),
        }
    }

    /// Flush everything, write the gzip trailer and report any failure on the way.
    pub fn finish(mut self) -> io::Result<()> {
        self.close()
    }

    fn close(&mut self) -> io::Result<()> {
        match std::mem::replace(&mut self.sink, Sink::Finished) {
            Sink::Plain(mut writer) => writer.flush(),
            Sink::Compressed(mut writer) => match writer.finish() {
                Ok(()) => Ok(()),
                Err(err) => {
                    // a failed gzp encoder panics when dropped
                    std::mem::forget(writer);
                    Err(into_io_error(err))
                }
            },
            Sink::Finished => Ok(()),
        }
    }
}

fn finished_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "write after the output was finished")
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.sink {
            Sink::Plain(writer) => writer.write(buf),
            Sink::Compressed(writer) => writer.write(buf),
            Sink::Finished => Err(finished_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::Plain(writer) => writer.flush(),
            Sink::Compressed(writer) => writer.flush(),
            Sink::Finished => Err(finished_error()),
        }
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("Output closed without finishing: {}", err);
        }
    }
}

fn into_io_error(err: GzpError) -> io::Error {
    match err {
        GzpError::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

/// Build a writer targeting a file or stdout (`None` or `-`), gzip-compressing
/// when `gzipped` is set.
pub fn get_writer<P: AsRef<Path>>(
    path: &Option<P>,
    gzipped: bool,
    threads: usize,
    compression_level: u32,
) -> io::Result<OutputWriter> {
    let to_file = match path {
        Some(path) if path.as_ref().as_os_str() != "-" => Some(File::create(path)?),
        _ => None,
    };

    if gzipped {
        // the encoders buffer on their own
        let raw: Box<dyn Write + Send> = match to_file {
            Some(file) => Box::new(file),
            None => Box::new(io::stdout()),
        };
        Ok(OutputWriter::gzip(raw, threads, compression_level))
    } else {
        let raw: Box<dyn Write + Send> = match to_file {
            Some(file) => Box::new(BufWriter::new(file)),
            None => Box::new(BufWriter::new(io::stdout())),
        };
        Ok(OutputWriter::plain(raw))
    }
}

/// Writer for a table path, compressed when the path carries a gzip extension.
pub fn table_writer<P: AsRef<Path>>(path: P, threads: usize) -> io::Result<OutputWriter> {
    let path = path.as_ref();
    let gzipped = path.as_os_str() != "-" && is_bgzipped(path);
    get_writer(&Some(path), gzipped, threads, 6)
}

/// Open a possibly gzipped text file for line-oriented reading.
pub fn get_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if is_bgzipped(path) {
        Ok(Box::new(BufReader::with_capacity(
            READ_BUFFER_CAPACITY,
            GzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, file)))
    }
}
