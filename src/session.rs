//! Point record streams over LAS/LAZ data.

use crate::bounds::Bounds;
use crate::vlr::read_laszip_vlr;
use crate::{Error, Result};
use las::point::Format;
use laz::LazVlr;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Header values the decoder needs, copied out of the container header.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamHeader {
    /// Declared number of point records
    pub point_count: u64,
    /// Per-axis scale factors
    pub scale: [f64; 3],
    /// Per-axis offsets
    pub offset: [f64; 3],
    /// Declared bounds, not validated
    pub bounds: Bounds,
    /// Whether the point data is LASzip compressed
    pub is_compressed: bool,
    /// Point data record format id, without the compression bits
    pub point_format: u8,
    /// Whether the point format carries RGB
    pub has_color: bool,
    /// LAS version as (major, minor)
    pub version: (u8, u8),
}

/// The current point of a stream: fixed-point coordinates and RGB.
///
/// `color` is zero for point formats without color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawPointRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub color: [u16; 3],
}

impl From<&las::raw::Point> for RawPointRecord {
    fn from(point: &las::raw::Point) -> Self {
        let color = point
            .color
            .map(|c| [c.red, c.green, c.blue])
            .unwrap_or_default();
        RawPointRecord {
            x: point.x,
            y: point.y,
            z: point.z,
            color,
        }
    }
}

/// A cursor over the point records of an open point cloud.
pub trait PointStream {
    fn header(&self) -> &StreamHeader;

    /// Decodes the next record into [record](PointStream::record).
    ///
    /// Returns `false` at the end of the stream and on decode errors alike;
    /// [last_error](PointStream::last_error) tells them apart.
    fn advance(&mut self) -> bool;

    /// The record decoded by the last successful [advance](PointStream::advance).
    fn record(&self) -> &RawPointRecord;

    /// Releases the backend. Safe to call more than once.
    fn close(&mut self);

    /// Diagnostic for the most recent failure.
    fn last_error(&self) -> Option<&str>;
}

trait RecordReader {
    fn read_next_into(&mut self, buffer: &mut [u8]) -> std::io::Result<()>;
}

struct RawRecordReader<R: Read> {
    src: R,
}

impl<R: Read> RecordReader for RawRecordReader<R> {
    fn read_next_into(&mut self, buffer: &mut [u8]) -> std::io::Result<()> {
        self.src.read_exact(buffer)
    }
}

impl<'a, R: Read + Seek + Send + Sync + 'a> RecordReader for laz::LasZipDecompressor<'a, R> {
    fn read_next_into(&mut self, buffer: &mut [u8]) -> std::io::Result<()> {
        self.decompress_one(buffer)
    }
}

/// A source laz cannot seek, so it decodes chunk after chunk without the chunk table.
struct SequentialSource<R> {
    inner: R,
}

impl<R: Read> Read for SequentialSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R> Seek for SequentialSource<R> {
    fn seek(&mut self, _: SeekFrom) -> std::io::Result<u64> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "sequential point data",
        ))
    }
}

/// Builds the LASzip reader for `src`, positioned at the start of point data.
///
/// The chunk table sits at the end of the data, so a truncated file loses it.
/// Such files are still read sequentially up to the point where data runs out.
fn laszip_reader<R: Read + Seek + Send + Sync + 'static>(
    mut src: R,
    vlr: LazVlr,
    data_start: u64,
) -> Result<Box<dyn RecordReader>> {
    let probe = laz::LasZipDecompressor::new(&mut src, vlr.clone()).map(|_| ());
    src.seek(SeekFrom::Start(data_start))?;
    let reader: Box<dyn RecordReader> = match probe {
        Ok(()) => Box::new(laz::LasZipDecompressor::new(src, vlr)?),
        Err(e) => {
            log::warn!("chunk table unreadable ({}), decoding sequentially", e);
            let src = SequentialSource { inner: src };
            Box::new(laz::LasZipDecompressor::new(src, vlr)?)
        }
    };
    Ok(reader)
}

/// LAS/LAZ file stream
pub struct LasStream {
    header: StreamHeader,
    format: Format,
    reader: Option<Box<dyn RecordReader>>,
    buffer: Vec<u8>,
    record: RawPointRecord,
    records_read: u64,
    last_error: Option<String>,
}

impl LasStream {
    /// Opens the LAS or LAZ file at `path` and positions the cursor before the first point.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<LasStream> {
        let src = BufReader::new(File::open(path)?);
        LasStream::new(src)
    }

    fn new<R: Read + Seek + Send + Sync + 'static>(mut src: R) -> Result<LasStream> {
        let raw_header = las::raw::Header::read_from(&mut src)?;
        src.seek(SeekFrom::Start(u64::from(raw_header.header_size)))?;
        let laszip_vlr =
            read_laszip_vlr(&mut src, raw_header.number_of_variable_length_records)?;

        let mut format = Format::new(raw_header.point_data_record_format)?;
        let record_length = raw_header.point_data_record_length;
        let required = format.len();
        if record_length < required {
            return Err(Error::InvalidRecordLength {
                format: format.to_u8()? & 0x3f,
                required,
                declared: record_length,
            });
        }
        format.extra_bytes = record_length - required;

        let header = StreamHeader::new(&raw_header, &format)?;
        log::debug!(
            "opened LAS {}.{} stream: {} points, format {}, compressed: {}",
            header.version.0,
            header.version.1,
            header.point_count,
            header.point_format,
            header.is_compressed
        );

        let data_start = u64::from(raw_header.offset_to_point_data);
        src.seek(SeekFrom::Start(data_start))?;
        let reader: Box<dyn RecordReader> = if format.is_compressed {
            let vlr = laszip_vlr.ok_or(Error::LasZipVlrNotFound)?;
            laszip_reader(src, vlr, data_start)?
        } else {
            Box::new(RawRecordReader { src })
        };

        Ok(LasStream {
            header,
            format,
            reader: Some(reader),
            buffer: vec![0u8; usize::from(record_length)],
            record: RawPointRecord::default(),
            records_read: 0,
            last_error: None,
        })
    }

    fn fail(&mut self, err: Error) {
        log::debug!("point {} could not be read: {}", self.records_read, err);
        self.last_error = Some(err.to_string());
    }
}

impl StreamHeader {
    fn new(raw: &las::raw::Header, format: &Format) -> Result<StreamHeader> {
        let point_count = raw
            .large_file
            .as_ref()
            .map(|large_file| large_file.number_of_point_records)
            .filter(|&count| count > 0)
            .unwrap_or_else(|| u64::from(raw.number_of_point_records));

        Ok(StreamHeader {
            point_count,
            scale: [raw.x_scale_factor, raw.y_scale_factor, raw.z_scale_factor],
            offset: [raw.x_offset, raw.y_offset, raw.z_offset],
            bounds: Bounds::new(
                raw.min_x, raw.min_y, raw.min_z, raw.max_x, raw.max_y, raw.max_z,
            ),
            is_compressed: format.is_compressed,
            point_format: format.to_u8()? & 0x3f,
            has_color: format.has_color,
            version: (raw.version.major, raw.version.minor),
        })
    }
}

impl PointStream for LasStream {
    fn header(&self) -> &StreamHeader {
        &self.header
    }

    fn advance(&mut self) -> bool {
        if self.records_read >= self.header.point_count {
            return false;
        }
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };
        if let Err(e) = reader.read_next_into(&mut self.buffer) {
            self.fail(e.into());
            return false;
        }
        match las::raw::Point::read_from(self.buffer.as_slice(), &self.format) {
            Ok(point) => {
                self.record = RawPointRecord::from(&point);
                self.records_read += 1;
                true
            }
            Err(e) => {
                self.fail(e.into());
                false
            }
        }
    }

    fn record(&self) -> &RawPointRecord {
        &self.record
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            log::trace!("closed stream after {} points", self.records_read);
        }
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Drop for LasStream {
    fn drop(&mut self) {
        self.close();
    }
}
