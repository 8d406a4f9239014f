//! Readers and writers for the TEXMEX `.fvecs` / `.ivecs` formats.
//!
//! Both formats are a bare sequence of records with no header, footer, or
//! checksum:
//!
//! ```text
//! record := count:i32  value[count]
//! ```
//!
//! Every 4-byte field is little-endian. `.fvecs` values are IEEE-754 `f32`
//! (base/query vectors); `.ivecs` values are `i32` neighbor ids ordered by
//! rank, nearest first (ground truth).
//!
//! Reading is streaming. The stream may end cleanly only on a record
//! boundary; ending inside a record is a [`PrepError::CorruptData`] error
//! and so is a non-positive count. Records yielded before the error remain
//! valid.
//!
//! Reference: <http://corpus-texmex.irisa.fr/>

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tracing::{debug, trace};

use crate::error::{PrepError, Result};

/// Size of the count field and of every value.
const WORD: usize = 4;

/// Cap on up-front allocation per record; larger records grow as bytes arrive.
const PREALLOC_LIMIT: usize = 1 << 20;

/// Decode a record's count field. The single place the on-disk byte order
/// of integers is spelled out.
#[inline]
fn decode_count(bytes: [u8; WORD]) -> i32 {
    LittleEndian::read_i32(&bytes)
}

/// A value type stored in a `*vecs` file.
pub trait VecsElement: Copy + Default {
    /// File extension, for messages.
    const FORMAT: &'static str;

    /// Decode `dst.len()` values from `src` (exactly `dst.len() * 4` bytes).
    fn decode_into(src: &[u8], dst: &mut [Self]);

    /// Append one value to `w`.
    fn encode<W: Write>(self, w: &mut W) -> io::Result<()>;
}

impl VecsElement for f32 {
    const FORMAT: &'static str = "fvecs";

    fn decode_into(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_f32_into(src, dst);
    }

    fn encode<W: Write>(self, w: &mut W) -> io::Result<()> {
        w.write_f32::<LittleEndian>(self)
    }
}

impl VecsElement for i32 {
    const FORMAT: &'static str = "ivecs";

    fn decode_into(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_i32_into(src, dst);
    }

    fn encode<W: Write>(self, w: &mut W) -> io::Result<()> {
        w.write_i32::<LittleEndian>(self)
    }
}

/// Streaming reader over `*vecs` records.
///
/// Implements [`Iterator`]; after the first error it yields `None`.
#[derive(Debug)]
pub struct VecsReader<R, T> {
    reader: R,
    records: usize,
    done: bool,
    _element: PhantomData<T>,
}

/// Reader for `.fvecs` (float vectors).
pub type FvecsReader<R> = VecsReader<R, f32>;

/// Reader for `.ivecs` (integer neighbor lists).
pub type IvecsReader<R> = VecsReader<R, i32>;

impl<T: VecsElement> VecsReader<BufReader<File>, T> {
    /// Open `path` for buffered sequential reading.
    ///
    /// The file handle is owned by the reader and closed when it drops.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read, T: VecsElement> VecsReader<R, T> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            records: 0,
            done: false,
            _element: PhantomData,
        }
    }

    /// Number of complete records read so far.
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Read the next record, or `Ok(None)` at a clean end of stream.
    pub fn read_record(&mut self) -> Result<Option<Vec<T>>> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };

        let count = decode_count(header);
        if count <= 0 {
            return Err(PrepError::CorruptData(format!(
                "{} record {} declares non-positive length {count}",
                T::FORMAT,
                self.records
            )));
        }
        let count = count as usize;
        let len = count.checked_mul(WORD).ok_or_else(|| {
            PrepError::CorruptData(format!("{} record length {count} overflows", T::FORMAT))
        })?;

        let mut bytes = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        (&mut self.reader).take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() < len {
            return Err(PrepError::CorruptData(format!(
                "{} record {} truncated: expected {len} payload bytes, got {}",
                T::FORMAT,
                self.records,
                bytes.len()
            )));
        }

        let mut values = vec![T::default(); count];
        T::decode_into(&bytes, &mut values);

        trace!(record = self.records, count, format = T::FORMAT, "read record");
        self.records += 1;
        Ok(Some(values))
    }

    /// Fill the 4-byte count field. `None` if the stream ends before its
    /// first byte.
    fn read_header(&mut self) -> Result<Option<[u8; WORD]>> {
        let mut header = [0u8; WORD];
        let mut filled = 0;
        while filled < WORD {
            match self.reader.read(&mut header[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match filled {
            0 => Ok(None),
            WORD => Ok(Some(header)),
            partial => Err(PrepError::CorruptData(format!(
                "{} record {} truncated: {partial} of {WORD} length bytes",
                T::FORMAT,
                self.records
            ))),
        }
    }
}

impl<R: Read, T: VecsElement> Iterator for VecsReader<R, T> {
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(v)) => Some(Ok(v)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read every vector in an `.fvecs` file.
pub fn read_fvecs(path: impl AsRef<Path>) -> Result<Vec<Vec<f32>>> {
    let path = path.as_ref();
    let vectors = FvecsReader::open(path)?.collect::<Result<Vec<_>>>()?;
    debug!(path = %path.display(), n = vectors.len(), "loaded fvecs");
    Ok(vectors)
}

/// Read every neighbor list in an `.ivecs` file.
///
/// Ids are returned as `u32`; a negative id is [`PrepError::CorruptData`].
pub fn read_ivecs(path: impl AsRef<Path>) -> Result<Vec<Vec<u32>>> {
    let path = path.as_ref();
    let mut lists = Vec::new();
    for (record, raw) in IvecsReader::open(path)?.enumerate() {
        let ids = raw?
            .into_iter()
            .map(|id| {
                u32::try_from(id).map_err(|_| {
                    PrepError::CorruptData(format!("ivecs record {record} has negative id {id}"))
                })
            })
            .collect::<Result<Vec<u32>>>()?;
        lists.push(ids);
    }
    debug!(path = %path.display(), n = lists.len(), "loaded ivecs");
    Ok(lists)
}

/// Write records in `*vecs` format to any writer.
///
/// # Errors
///
/// [`PrepError::InvalidParameter`] for an empty record or one too long for
/// an `i32` count; those could not be read back.
pub fn write_vecs<W, T, V>(w: &mut W, records: &[V]) -> Result<()>
where
    W: Write,
    T: VecsElement,
    V: AsRef<[T]>,
{
    for (i, record) in records.iter().enumerate() {
        let values = record.as_ref();
        let count = i32::try_from(values.len())
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| {
                PrepError::InvalidParameter(format!(
                    "{} record {i} has unrepresentable length {}",
                    T::FORMAT,
                    values.len()
                ))
            })?;
        w.write_i32::<LittleEndian>(count)?;
        for &v in values {
            v.encode(w)?;
        }
    }
    Ok(())
}

/// Write vectors to an `.fvecs` file, replacing it if present.
pub fn write_fvecs<V: AsRef<[f32]>>(path: impl AsRef<Path>, vectors: &[V]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path.as_ref())?);
    write_vecs::<_, f32, _>(&mut w, vectors)?;
    w.flush()?;
    Ok(())
}

/// Write neighbor lists to an `.ivecs` file, replacing it if present.
pub fn write_ivecs<V: AsRef<[u32]>>(path: impl AsRef<Path>, lists: &[V]) -> Result<()> {
    let converted = lists
        .iter()
        .enumerate()
        .map(|(record, ids)| {
            ids.as_ref()
                .iter()
                .map(|&id| {
                    i32::try_from(id).map_err(|_| {
                        PrepError::InvalidParameter(format!(
                            "ivecs record {record} id {id} exceeds i32::MAX"
                        ))
                    })
                })
                .collect::<Result<Vec<i32>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut w = BufWriter::new(File::create(path.as_ref())?);
    write_vecs::<_, i32, _>(&mut w, &converted)?;
    w.flush()?;
    Ok(())
}
