/*
    Copyright (C) 2026 the restable authors

    Permission is hereby granted, free of charge, to any person obtaining
    a copy of this software and associated documentation files (the
    "Software"), to deal in the Software without restriction, including
    without limitation the rights to use, copy, modify, merge, publish,
    distribute, sublicense, and/or sell copies of the Software, and to
    permit persons to whom the Software is furnished to do so, subject to
    the following conditions:

    The above copyright notice and this permission notice shall be
    included in all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
    EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
    MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
    NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
    BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
    ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
    CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
    SOFTWARE.
*/

use std::{
    any::type_name,
    fmt::Display,
    io::{Read, Seek, SeekFrom, Write},
};

/// An I/O or validation failure tagged with the stream position it happened
/// at and a stack of human readable context frames.
#[derive(Debug)]
pub struct StreamError {
    pub error: std::io::Error,
    pub pos: u64,
    pub context: Vec<String>,
}

impl StreamError {
    pub fn new_context(error: std::io::Error, pos: u64, context: Vec<String>) -> Self {
        Self {
            error,
            pos,
            context,
        }
    }

    pub fn new(error: std::io::Error, pos: u64) -> Self {
        Self {
            error,
            pos,
            context: Vec::new(),
        }
    }

    pub fn add_context<C: ToString>(self, new_context: C) -> Self {
        let mut context = self.context;
        context.push(new_context.to_string());
        Self::new_context(self.error, self.pos, context)
    }

    pub fn new_string_context<E: ToString, C: ToString>(error: E, pos: u64, context: C) -> Self {
        Self {
            error: std::io::Error::other(error.to_string()),
            pos,
            context: vec![context.to_string()],
        }
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = format!("error: {} at {} with context:", self.error, self.pos);

        let mut context_str = String::new();

        for ctx in &self.context {
            context_str.push_str(&format!("\n{ctx}"));
        }

        write!(f, "{string}\n{context_str}")
    }
}

impl std::error::Error for StreamError {}

pub type StreamResult<T> = Result<T, StreamError>;

pub trait NewResultCtx {
    fn add_context<C: ToString, F: FnOnce() -> C>(self, context: F) -> Self;
}

impl<T> NewResultCtx for StreamResult<T> {
    fn add_context<C: ToString, F: FnOnce() -> C>(self, context: F) -> Self {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.add_context(context())),
        }
    }
}

pub trait Readable: Sized {
    type Args;
    fn read<R: Read + Seek>(reader: &mut R, args: Self::Args) -> StreamResult<Self>;
}

pub trait Writeable: Sized {
    type Args;
    fn write<W: Write + Seek>(&self, writer: &mut W, args: Self::Args) -> StreamResult<()>;
}

pub trait ResultCtx: Sized {
    type OkT;
    fn with_context<C: ToString, F: FnOnce() -> C>(
        self,
        pos: u64,
        context: F,
    ) -> StreamResult<Self::OkT>;
    fn stream_context<C: ToString, F: FnOnce() -> C>(self, context: F) -> StreamResult<Self::OkT>;
}

impl From<std::io::Error> for StreamError {
    fn from(value: std::io::Error) -> Self {
        Self::new(value, u64::MAX)
    }
}

impl<T> ResultCtx for Result<T, std::io::Error> {
    type OkT = T;
    fn with_context<C: ToString, F: FnOnce() -> C>(
        self,
        pos: u64,
        context: F,
    ) -> StreamResult<<Self as ResultCtx>::OkT> {
        match self {
            Ok(v) => StreamResult::Ok(v),
            Err(e) => StreamResult::Err(StreamError::new_context(e, pos, vec![
                context().to_string(),
            ])),
        }
    }
    fn stream_context<C: ToString, F: FnOnce() -> C>(self, context: F) -> StreamResult<Self::OkT> {
        self.with_context(u64::MAX, context)
    }
}

fn read_data<R: Read + Seek, const N: usize>(reader: &mut R) -> StreamResult<[u8; N]> {
    let mut buf = [0; N];
    reader
        .read_exact(&mut buf)
        .with_context(reader.stream_position()?, || format!("read_data<{N}>"))?;
    Ok(buf)
}

fn write_data<W: Write + Seek>(data: &[u8], writer: &mut W) -> StreamResult<()> {
    writer
        .write_all(data)
        .with_context(writer.stream_position()?, || "write_data")
}

pub trait ReadableNoOptions: Sized {
    fn read_no_opts<R: Read + Seek>(reader: &mut R) -> StreamResult<Self>;
}

pub trait WriteableNoOptions {
    fn write_no_opts<W: Write + Seek>(&self, writer: &mut W) -> StreamResult<()>;
}

impl<T: Readable<Args = ()>> ReadableNoOptions for T {
    fn read_no_opts<R: Read + Seek>(reader: &mut R) -> StreamResult<Self> {
        T::read(reader, ())
    }
}

impl<T: Writeable<Args = ()>> WriteableNoOptions for T {
    fn write_no_opts<W: Write + Seek>(&self, writer: &mut W) -> StreamResult<()> {
        self.write(writer, ())
    }
}

impl Readable for u8 {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        Ok(Self::from_le_bytes(
            read_data(reader).add_context(|| "read u8")?,
        ))
    }
}

impl Readable for u16 {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        Ok(Self::from_le_bytes(
            read_data(reader).add_context(|| "read u16")?,
        ))
    }
}

impl Readable for u32 {
    type Args = ();
    fn read<R: Read + Seek>(reader: &mut R, _args: Self::Args) -> StreamResult<Self> {
        Ok(Self::from_le_bytes(
            read_data(reader).add_context(|| "read u32")?,
        ))
    }
}

impl Writeable for u8 {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        write_data(&self.to_le_bytes(), writer).add_context(|| "write u8")
    }
}

impl Writeable for u16 {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        write_data(&self.to_le_bytes(), writer).add_context(|| "write u16")
    }
}

impl Writeable for u32 {
    type Args = ();
    fn write<W: Write + Seek>(&self, writer: &mut W, _args: Self::Args) -> StreamResult<()> {
        write_data(&self.to_le_bytes(), writer).add_context(|| "write u32")
    }
}

pub trait VecReadable: Sized {
    fn read_vec<R: Read + Seek>(reader: &mut R, count: usize) -> StreamResult<Self>;
}

pub trait VecWritable {
    fn write_vec<W: Write + Seek>(&self, writer: &mut W) -> StreamResult<()>;
}

impl<T: ReadableNoOptions> VecReadable for Vec<T> {
    fn read_vec<R: Read + Seek>(reader: &mut R, count: usize) -> StreamResult<Self> {
        let mut data = Vec::with_capacity(count);

        for i in 0..count {
            data.push(T::read_no_opts(reader).add_context(|| {
                format!("reading item {} of vec of type {}", i, type_name::<T>())
            })?);
        }

        Ok(data)
    }
}

impl<T: WriteableNoOptions> VecWritable for Vec<T> {
    fn write_vec<W: Write + Seek>(&self, writer: &mut W) -> StreamResult<()> {
        for (i, val) in self.iter().enumerate() {
            val.write_no_opts(writer).add_context(|| {
                format!("writing item {} of vec of type {}", i, type_name::<T>())
            })?;
        }

        Ok(())
    }
}

/// Number of bytes left before the end of the stream. Restores the current
/// position afterwards.
pub fn available<R: Read + Seek>(reader: &mut R) -> StreamResult<u64> {
    let current = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(current))?;
    Ok(end.saturating_sub(current))
}

/// Read a fixed-capacity null terminated UTF-16LE string of `length` code
/// units, consuming the whole field.
pub fn read_utf16_fixed_string<R: Read + Seek>(
    reader: &mut R,
    length: usize,
) -> StreamResult<String> {
    let mut data: Vec<u16> = Vec::new();
    let start = reader.stream_position()?;
    let end = start + (length as u64) * 2;
    for _ in 0..length {
        let val =
            u16::read_no_opts(reader).add_context(|| "read char for read_utf16_fixed_string")?;
        if val == 0 {
            reader.seek(SeekFrom::Start(end))?;
            break;
        }
        data.push(val);
    }

    String::from_utf16(data.as_slice()).map_err(|e| {
        StreamError::new_string_context(e, start, "decode utf16 for read_utf16_fixed_string")
    })
}

/// Write a string into a fixed-capacity null padded UTF-16LE field of
/// `length` code units. The string must be strictly shorter than the field so
/// at least one terminator is written.
pub fn write_utf16_fixed_string<W: Write + Seek>(
    writer: &mut W,
    string: &str,
    length: usize,
) -> StreamResult<()> {
    let mut data: Vec<u16> = string.encode_utf16().collect();
    if data.len() >= length {
        return Err(StreamError::new_string_context(
            format!(
                "invalid string length {}, expected less than {}",
                data.len(),
                length
            ),
            writer.stream_position()?,
            "validate string length for write_utf16_fixed_string",
        ));
    }
    data.resize(length, 0);
    data.write_vec(writer)
        .add_context(|| "write encoded data for write_utf16_fixed_string")
}
