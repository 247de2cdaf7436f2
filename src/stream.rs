//! Forward-only cursors over in-memory byte buffers.
//!
//! Every integer and float is stored little-endian, regardless of the host.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Data ends too early: need {needed} bytes at offset {offset}, {remaining} left")]
pub struct Truncated {
    pub offset: usize,
    pub needed: usize,
    pub remaining: usize,
}

#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Length-prefixed string: u16 byte count, then the raw bytes.
    ///
    /// The caller guarantees the string fits; see
    /// [`ParsedMesh::validate`](crate::mesh::ParsedMesh::validate).
    pub fn write_str16(&mut self, s: &str) {
        debug_assert!(s.len() <= u16::MAX as usize);
        self.write_u16(s.len() as u16);
        self.write_bytes(s.as_bytes());
    }

    pub fn write_u16_array(&mut self, values: &[u16]) {
        if cfg!(target_endian = "little") {
            self.buf.extend_from_slice(bytemuck::cast_slice(values));
        } else {
            self.buf.reserve(values.len() * 2);
            for v in values {
                self.write_u16(*v);
            }
        }
    }

    pub fn write_f32_array(&mut self, values: &[f32]) {
        if cfg!(target_endian = "little") {
            self.buf.extend_from_slice(bytemuck::cast_slice(values));
        } else {
            self.buf.reserve(values.len() * 4);
            for v in values {
                self.write_f32(*v);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ByteReader<'s> {
    buf: &'s [u8],
    pos: usize,
}

impl<'s> ByteReader<'s> {
    pub fn new(buf: &'s [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'s [u8], Truncated> {
        if self.remaining() < count {
            return Err(Truncated {
                offset: self.pos,
                needed: count,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..(self.pos + count)];
        self.pos += count;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Truncated> {
        let mut out = [0; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Truncated> {
        Ok(self.read_array::<1>()?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, Truncated> {
        self.read_array().map(u16::from_le_bytes)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, Truncated> {
        self.read_array().map(u32::from_le_bytes)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, Truncated> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Reads `count` u16 values. Fails before allocating if the
    /// buffer cannot hold them.
    pub fn read_u16_array(&mut self, count: usize) -> Result<Vec<u16>, Truncated> {
        let len = checked_size(count, 2, self)?;
        let bytes = self.read_bytes(len)?;
        let mut out: Vec<u16> = bytemuck::pod_collect_to_vec(bytes);
        if cfg!(target_endian = "big") {
            out.iter_mut().for_each(|v| *v = u16::from_le(*v));
        }
        Ok(out)
    }

    /// Reads `count` f32 values. Fails before allocating if the
    /// buffer cannot hold them.
    pub fn read_f32_array(&mut self, count: usize) -> Result<Vec<f32>, Truncated> {
        let len = checked_size(count, 4, self)?;
        let bytes = self.read_bytes(len)?;
        let mut out: Vec<f32> = bytemuck::pod_collect_to_vec(bytes);
        if cfg!(target_endian = "big") {
            out.iter_mut()
                .for_each(|v| *v = f32::from_bits(u32::from_le(v.to_bits())));
        }
        Ok(out)
    }
}

fn checked_size(
    count: usize,
    width: usize,
    reader: &ByteReader<'_>,
) -> Result<usize, Truncated> {
    count.checked_mul(width).ok_or(Truncated {
        offset: reader.pos,
        needed: usize::MAX,
        remaining: reader.remaining(),
    })
}
