//! Immutable, bounds-checked views over captured bytes.
//!
//! A [`Tvb`] distinguishes the bytes physically captured from the length the
//! packet declared on the wire. Reads are fallible: running past the reported
//! length means the packet is malformed, while running past only the captured
//! length means the capture itself was cut short. Decoders propagate the
//! resulting [`BoundsError`] with `?` and the dispatch engine decides how to
//! recover (see [`crate::fault`]).

use bytes::Bytes;

use crate::fault::BoundsError;

/// A view over a contiguous range of packet bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tvb {
    data: Bytes,
    reported_len: usize,
    fragment: bool,
}

impl Tvb {
    /// Create a view whose reported length equals its captured length.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let reported_len = data.len();
        Self {
            data,
            reported_len,
            fragment: false,
        }
    }

    /// Create a view over static bytes without copying.
    #[must_use]
    pub fn from_static(data: &'static [u8]) -> Self { Self::new(Bytes::from_static(data)) }

    /// Create a view for a capture truncated below the length seen on the wire.
    ///
    /// A `reported_len` shorter than the captured data is raised to the
    /// captured length.
    #[must_use]
    pub fn with_reported_len(data: impl Into<Bytes>, reported_len: usize) -> Self {
        let data = data.into();
        let reported_len = reported_len.max(data.len());
        Self {
            data,
            reported_len,
            fragment: false,
        }
    }

    /// Create a view over one fragment of a payload that is not yet reassembled.
    #[must_use]
    pub fn fragment(data: impl Into<Bytes>) -> Self {
        Self {
            fragment: true,
            ..Self::new(data)
        }
    }

    /// Number of bytes physically present.
    #[must_use]
    pub fn captured_len(&self) -> usize { self.data.len() }

    /// Number of bytes the packet declared.
    #[must_use]
    pub fn reported_len(&self) -> usize { self.reported_len }

    /// Whether no bytes were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Whether this view is a fragment of an incomplete reassembly.
    #[must_use]
    pub fn is_fragment(&self) -> bool { self.fragment }

    /// Captured bytes remaining from `offset`, or zero past the end.
    #[must_use]
    pub fn remaining(&self, offset: usize) -> usize { self.data.len().saturating_sub(offset) }

    /// Borrow the whole captured buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &Bytes { &self.data }

    /// Borrow `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the range is not fully captured.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&[u8], BoundsError> {
        self.check(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }

    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if `offset` is not captured.
    pub fn get_u8(&self, offset: usize) -> Result<u8, BoundsError> {
        self.check(offset, 1)?;
        Ok(self.data[offset])
    }

    /// Read a big-endian `u16`.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the two bytes are not captured.
    pub fn get_u16(&self, offset: usize) -> Result<u16, BoundsError> {
        Ok(u16::from_be_bytes(self.array(offset)?))
    }

    /// Read a little-endian `u16`.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the two bytes are not captured.
    pub fn get_u16_le(&self, offset: usize) -> Result<u16, BoundsError> {
        Ok(u16::from_le_bytes(self.array(offset)?))
    }

    /// Read a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the four bytes are not captured.
    pub fn get_u32(&self, offset: usize) -> Result<u32, BoundsError> {
        Ok(u32::from_be_bytes(self.array(offset)?))
    }

    /// Read a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the four bytes are not captured.
    pub fn get_u32_le(&self, offset: usize) -> Result<u32, BoundsError> {
        Ok(u32::from_le_bytes(self.array(offset)?))
    }

    /// Create a child view over `len` bytes at `offset`.
    ///
    /// The child's reported length is clamped to what the parent reported.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if the range is not fully captured.
    pub fn subset(&self, offset: usize, len: usize) -> Result<Tvb, BoundsError> {
        self.check(offset, len)?;
        Ok(Self {
            data: self.data.slice(offset..offset + len),
            reported_len: len,
            fragment: self.fragment,
        })
    }

    /// Create a child view over everything from `offset` to the end.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundsError`] if `offset` lies beyond the captured data.
    pub fn subset_remaining(&self, offset: usize) -> Result<Tvb, BoundsError> {
        self.check(offset, 0)?;
        Ok(Self {
            data: self.data.slice(offset..),
            reported_len: self.reported_len - offset,
            fragment: self.fragment,
        })
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N], BoundsError> {
        self.check(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[offset..offset + N]);
        Ok(out)
    }

    fn check(&self, offset: usize, len: usize) -> Result<(), BoundsError> {
        let captured = self.data.len();
        let Some(end) = offset.checked_add(len) else {
            return Err(BoundsError::Reported {
                offset,
                len,
                reported: self.reported_len,
            });
        };
        if end <= captured {
            Ok(())
        } else if self.fragment {
            Err(BoundsError::Fragment {
                offset,
                len,
                available: captured,
            })
        } else if end <= self.reported_len {
            Err(BoundsError::Captured {
                offset,
                len,
                captured,
            })
        } else {
            Err(BoundsError::Reported {
                offset,
                len,
                reported: self.reported_len,
            })
        }
    }
}

impl From<&'static [u8]> for Tvb {
    fn from(data: &'static [u8]) -> Self { Self::from_static(data) }
}

impl From<Vec<u8>> for Tvb {
    fn from(data: Vec<u8>) -> Self { Self::new(data) }
}
