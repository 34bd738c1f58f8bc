//! Caller buffer access
//!
//! The transfer engine never touches a caller buffer directly. It moves bytes
//! between the caller and its own scratch block through these traits, so a
//! host that crosses a protection boundary can plug in a fallible copy.
//! Plain slices implement both traits and never fail.

use crate::error::CopyError;

/// Caller buffer the engine copies outgoing bytes from
pub trait UserSource {
    /// Total number of bytes in the buffer
    fn len(&self) -> usize;

    /// True when the buffer holds no bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `dst.len()` bytes starting at `offset` into `dst`
    fn copy_out(&self, offset: usize, dst: &mut [u8]) -> Result<(), CopyError>;
}

/// Caller buffer the engine copies incoming bytes into
pub trait UserSink {
    /// Total number of bytes the buffer can take
    fn len(&self) -> usize;

    /// True when the buffer holds no bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `src` into the buffer starting at `offset`
    fn copy_in(&mut self, offset: usize, src: &[u8]) -> Result<(), CopyError>;
}

impl UserSource for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_out(&self, offset: usize, dst: &mut [u8]) -> Result<(), CopyError> {
        let fault = CopyError {
            offset,
            len: dst.len(),
        };
        let end = offset.checked_add(dst.len()).ok_or(fault)?;
        let src = self.get(offset..end).ok_or(fault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl UserSink for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_in(&mut self, offset: usize, src: &[u8]) -> Result<(), CopyError> {
        let fault = CopyError {
            offset,
            len: src.len(),
        };
        let end = offset.checked_add(src.len()).ok_or(fault)?;
        let dst = self.get_mut(offset..end).ok_or(fault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl UserSource for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn copy_out(&self, offset: usize, dst: &mut [u8]) -> Result<(), CopyError> {
        self.as_slice().copy_out(offset, dst)
    }
}

impl UserSink for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn copy_in(&mut self, offset: usize, src: &[u8]) -> Result<(), CopyError> {
        self.as_mut_slice().copy_in(offset, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_copy_out() {
        let data = [1u8, 2, 3, 4, 5];
        let mut dst = [0u8; 2];
        data[..].copy_out(3, &mut dst).unwrap();
        assert_eq!(dst, [4, 5]);
    }

    #[test]
    fn test_slice_copy_out_past_end() {
        let data = [1u8, 2, 3];
        let mut dst = [0u8; 2];
        let err = data[..].copy_out(2, &mut dst).unwrap_err();
        assert_eq!(err, CopyError { offset: 2, len: 2 });
    }

    #[test]
    fn test_slice_copy_in() {
        let mut buf = [0u8; 4];
        buf[..].copy_in(1, &[9, 8]).unwrap();
        assert_eq!(buf, [0, 9, 8, 0]);
        assert!(buf[..].copy_in(3, &[1, 2]).is_err());
    }
}
