// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Binary layout of a single command record.
//!
//! A record is a [`RecordHeader`] followed by the raw bytes of one closure. The
//! header stores a [`Trampoline`] that was monomorphized for the closure's
//! concrete type, so the payload bytes are only ever interpreted by code that
//! knows their real type.

use std::mem::size_of;

/// Alignment of every record and every payload in the arena.
///
/// Closures whose alignment exceeds this value cannot be recorded.
pub const RECORD_ALIGN: usize = 16;

/// Size in bytes reserved for a [`RecordHeader`], padded to [`RECORD_ALIGN`].
pub const RECORD_HEADER_SIZE: usize = align_up(size_of::<RecordHeader>(), RECORD_ALIGN);

/// A type-erased entry point that invokes and then destroys one recorded closure.
///
/// # Safety
///
/// The pointer must reference an initialized payload written for the exact
/// closure type the trampoline was generated for, and the payload must not be
/// used again after the call.
pub type Trampoline = unsafe fn(*mut u8);

/// The fixed-size prefix of every record.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct RecordHeader {
    /// Invokes and destroys the payload that follows this header.
    pub(crate) trampoline: Trampoline,
    /// Size of the closure in bytes, before alignment padding.
    pub(crate) payload_size: u32,
}

/// Rounds `value` up to the next multiple of `align` (a power of two).
#[inline]
pub(crate) const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Returns the number of arena bytes consumed by a record with the given payload size.
///
/// This includes the header and the padding that keeps the next record aligned,
/// and is the unit in which queue capacity is accounted.
#[inline]
pub const fn record_size(payload_size: usize) -> usize {
    RECORD_HEADER_SIZE + align_up(payload_size, RECORD_ALIGN)
}

/// Same as [`record_size`], but returns `None` instead of overflowing.
#[inline]
pub(crate) fn checked_record_size(payload_size: usize) -> Option<usize> {
    payload_size
        .checked_add(RECORD_ALIGN - 1)
        .map(|padded| padded & !(RECORD_ALIGN - 1))
        .and_then(|padded| padded.checked_add(RECORD_HEADER_SIZE))
}

/// The trampoline generated for closures of type `F`.
///
/// The closure is moved out of the arena before it is called, so its captured
/// state is dropped exactly once: when the call returns, or while unwinding if
/// the call panics.
///
/// # Safety
///
/// `payload` must point to a valid, properly aligned `F` that has not been
/// read before. The bytes must be treated as uninitialized afterwards.
pub(crate) unsafe fn invoke_and_drop<F: FnOnce()>(payload: *mut u8) {
    let command = std::ptr::read(payload.cast::<F>());
    command();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fits_in_one_alignment_unit() {
        assert_eq!(RECORD_HEADER_SIZE, RECORD_ALIGN);
    }

    #[test]
    fn test_record_size_pads_payload() {
        assert_eq!(record_size(0), RECORD_HEADER_SIZE);
        assert_eq!(record_size(1), RECORD_HEADER_SIZE + RECORD_ALIGN);
        assert_eq!(record_size(16), RECORD_HEADER_SIZE + 16);
        assert_eq!(record_size(17), RECORD_HEADER_SIZE + 32);
    }

    #[test]
    fn test_checked_record_size_matches_and_detects_overflow() {
        for size in [0usize, 1, 15, 16, 17, 1024] {
            assert_eq!(checked_record_size(size), Some(record_size(size)));
        }
        assert_eq!(checked_record_size(usize::MAX), None);
    }
}
