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

use super::record::{
    checked_record_size, invoke_and_drop, record_size, RecordHeader, Trampoline, RECORD_ALIGN,
    RECORD_HEADER_SIZE,
};
use crate::renderer::error::QueueError;
use std::alloc::{self, Layout};
use std::fmt;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;

/// Default arena capacity of a render command queue: 10 MiB.
pub const QUEUE_CAPACITY: usize = 10 * 1024 * 1024;

/// A fixed-capacity arena of type-erased render commands.
///
/// Commands are appended with [`push`](Self::push) (or the raw
/// [`allocate`](Self::allocate)) and run in FIFO order by
/// [`execute`](Self::execute), which then rewinds the arena for reuse. The arena
/// is allocated once and never grows: a record that does not fit is rejected
/// with [`QueueError::CapacityExceeded`] and the queue is left untouched.
///
/// Dropping the queue executes any commands that are still pending before the
/// arena is freed, so destruction commands queued right before shutdown are
/// never lost.
pub struct RenderCommandQueue {
    buffer: NonNull<u8>,
    layout: Layout,
    /// Offset where the next record will be written.
    write_offset: usize,
    /// Offset of the next record to execute.
    read_offset: usize,
    /// Records written since the last reset.
    command_count: usize,
    /// Records already handed out for execution since the last reset.
    executed_count: usize,
    peak_bytes_used: usize,
    draining: bool,
}

// SAFETY: the arena is exclusively owned by the queue, and every payload stored in
// it is `Send`: `push` requires it and `allocate` makes it part of its contract.
unsafe impl Send for RenderCommandQueue {}

impl RenderCommandQueue {
    /// Creates a queue backed by a zeroed arena of exactly `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidCapacity`] if `capacity` is zero or too large
    /// to be laid out in memory.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity { capacity });
        }
        let layout = Layout::from_size_align(capacity, RECORD_ALIGN)
            .map_err(|_| QueueError::InvalidCapacity { capacity })?;

        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(buffer) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        log::debug!("RenderCommandQueue: allocated a {capacity} byte command arena");

        Ok(Self {
            buffer,
            layout,
            write_offset: 0,
            read_offset: 0,
            command_count: 0,
            executed_count: 0,
            peak_bytes_used: 0,
            draining: false,
        })
    }

    /// Reserves a record for `trampoline` and returns a pointer to its zeroed
    /// payload region of exactly `payload_size` bytes.
    ///
    /// The payload is aligned to [`RECORD_ALIGN`]. On error nothing is written and
    /// the queue state is unchanged.
    ///
    /// # Safety
    ///
    /// Before the queue is next executed or dropped, the caller must initialize
    /// the payload so that `trampoline` can consume it, and the payload must be
    /// safe to send to another thread. The trampoline is invoked exactly once
    /// with the returned pointer.
    ///
    /// # Errors
    ///
    /// - [`QueueError::PayloadTooLarge`] if the size cannot be stored in a header.
    /// - [`QueueError::CapacityExceeded`] if the record does not fit.
    pub unsafe fn allocate(
        &mut self,
        trampoline: Trampoline,
        payload_size: usize,
    ) -> Result<NonNull<u8>, QueueError> {
        let header_size = u32::try_from(payload_size)
            .map_err(|_| QueueError::PayloadTooLarge { size: payload_size })?;
        let requested = checked_record_size(payload_size)
            .ok_or(QueueError::PayloadTooLarge { size: payload_size })?;

        if requested > self.remaining() {
            return Err(QueueError::CapacityExceeded {
                requested,
                used: self.write_offset,
                capacity: self.capacity(),
            });
        }

        // SAFETY: `write_offset + requested <= capacity`, and `write_offset` is a
        // multiple of RECORD_ALIGN, so both the header and the payload are in
        // bounds and aligned.
        let payload = unsafe {
            let record = self.buffer.as_ptr().add(self.write_offset);
            record.cast::<RecordHeader>().write(RecordHeader {
                trampoline,
                payload_size: header_size,
            });
            let payload = record.add(RECORD_HEADER_SIZE);
            payload.write_bytes(0, payload_size);
            NonNull::new_unchecked(payload)
        };

        self.write_offset += requested;
        self.command_count += 1;
        self.peak_bytes_used = self.peak_bytes_used.max(self.write_offset);
        Ok(payload)
    }

    /// Records `command` to be run by the next [`execute`](Self::execute).
    ///
    /// The closure is moved into the arena; no separate heap allocation is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the closure is over-aligned, too large, or does not fit
    /// in the remaining capacity. The closure is dropped without being run.
    pub fn push<F>(&mut self, command: F) -> Result<(), QueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.try_push(command).map_err(|(err, _command)| err)
    }

    /// Like [`push`](Self::push), but hands the closure back on failure so the
    /// caller controls where it is dropped.
    pub(crate) fn try_push<F>(&mut self, command: F) -> Result<(), (QueueError, F)>
    where
        F: FnOnce() + Send + 'static,
    {
        if align_of::<F>() > RECORD_ALIGN {
            let err = QueueError::UnsupportedAlignment {
                align: align_of::<F>(),
                max: RECORD_ALIGN,
            };
            return Err((err, command));
        }

        // SAFETY: the payload is initialized right away with a value of the exact
        // type `invoke_and_drop::<F>` expects, and `F: Send`.
        unsafe {
            match self.allocate(invoke_and_drop::<F>, size_of::<F>()) {
                Ok(payload) => {
                    payload.as_ptr().cast::<F>().write(command);
                    Ok(())
                }
                Err(err) => Err((err, command)),
            }
        }
    }

    /// Runs every pending command in submission order, then rewinds the arena.
    ///
    /// Returns the number of commands executed. Calling this on an empty queue is
    /// a no-op.
    ///
    /// If a command panics, every command before it has run exactly once and the
    /// panicking command's captured state is dropped during unwinding. The
    /// commands after it are discarded without being run (their captured state is
    /// leaked), and the queue is left empty.
    pub fn execute(&mut self) -> usize {
        if self.is_empty() {
            return 0;
        }
        debug_assert!(!self.draining, "RenderCommandQueue executed while draining");

        let guard = ExecuteGuard { queue: self };
        while let Some((trampoline, payload)) = guard.queue.next_record() {
            // SAFETY: the record was produced by `allocate` for this trampoline and
            // is handed out exactly once.
            unsafe { trampoline(payload.as_ptr()) };
        }
        guard.queue.executed_count
    }

    /// Number of commands waiting to be executed.
    pub fn len(&self) -> usize {
        self.command_count - self.executed_count
    }

    /// Returns `true` if no command is waiting to be executed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes written into the arena since the last reset, including headers and padding.
    pub fn bytes_used(&self) -> usize {
        self.write_offset
    }

    /// Total size of the arena in bytes.
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// Bytes still available for new records.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.write_offset
    }

    /// The highest value [`bytes_used`](Self::bytes_used) has reached over the queue's lifetime.
    pub fn peak_bytes_used(&self) -> usize {
        self.peak_bytes_used
    }

    /// Returns `true` while a shared drain is in progress.
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    pub(crate) fn begin_drain(&mut self) -> Result<(), QueueError> {
        if self.draining {
            return Err(QueueError::ReentrantExecute);
        }
        self.draining = true;
        Ok(())
    }

    /// Hands out the next unexecuted record and advances past it.
    pub(crate) fn next_record(&mut self) -> Option<(Trampoline, NonNull<u8>)> {
        if self.executed_count == self.command_count {
            return None;
        }
        debug_assert!(self.read_offset < self.write_offset);

        // SAFETY: records are read in the order they were written and fewer than
        // `command_count` have been read, so `read_offset` points at a header
        // written by `allocate`.
        unsafe {
            let record = self.buffer.as_ptr().add(self.read_offset);
            let header = record.cast::<RecordHeader>().read();
            self.read_offset += record_size(header.payload_size as usize);
            self.executed_count += 1;
            Some((
                header.trampoline,
                NonNull::new_unchecked(record.add(RECORD_HEADER_SIZE)),
            ))
        }
    }

    /// Ends a drain and rewinds the arena. Returns the bytes the drained batch used.
    pub(crate) fn finish_drain(&mut self) -> usize {
        let used = self.write_offset;
        self.reset();
        used
    }

    /// Rewinds the arena after a command panicked mid-drain.
    pub(crate) fn discard_after_panic(&mut self) {
        let discarded = self.len();
        if discarded > 0 {
            log::warn!(
                "RenderCommandQueue: a command panicked, discarding {discarded} unexecuted command(s)"
            );
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.write_offset = 0;
        self.read_offset = 0;
        self.command_count = 0;
        self.executed_count = 0;
        self.draining = false;
    }
}

/// Rewinds the queue when an exclusive `execute` ends, including by unwinding.
struct ExecuteGuard<'a> {
    queue: &'a mut RenderCommandQueue,
}

impl Drop for ExecuteGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.queue.discard_after_panic();
        } else {
            self.queue.reset();
        }
    }
}

impl Drop for RenderCommandQueue {
    fn drop(&mut self) {
        let pending = self.len();
        if pending > 0 {
            log::debug!(
                "RenderCommandQueue: executing {pending} pending command(s) before release"
            );
            self.execute();
        }
        // SAFETY: `buffer` was allocated in `new` with exactly this layout.
        unsafe { alloc::dealloc(self.buffer.as_ptr(), self.layout) };
    }
}

impl fmt::Debug for RenderCommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCommandQueue")
            .field("pending", &self.len())
            .field("bytes_used", &self.bytes_used())
            .field("capacity", &self.capacity())
            .field("draining", &self.draining)
            .finish()
    }
}
