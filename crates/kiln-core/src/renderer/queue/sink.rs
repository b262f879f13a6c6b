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

use super::command_queue::RenderCommandQueue;
use crate::renderer::error::QueueError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Statistics about a single drain of the command queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Number of commands executed by the drain.
    pub commands_executed: usize,
    /// Arena bytes the drained commands occupied, including headers and padding.
    pub bytes_used: usize,
}

/// A cloneable handle through which any subsystem submits render commands.
///
/// All clones share one [`RenderCommandQueue`]. Submission is synchronized, but
/// the queue lock is never held while a command runs: commands are free to submit
/// further commands, which are appended to the batch being drained and run in the
/// same drain.
#[derive(Clone)]
pub struct CommandSink {
    queue: Arc<Mutex<RenderCommandQueue>>,
}

impl CommandSink {
    /// Creates a sink over a new queue with the given arena capacity.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        RenderCommandQueue::new(capacity).map(Self::from_queue)
    }

    /// Wraps an existing queue, including any commands already recorded in it.
    pub fn from_queue(queue: RenderCommandQueue) -> Self {
        Self {
            queue: Arc::new(Mutex::new(queue)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RenderCommandQueue> {
        // The queue is consistent at every point where the lock can be released,
        // so a poisoned lock is still safe to use.
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `command` to run on the next drain.
    ///
    /// # Errors
    ///
    /// Returns the [`QueueError`] from [`RenderCommandQueue::push`]. The rejected
    /// closure is dropped after the queue lock has been released.
    pub fn try_submit<F>(&self, command: F) -> Result<(), QueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        let result = self.lock().try_push(command);
        result.map_err(|(err, command)| {
            drop(command);
            err
        })
    }

    /// Records `command` to run on the next drain.
    ///
    /// # Panics
    ///
    /// Panics if the queue rejects the command. Running out of command memory
    /// means the frame can no longer be rendered correctly.
    pub fn submit<F>(&self, command: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(err) = self.try_submit(command) {
            log::error!("Render command submission failed: {err}");
            panic!("render command submission failed: {err}");
        }
    }

    /// Executes every pending command in submission order and rewinds the arena.
    ///
    /// Commands submitted by a running command are executed by this same drain.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ReentrantExecute`] if called while a drain of this
    /// queue is already running, from a command or from another thread.
    pub fn drain(&self) -> Result<DrainStats, QueueError> {
        self.lock().begin_drain()?;
        let _guard = DrainGuard { sink: self };

        let mut commands_executed = 0;
        loop {
            let next = {
                let mut queue = self.lock();
                match queue.next_record() {
                    Some(record) => Ok(record),
                    None => Err(queue.finish_drain()),
                }
            };
            match next {
                Ok((trampoline, payload)) => {
                    // SAFETY: the record was written by `allocate` for this trampoline
                    // and is handed out exactly once. The arena never moves, and
                    // concurrent submissions only write past the write cursor.
                    unsafe { trampoline(payload.as_ptr()) };
                    commands_executed += 1;
                }
                Err(bytes_used) => {
                    if commands_executed > 0 {
                        log::trace!(
                            "CommandSink: drained {commands_executed} command(s), {bytes_used} bytes"
                        );
                    }
                    return Ok(DrainStats {
                        commands_executed,
                        bytes_used,
                    });
                }
            }
        }
    }

    /// Number of commands waiting to be drained.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Bytes currently used in the arena.
    pub fn bytes_used(&self) -> usize {
        self.lock().bytes_used()
    }

    /// The highest arena usage seen so far.
    pub fn peak_bytes_used(&self) -> usize {
        self.lock().peak_bytes_used()
    }

    /// Total arena capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Returns `true` while a drain is in progress.
    pub fn is_draining(&self) -> bool {
        self.lock().is_draining()
    }
}

impl fmt::Debug for CommandSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.queue.try_lock() {
            Ok(queue) => f.debug_tuple("CommandSink").field(&*queue).finish(),
            Err(_) => f.debug_tuple("CommandSink").field(&"<locked>").finish(),
        }
    }
}

/// Abandons the current batch if a command unwinds out of a drain.
struct DrainGuard<'a> {
    sink: &'a CommandSink,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.sink.lock().discard_after_panic();
        }
    }
}
