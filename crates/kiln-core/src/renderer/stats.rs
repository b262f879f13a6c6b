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

//! Per-frame statistics for the rendering system.

use super::queue::DrainStats;

/// Statistics for a single frame, produced by draining the command queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// A sequential counter for rendered frames, starting at 1.
    pub frame_number: u64,
    /// The number of render commands executed for the frame.
    pub commands_executed: usize,
    /// The arena bytes the frame's commands occupied.
    pub bytes_used: usize,
    /// The highest arena usage seen since start-up.
    pub peak_bytes_used: usize,
    /// The number of draw calls submitted for the frame.
    pub draw_calls: u32,
}

impl FrameStats {
    /// Builds frame statistics from the result of a queue drain.
    pub fn from_drain(
        frame_number: u64,
        drain: DrainStats,
        peak_bytes_used: usize,
        draw_calls: u32,
    ) -> Self {
        Self {
            frame_number,
            commands_executed: drain.commands_executed,
            bytes_used: drain.bytes_used,
            peak_bytes_used,
            draw_calls,
        }
    }
}
