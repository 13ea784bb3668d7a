//! `swapon` flag encoding (Linux `<sys/swap.h>`).

use thiserror::Error;

pub const SWAP_FLAG_PREFER: i32 = 0x8000;
pub const SWAP_FLAG_PRIO_MASK: i32 = 0x7fff;
pub const SWAP_FLAG_DISCARD: i32 = 0x10000;

/// Named flags, as exposed to callers that build `swapon` flags by hand.
pub const SWAP_CONSTANTS: &[(&str, i32)] = &[
    ("prefer", SWAP_FLAG_PREFER),
    ("discard", SWAP_FLAG_DISCARD),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("swap priority {0} exceeds {max}", max = SWAP_FLAG_PRIO_MASK)]
pub struct PriorityOutOfRange(pub u32);

/// Options for activating a swap area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SwapFlags {
    /// Explicit priority; sets `SWAP_FLAG_PREFER`.
    pub priority: Option<u16>,
    /// Discard freed swap pages (`SWAP_FLAG_DISCARD`).
    pub discard: bool,
}

impl SwapFlags {
    /// Encode into the `swapflags` argument of `swapon(2)`.
    pub fn to_raw(self) -> Result<i32, PriorityOutOfRange> {
        let mut raw = 0;
        if let Some(prio) = self.priority {
            let prio = i32::from(prio);
            if prio > SWAP_FLAG_PRIO_MASK {
                return Err(PriorityOutOfRange(prio as u32));
            }
            raw |= SWAP_FLAG_PREFER | (prio & SWAP_FLAG_PRIO_MASK);
        }
        if self.discard {
            raw |= SWAP_FLAG_DISCARD;
        }
        Ok(raw)
    }
}
