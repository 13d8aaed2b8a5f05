use std::fmt;

use thiserror::Error;

/// Block interval covered by one log query, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u64,
    pub end: u64,
}

impl BlockRange {
    pub fn block_count(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRangeError {
    #[error("start block {from} is after end block {to}")]
    Reversed { from: u64, to: u64 },
    #[error("chunk size must be greater than zero")]
    EmptyChunk,
}

/// Ascending, contiguous sub-ranges of an interval. Restart by cloning.
#[derive(Debug, Clone)]
pub struct BlockRanges {
    next: Option<u64>,
    to: u64,
    chunk_size: u64,
}

pub fn block_ranges(
    from_block: u64,
    to_block: u64,
    chunk_size: u64,
) -> Result<BlockRanges, InvalidRangeError> {
    if from_block > to_block {
        return Err(InvalidRangeError::Reversed {
            from: from_block,
            to: to_block,
        });
    }

    if chunk_size == 0 {
        return Err(InvalidRangeError::EmptyChunk);
    }

    Ok(BlockRanges {
        next: Some(from_block),
        to: to_block,
        chunk_size,
    })
}

impl BlockRanges {
    /// Number of chunks still to be produced, saturating at `u64::MAX` for
    /// the full `u64` span in chunks of one block.
    pub fn remaining(&self) -> u64 {
        self.exact_remaining().unwrap_or(u64::MAX)
    }

    fn exact_remaining(&self) -> Option<u64> {
        match self.next {
            Some(start) => ((self.to - start) / self.chunk_size).checked_add(1),
            None => Some(0),
        }
    }
}

impl Iterator for BlockRanges {
    type Item = BlockRange;

    fn next(&mut self) -> Option<BlockRange> {
        let start = self.next?;

        let end = start
            .saturating_add(self.chunk_size - 1)
            .min(self.to);

        self.next = if end == self.to { None } else { Some(end + 1) };

        Some(BlockRange { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self
            .exact_remaining()
            .and_then(|remaining| usize::try_from(remaining).ok())
        {
            Some(remaining) => (remaining, Some(remaining)),
            None => (usize::MAX, None),
        }
    }
}
