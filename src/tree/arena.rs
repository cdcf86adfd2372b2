//! Append-only name storage for tree nodes
//!
//! Names are stored back to back, each followed by a NUL terminator, in a
//! buffer sized once by the pre-pass.

use super::errors::{TreeError, TreeResult};

/// Offset of a name inside a [`NameArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameOffset(usize);

impl NameOffset {
    /// Byte offset of the first character
    pub fn get(&self) -> usize {
        self.0
    }
}

/// Fixed-capacity, NUL-separated name buffer
#[derive(Debug, Default)]
pub struct NameArena {
    buf: String,
    limit: usize,
}

impl NameArena {
    /// Creates an arena able to hold `bytes` bytes, terminators included
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: String::with_capacity(bytes),
            limit: bytes,
        }
    }

    /// Appends a name; `event_index` is only used for error context
    pub fn push(&mut self, name: &str, event_index: usize) -> TreeResult<NameOffset> {
        if name.contains('\0') {
            return Err(TreeError::malformed(
                event_index,
                format!("object name {:?} contains a NUL byte", name),
            ));
        }

        let needed = name.len() + 1;
        if self.buf.len() + needed > self.limit {
            return Err(TreeError::capacity_exceeded(
                event_index,
                format!(
                    "name '{}' needs {} bytes but only {} of {} remain",
                    name,
                    needed,
                    self.limit - self.buf.len(),
                    self.limit
                ),
            ));
        }

        let offset = self.buf.len();
        self.buf.push_str(name);
        self.buf.push('\0');
        Ok(NameOffset(offset))
    }

    /// Returns the name stored at `offset`
    pub fn get(&self, offset: NameOffset) -> &str {
        let tail = self.buf.get(offset.0..).unwrap_or("");
        match tail.find('\0') {
            Some(end) => &tail[..end],
            None => tail,
        }
    }

    /// Bytes used, terminators included
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when no name has been stored
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes available in total
    pub fn capacity(&self) -> usize {
        self.limit
    }
}
