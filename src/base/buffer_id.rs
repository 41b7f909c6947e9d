//! Handles for the buffers an engine host has open.

use std::fmt;

/// Names one open buffer of an [`EngineHost`](crate::EngineHost).
///
/// The host issues ids in opening order and never hands out the same id
/// twice, so an id kept after [`close`](crate::EngineHost::close) stays
/// unknown rather than aliasing a later buffer. Editor adapters map their
/// own document objects onto these ids.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct BufferId(u32);

impl BufferId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// The id issued after this one.
    #[inline]
    pub(crate) const fn successor(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferId({})", self.0)
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

impl From<u32> for BufferId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_id_display() {
        assert_eq!(BufferId::new(3).to_string(), "buffer#3");
        assert_eq!(format!("{:?}", BufferId::from(7)), "BufferId(7)");
    }

    #[test]
    fn test_successors_follow_opening_order() {
        let first = BufferId::default();
        let second = first.successor();
        assert_eq!(second.index(), 1);
        assert!(first < second);
        assert!(second < second.successor());
    }
}
