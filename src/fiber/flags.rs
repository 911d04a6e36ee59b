//! Side-effect flags.

bitflags::bitflags! {
    /// Pending side effects on a fiber.
    ///
    /// `flags` holds a fiber's own effects; `subtree_flags` is the union of
    /// every descendant's `flags`, so the commit phase can skip clean subtrees.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u8 {
        /// Host node must be inserted, or moved to a new position.
        const PLACEMENT = 1 << 1;
        /// Host node content or attributes changed.
        const UPDATE = 1 << 2;
        /// One or more children are listed in `deletions`.
        const CHILD_DELETION = 1 << 4;

        /// Effects applied during commit.
        const MUTATION_MASK = Self::PLACEMENT.bits()
            | Self::UPDATE.bits()
            | Self::CHILD_DELETION.bits();
    }
}
