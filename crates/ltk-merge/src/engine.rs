use ltk_schemas::ItemIdentity;

use crate::MergedStack;

/// Outcome of one fetch/merge/compare iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDecision {
    /// The first `proven` entries matched the previous iteration position-wise
    /// and both candidate stacks were at least that long.
    PrefixStable { proven: usize },

    /// Both collections are exhausted and the stack stopped growing: every
    /// entry is final. `total` is the deduplicated item count.
    FullyExhausted { total: usize },

    /// Neither condition held; the caller must fetch the next page pair.
    NeedMorePages,
}

impl MergeDecision {
    /// `true` when the iteration loop may stop.
    pub fn is_settled(&self) -> bool {
        !matches!(self, MergeDecision::NeedMorePages)
    }
}

/// Position-wise identity comparison of the requested prefix.
///
/// A proof requires both sides to actually cover `requested` entries; a short
/// stack can never prove a prefix longer than itself.
pub fn prefix_proven(previous: &[ItemIdentity], stack: &MergedStack, requested: usize) -> bool {
    if previous.len() < requested || stack.len() < requested {
        return false;
    }
    stack
        .prefix(requested)
        .iter()
        .zip(previous.iter())
        .all(|(item, prev)| item.kind() == prev.kind && item.id() == prev.id)
}

/// Decide whether the requested prefix is settled after merging a page pair.
///
/// `previous` is the prefix of the candidate stack as it stood before this
/// iteration's pages were absorbed. Check order matters: an explicit prefix
/// proof wins over the exhaustion rule, leaving deeper entries unexposed
/// until they are actually requested.
pub fn evaluate_iteration(
    previous: &[ItemIdentity],
    stack: &MergedStack,
    requested: usize,
    both_exhausted: bool,
    grew: bool,
) -> MergeDecision {
    if requested > 0 && prefix_proven(previous, stack, requested) {
        return MergeDecision::PrefixStable { proven: requested };
    }
    if both_exhausted && !grew {
        return MergeDecision::FullyExhausted { total: stack.len() };
    }
    MergeDecision::NeedMorePages
}
