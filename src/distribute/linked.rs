//! Linked distribution: one extra pass for content that carries its own rules

use crate::core::types::RuleNamespace;
use crate::distribute::AppliedContent;
use crate::rules::repository::{CategoryTable, RuleRepository};

/// Invoke `f` once per applied ref that has a linked rule set registered
/// under `namespace`, in application order.
///
/// The cascade is exactly one level deep: content applied inside `f` is
/// never fed back into another lookup, which keeps propagation through
/// content graphs bounded and cycle-free.
pub fn cascade<F>(
    repository: &RuleRepository,
    namespace: RuleNamespace,
    applied: &AppliedContent,
    mut f: F,
) where
    F: FnMut(&CategoryTable),
{
    for &content in applied.refs() {
        if let Some(table) = repository.linked_set(namespace, content) {
            f(table);
        }
    }
}
