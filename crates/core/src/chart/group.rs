//! Account group nesting rules.
//!
//! Groups form a forest at most two levels deep: a top-level group may own
//! child groups, a child group may not. Children always carry their parent's
//! class.

use crate::error::AccountingError;

/// The parts of a stored group that placement rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupNode {
    /// Group id.
    pub id: i64,
    /// Parent group id, `None` for top-level groups.
    pub parent_id: Option<i64>,
    /// Account class id.
    pub class_id: i64,
}

/// A group about to be created or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDraft {
    /// Id of the group being updated, `None` when creating.
    pub id: Option<i64>,
    /// Requested parent. `Some(0)` is treated as no parent.
    pub parent_id: Option<i64>,
    /// Requested class; overridden by the parent's class for child groups.
    pub class_id: i64,
    /// Whether the group being updated already owns child groups.
    pub has_children: bool,
}

/// Where a group ends up after the nesting rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPlacement {
    /// Effective parent id.
    pub parent_id: Option<i64>,
    /// Effective class id.
    pub class_id: i64,
}

impl GroupDraft {
    /// Returns the requested parent id with `0` mapped to `None`.
    #[must_use]
    pub fn requested_parent(&self) -> Option<i64> {
        self.parent_id.filter(|id| *id != 0)
    }
}

/// Applies the nesting rules to a draft.
///
/// `parent` is the stored row for `draft.requested_parent()`, or `None` if
/// the lookup found nothing.
///
/// # Errors
///
/// - `AccountGroupNotFound` if a parent was requested but does not exist
/// - `InvalidParent` if the group would parent itself, if the parent is itself
///   a child group, or if a group that owns children would become a child
pub fn resolve_placement(
    draft: &GroupDraft,
    parent: Option<&GroupNode>,
) -> Result<GroupPlacement, AccountingError> {
    let Some(parent_id) = draft.requested_parent() else {
        return Ok(GroupPlacement {
            parent_id: None,
            class_id: draft.class_id,
        });
    };

    if draft.id == Some(parent_id) {
        return Err(AccountingError::InvalidParent(format!(
            "group {parent_id} cannot be its own parent"
        )));
    }

    let parent = parent.ok_or(AccountingError::AccountGroupNotFound(parent_id))?;

    if parent.parent_id.is_some() {
        return Err(AccountingError::InvalidParent(format!(
            "group {parent_id} is already a child group"
        )));
    }

    if draft.has_children {
        return Err(AccountingError::InvalidParent(
            "a group with child groups cannot become a child".to_string(),
        ));
    }

    Ok(GroupPlacement {
        parent_id: Some(parent.id),
        class_id: parent.class_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_level(id: i64, class_id: i64) -> GroupNode {
        GroupNode {
            id,
            parent_id: None,
            class_id,
        }
    }

    fn draft(parent_id: Option<i64>, class_id: i64) -> GroupDraft {
        GroupDraft {
            id: None,
            parent_id,
            class_id,
            has_children: false,
        }
    }

    #[test]
    fn test_top_level_keeps_requested_class() {
        let placement = resolve_placement(&draft(None, 4), None).unwrap();
        assert_eq!(placement.parent_id, None);
        assert_eq!(placement.class_id, 4);
    }

    #[test]
    fn test_zero_parent_means_top_level() {
        let placement = resolve_placement(&draft(Some(0), 2), None).unwrap();
        assert_eq!(placement.parent_id, None);
        assert_eq!(placement.class_id, 2);
    }

    #[test]
    fn test_child_inherits_parent_class() {
        let parent = top_level(10, 1);
        let placement = resolve_placement(&draft(Some(10), 6), Some(&parent)).unwrap();

        assert_eq!(placement.parent_id, Some(10));
        assert_eq!(placement.class_id, 1);
    }

    #[test]
    fn test_missing_parent_is_not_found() {
        let result = resolve_placement(&draft(Some(99), 1), None);
        assert_eq!(result, Err(AccountingError::AccountGroupNotFound(99)));
    }

    #[test]
    fn test_grandchild_is_rejected() {
        let child = GroupNode {
            id: 11,
            parent_id: Some(10),
            class_id: 1,
        };
        let result = resolve_placement(&draft(Some(11), 1), Some(&child));
        assert!(matches!(result, Err(AccountingError::InvalidParent(_))));
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let group = top_level(5, 1);
        let update = GroupDraft {
            id: Some(5),
            parent_id: Some(5),
            class_id: 1,
            has_children: false,
        };
        let result = resolve_placement(&update, Some(&group));
        assert!(matches!(result, Err(AccountingError::InvalidParent(_))));
    }

    #[test]
    fn test_group_with_children_cannot_become_child() {
        let parent = top_level(1, 1);
        let update = GroupDraft {
            id: Some(2),
            parent_id: Some(1),
            class_id: 1,
            has_children: true,
        };
        let result = resolve_placement(&update, Some(&parent));
        assert!(matches!(result, Err(AccountingError::InvalidParent(_))));
    }
}
