//! In-memory comment thread.
//!
//! A thread is rebuilt from the flat row set returned by the recursive
//! subtree query. Nodes live in a `Vec` and refer to each other by index; a
//! separate parent -> children index drives a pre-order walk, so the tree
//! never holds references to itself.

use std::collections::HashMap;

use peekhour_db::entities::comment;

/// One comment in thread order.
#[derive(Debug, Clone)]
pub struct ThreadEntry {
    pub comment: comment::Model,
    /// Distance from the thread root (0 for the root itself).
    pub depth: usize,
    /// `/`-joined IDs from the root down to this comment.
    pub path: String,
}

/// Arena of the comments below one root.
#[derive(Debug)]
pub struct CommentThread {
    nodes: Vec<comment::Model>,
    children: Vec<Vec<usize>>,
    root: usize,
    max_depth: usize,
}

impl CommentThread {
    /// Build a thread rooted at `root_id`.
    ///
    /// Rows whose parent is not part of the set are dropped, as is anything
    /// deeper than `max_depth` below the root. Returns `None` when the root is
    /// missing from `rows`.
    #[must_use]
    pub fn build(root_id: &str, rows: Vec<comment::Model>, max_depth: usize) -> Option<Self> {
        let index: HashMap<String, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let root = *index.get(root_id)?;
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];

        for (i, c) in rows.iter().enumerate() {
            if i == root {
                continue;
            }
            let parent = c
                .parent_comment_id
                .as_deref()
                .and_then(|p| index.get(p).copied());
            if let Some(parent) = parent {
                children[parent].push(i);
            }
        }

        // Oldest reply first, ID as tiebreaker
        for list in &mut children {
            list.sort_by(|&a, &b| {
                rows[a]
                    .created_at
                    .cmp(&rows[b].created_at)
                    .then_with(|| rows[a].id.cmp(&rows[b].id))
            });
        }

        Some(Self {
            nodes: rows,
            children,
            root,
            max_depth,
        })
    }

    /// Direct replies of the node at `index`, oldest first.
    fn children_of(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// Consume the arena and return every reachable comment in pre-order.
    #[must_use]
    pub fn into_entries(self) -> Vec<ThreadEntry> {
        let mut order: Vec<(usize, usize, String)> = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, 0usize, self.nodes[self.root].id.clone())];

        while let Some((index, depth, path)) = stack.pop() {
            if depth < self.max_depth {
                // Reverse so the oldest child is popped first
                for &child in self.children_of(index).iter().rev() {
                    let child_path = format!("{path}/{}", self.nodes[child].id);
                    stack.push((child, depth + 1, child_path));
                }
            }
            order.push((index, depth, path));
        }

        let mut slots: Vec<Option<comment::Model>> = self.nodes.into_iter().map(Some).collect();

        order
            .into_iter()
            .filter_map(|(index, depth, path)| {
                slots[index].take().map(|comment| ThreadEntry {
                    comment,
                    depth,
                    path,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn comment_at(id: &str, parent: Option<&str>, depth: i32, minutes: i64) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: "post1".to_string(),
            user_id: "user1".to_string(),
            parent_comment_id: parent.map(ToString::to_string),
            depth,
            content: format!("comment {id}"),
            is_active: true,
            edited_at: None,
            created_at: (Utc::now() + Duration::minutes(minutes)).into(),
            updated_at: None,
        }
    }

    fn ids(entries: &[ThreadEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.comment.id.as_str()).collect()
    }

    #[test]
    fn test_walk_is_pre_order() {
        // a
        // ├── b
        // │   └── c
        // └── d
        //     └── e
        let rows = vec![
            comment_at("e", Some("d"), 2, 4),
            comment_at("a", None, 0, 0),
            comment_at("d", Some("a"), 1, 2),
            comment_at("b", Some("a"), 1, 1),
            comment_at("c", Some("b"), 2, 3),
        ];

        let entries = CommentThread::build("a", rows, 5).unwrap().into_entries();

        assert_eq!(ids(&entries), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_depth_and_path_are_relative_to_root() {
        let rows = vec![
            comment_at("b", Some("a"), 2, 1),
            comment_at("a", Some("root"), 1, 0),
            comment_at("c", Some("b"), 3, 2),
        ];

        let entries = CommentThread::build("a", rows, 5).unwrap().into_entries();

        assert_eq!(entries[0].depth, 0);
        assert_eq!(entries[0].path, "a");
        assert_eq!(entries[2].depth, 2);
        assert_eq!(entries[2].path, "a/b/c");
    }

    #[test]
    fn test_children_ordered_oldest_first() {
        let rows = vec![
            comment_at("a", None, 0, 0),
            comment_at("late", Some("a"), 1, 10),
            comment_at("early", Some("a"), 1, 1),
        ];

        let entries = CommentThread::build("a", rows, 5).unwrap().into_entries();

        assert_eq!(ids(&entries), vec!["a", "early", "late"]);
    }

    #[test]
    fn test_depth_bound_cuts_walk() {
        let rows = vec![
            comment_at("a", None, 0, 0),
            comment_at("b", Some("a"), 1, 1),
            comment_at("c", Some("b"), 2, 2),
            comment_at("d", Some("c"), 3, 3),
        ];

        let entries = CommentThread::build("a", rows, 2).unwrap().into_entries();

        assert_eq!(ids(&entries), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_orphans_are_dropped() {
        let rows = vec![
            comment_at("a", None, 0, 0),
            comment_at("b", Some("a"), 1, 1),
            comment_at("stray", Some("elsewhere"), 1, 2),
        ];

        let entries = CommentThread::build("a", rows, 5).unwrap().into_entries();

        assert_eq!(ids(&entries), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_root() {
        let rows = vec![comment_at("b", Some("a"), 1, 1)];
        assert!(CommentThread::build("a", rows, 5).is_none());
    }
}
