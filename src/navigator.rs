//! Segment navigator: steps through a multi-floor route one segment at a time
//! and words the instruction for each step.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use crate::route::{EndNodeType, NavigationPath, PathSegment};

/// Cursor over the segments of a [`NavigationPath`].
///
/// The index stays in `[0, N-1]`; on an empty path it is pinned at 0 and
/// there is no current segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentNavigator {
    path: NavigationPath,
    index: usize,
}

impl SegmentNavigator {
    #[must_use]
    pub fn new(path: NavigationPath) -> Self {
        Self { path, index: 0 }
    }

    #[must_use]
    pub fn path(&self) -> &NavigationPath {
        &self.path
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.path.segment_count()
    }

    #[must_use]
    pub fn current(&self) -> Option<&PathSegment> {
        self.path.segment_at(self.index)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.index + 1 < self.segment_count()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Advance one segment. Returns `false` (and does nothing) on the last one.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Step back one segment. Returns `false` (and does nothing) on the first one.
    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Human-readable instruction for the current segment.
    #[must_use]
    pub fn instruction(&self) -> Option<String> {
        let current = self.current()?;
        let floor = &current.floor_id;
        let n = self.segment_count();

        if n == 1 {
            return Some(format!("Follow the path on floor {floor} to your destination."));
        }

        let arrival = match self.index.checked_sub(1).and_then(|i| self.path.segment_at(i)) {
            Some(prev) => arrival_phrase(prev.end_node_type),
            None => "Follow the path",
        };

        match self.index.checked_add(1).and_then(|i| self.path.segment_at(i)) {
            Some(next) => Some(format!(
                "{arrival} on floor {floor}. {}.",
                transition_phrase(current.end_node_type, &next.floor_id)
            )),
            None => Some(format!("{arrival} on floor {floor} to your destination.")),
        }
    }

    /// `"Floor: F (Segment i/N)"`, one-based.
    #[must_use]
    pub fn progress_label(&self) -> Option<String> {
        let current = self.current()?;
        Some(format!("Floor: {} (Segment {}/{})", current.floor_id, self.index + 1, self.segment_count()))
    }

    /// `"Displaying segment i of N."`, one-based.
    #[must_use]
    pub fn status_message(&self) -> Option<String> {
        self.current()?;
        Some(format!("Displaying segment {} of {}.", self.index + 1, self.segment_count()))
    }
}

fn transition_phrase(end: EndNodeType, next_floor: &str) -> String {
    match end {
        EndNodeType::Stairs => format!("Take the stairs to floor {next_floor}"),
        EndNodeType::Elevator => format!("Take the elevator to floor {next_floor}"),
        EndNodeType::None => format!("Proceed towards floor {next_floor}"),
    }
}

fn arrival_phrase(prev_end: EndNodeType) -> &'static str {
    match prev_end {
        EndNodeType::Stairs => "After taking the stairs, follow the path",
        EndNodeType::Elevator => "After taking the elevator, follow the path",
        EndNodeType::None => "Follow the path",
    }
}
