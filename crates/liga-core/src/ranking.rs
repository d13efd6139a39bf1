// Ranking table ordering: moving teams, renumbering positions, and the drag
// state machine used by the detail screen.

use crate::model::Team;

// ---------------------------------------------------------------------------
// Ordering primitives
// ---------------------------------------------------------------------------

/// Remove the item at `from` and reinsert it at `to`.
///
/// Returns `false` (and leaves `items` untouched) when either index is out of
/// range or the indices are equal.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let moved = items.remove(from);
    items.insert(to, moved);
    true
}

/// Rewrite every team's position to `index + 1`.
pub fn renumber(teams: &mut [Team]) {
    for (idx, team) in teams.iter_mut().enumerate() {
        team.position = idx as u32 + 1;
    }
}

/// True when positions are exactly `1..=n` in slice order.
pub fn is_contiguous(teams: &[Team]) -> bool {
    teams
        .iter()
        .enumerate()
        .all(|(idx, team)| team.position == idx as u32 + 1)
}

/// Sort by position, ties broken by name so the order is deterministic.
pub fn sort_by_position(teams: &mut [Team]) {
    teams.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
}

/// A reorder computed locally, before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Reorder {
    /// The order shown before the move; restored if persisting fails.
    pub previous: Vec<Team>,
    /// The new order with positions already rewritten to `1..=n`.
    pub next: Vec<Team>,
}

/// Compute the result of dragging the team at `from` onto `to`.
///
/// Returns `None` when the move would not change any position: equal or
/// out-of-range indices on a list whose positions are already contiguous.
pub fn reorder(teams: &[Team], from: usize, to: usize) -> Option<Reorder> {
    let mut next = teams.to_vec();
    let moved = move_item(&mut next, from, to);
    if !moved && is_contiguous(teams) {
        return None;
    }
    renumber(&mut next);
    Some(Reorder {
        previous: teams.to_vec(),
        next,
    })
}

// ---------------------------------------------------------------------------
// Drag state machine
// ---------------------------------------------------------------------------

/// Vertical extent of one rendered row, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub top: u16,
    pub bottom: u16,
}

impl RowBounds {
    /// Bounds containing no coordinate, for rows scrolled out of view.
    pub const HIDDEN: RowBounds = RowBounds { top: 1, bottom: 0 };
}

/// Find the row whose bounds contain `y`.
pub fn row_at(y: u16, rows: &[RowBounds]) -> Option<usize> {
    rows.iter().position(|r| y >= r.top && y <= r.bottom)
}

/// Drag-to-reorder interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { source: usize, target: usize },
}

/// Outcome of releasing a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropMove {
    pub from: usize,
    pub to: usize,
}

impl DragState {
    /// Pick up the item at `index`.
    pub fn pick_up(&mut self, index: usize) {
        *self = DragState::Dragging {
            source: index,
            target: index,
        };
    }

    /// Record the item currently under the pointer. Ignored while idle.
    pub fn hover(&mut self, index: usize) {
        if let DragState::Dragging { target, .. } = self {
            *target = index;
        }
    }

    /// Infer the hovered item from a pointer Y coordinate and the rendered
    /// row bounds. Pointer positions outside every row keep the last target.
    pub fn hover_at(&mut self, y: u16, rows: &[RowBounds]) {
        if let Some(index) = row_at(y, rows) {
            self.hover(index);
        }
    }

    /// Move the target one row up or down within `len` rows (keyboard drag).
    pub fn step(&mut self, delta: isize, len: usize) {
        if let DragState::Dragging { target, .. } = self {
            if len == 0 {
                return;
            }
            let next = (*target as isize + delta).clamp(0, len as isize - 1);
            *target = next as usize;
        }
    }

    /// Release the item. Returns the move to apply, or `None` when nothing
    /// was being dragged or it was dropped where it started.
    pub fn release(&mut self) -> Option<DropMove> {
        let state = std::mem::take(self);
        match state {
            DragState::Dragging { source, target } if source != target => Some(DropMove {
                from: source,
                to: target,
            }),
            _ => None,
        }
    }

    /// Abandon the drag without moving anything.
    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn source(&self) -> Option<usize> {
        match self {
            DragState::Dragging { source, .. } => Some(*source),
            DragState::Idle => None,
        }
    }

    pub fn target(&self) -> Option<usize> {
        match self {
            DragState::Dragging { target, .. } => Some(*target),
            DragState::Idle => None,
        }
    }
}
