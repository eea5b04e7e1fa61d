//! Snake body bookkeeping owned by the world.

use portal_snake_core::{Cell, Direction};

/// Ordered snake body, head first, together with its heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Cell>,
    direction: Direction,
    next_direction: Direction,
}

impl Snake {
    /// Creates a snake whose body trails behind the head, opposite to `direction`.
    ///
    /// A zero `length` still produces a single-cell snake.
    #[must_use]
    pub fn new(head: Cell, direction: Direction, length: usize) -> Self {
        let trailing = direction.opposite();
        let mut body = Vec::with_capacity(length.max(1));
        let mut cell = head;
        for _ in 0..length.max(1) {
            body.push(cell);
            cell = cell.step(trailing);
        }
        Self {
            body,
            direction,
            next_direction: direction,
        }
    }

    /// Body cells ordered head first.
    #[must_use]
    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    /// Cell occupied by the head.
    #[must_use]
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Number of body segments, duplicated tail segments included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always `false`; a snake keeps at least its head.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Heading applied on the most recent step.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Heading that the next step will use.
    #[must_use]
    pub fn pending_direction(&self) -> Direction {
        self.next_direction
    }

    /// Reports whether any segment occupies the cell.
    #[must_use]
    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Queues a turn for the next step, ignoring reversals onto the body.
    pub fn change_direction(&mut self, direction: Direction) {
        if direction == self.direction.opposite() {
            return;
        }
        self.next_direction = direction;
    }

    /// Forces the heading, bypassing the reversal guard.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.next_direction = direction;
    }

    /// Replaces the body wholesale. Empty bodies are ignored.
    pub fn set_body(&mut self, body: Vec<Cell>) {
        if body.is_empty() {
            return;
        }
        self.body = body;
    }

    /// Appends a copy of the tail segment.
    pub fn grow_by_one(&mut self) {
        let tail = self.body[self.body.len() - 1];
        self.body.push(tail);
    }

    /// Truncates the body to at most `length` segments, keeping at least the head.
    pub fn shrink_to(&mut self, length: usize) {
        self.body.truncate(length.max(1));
    }

    /// Moves the head one cell along the pending heading and drops the tail.
    ///
    /// Returns the new head cell.
    pub fn advance(&mut self) -> Cell {
        self.direction = self.next_direction;
        let head = self.head().step(self.direction);
        self.body.insert(0, head);
        let _ = self.body.pop();
        head
    }
}
