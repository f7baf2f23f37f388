//! The 3x3 board, its cells and coordinates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Board side length.
pub const SIZE: usize = 3;

/// The eight lines that win the game: three rows, three columns, two
/// diagonals. Row-major coordinates.
pub const WIN_LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// A player's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Mark {
    /// Moves first.
    X,
    /// Moves second.
    O,
}

impl Mark {
    /// The other player.
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    /// The cell this mark occupies.
    pub fn cell(self) -> Cell {
        match self {
            Self::X => Cell::X,
            Self::O => Cell::O,
        }
    }

    /// `"X"` or `"O"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of one cell. Serializes as `""`, `"X"` or `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    #[serde(rename = "")]
    Empty,
    /// Taken by X.
    X,
    /// Taken by O.
    O,
}

impl Cell {
    /// Whether nobody has played here.
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// The mark occupying this cell.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Self::Empty => None,
            Self::X => Some(Mark::X),
            Self::O => Some(Mark::O),
        }
    }
}

/// A board coordinate.
///
/// Signed so that out-of-bounds proposals from workers survive decoding and
/// can be rejected by [`Board::validate`] instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    /// Row, 0 at the top.
    pub row: i32,
    /// Column, 0 on the left.
    pub col: i32,
}

impl Position {
    /// The center cell.
    pub const CENTER: Position = Position { row: 1, col: 1 };

    /// The four corners in row-major order.
    pub const CORNERS: [Position; 4] = [
        Position { row: 0, col: 0 },
        Position { row: 0, col: 2 },
        Position { row: 2, col: 0 },
        Position { row: 2, col: 2 },
    ];

    /// The four edge midpoints in row-major order.
    pub const SIDES: [Position; 4] = [
        Position { row: 0, col: 1 },
        Position { row: 1, col: 0 },
        Position { row: 1, col: 2 },
        Position { row: 2, col: 1 },
    ];

    /// Create a position.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Array indices, if within the board.
    pub fn index(self) -> Option<(usize, usize)> {
        let row = usize::try_from(self.row).ok()?;
        let col = usize::try_from(self.col).ok()?;
        (row < SIZE && col < SIZE).then_some((row, col))
    }

    /// The corner diagonally opposite this one. `None` for non-corners.
    pub fn opposite_corner(self) -> Option<Position> {
        Self::CORNERS
            .contains(&self)
            .then(|| Position::new(2 - self.row, 2 - self.col))
    }

    fn from_index((row, col): (usize, usize)) -> Self {
        // Indices come from SIZE-bounded loops.
        Self::new(row as i32, col as i32)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Why an action was rejected by the validation gate.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalAction {
    /// The target lies outside the 3x3 board.
    #[error("position {0} is out of bounds")]
    OutOfBounds(Position),
    /// The target cell is already taken.
    #[error("position {0} is occupied")]
    Occupied(Position),
}

/// A 3x3 board. Serializes as a nested array of cells,
/// `[["","",""],["","",""],["","",""]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Board(pub [[Cell; SIZE]; SIZE]);

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from rows of `'X'`, `'O'` and anything else for empty.
    ///
    /// ```
    /// use trio_game::{Board, Cell, Position};
    ///
    /// let b = Board::from_rows(["XX.", ".O.", "..."]);
    /// assert_eq!(b.get(Position::new(0, 1)), Some(Cell::X));
    /// assert_eq!(b.get(Position::new(0, 2)), Some(Cell::Empty));
    /// ```
    pub fn from_rows(rows: [&str; SIZE]) -> Self {
        let mut board = Self::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().take(SIZE).enumerate() {
                board.0[r][c] = match ch {
                    'X' | 'x' => Cell::X,
                    'O' | 'o' => Cell::O,
                    _ => Cell::Empty,
                };
            }
        }
        board
    }

    /// The cell at `pos`, `None` if out of bounds.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        pos.index().map(|(r, c)| self.0[r][c])
    }

    /// The validation rule: a target is legal iff it lies within the board
    /// and the cell is empty.
    pub fn validate(&self, pos: Position) -> Result<(), IllegalAction> {
        match self.get(pos) {
            None => Err(IllegalAction::OutOfBounds(pos)),
            Some(Cell::Empty) => Ok(()),
            Some(_) => Err(IllegalAction::Occupied(pos)),
        }
    }

    /// Place `mark` at `pos` after validating it.
    pub fn place(&mut self, pos: Position, mark: Mark) -> Result<(), IllegalAction> {
        self.validate(pos)?;
        if let Some((r, c)) = pos.index() {
            self.0[r][c] = mark.cell();
        }
        Ok(())
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        self.positions().filter(|p| self.is_empty_at(*p)).collect()
    }

    /// Whether no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.0.iter().flatten().all(|c| !c.is_empty())
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.0.iter().flatten().filter(|c| !c.is_empty()).count()
    }

    /// 1-based number of the next move.
    pub fn move_number(&self) -> u32 {
        self.occupied() as u32 + 1
    }

    /// The player to act, assuming X moved first.
    pub fn to_act(&self) -> Mark {
        if self.occupied() % 2 == 0 { Mark::X } else { Mark::O }
    }

    /// The mark that owns a complete line, if any.
    pub fn winner(&self) -> Option<Mark> {
        WIN_LINES.iter().find_map(|line| {
            let [a, b, c] = line.map(|(r, c)| self.0[r][c]);
            if a == b && b == c { a.mark() } else { None }
        })
    }

    /// Empty cells that would complete a line for `mark`, row-major,
    /// without duplicates.
    pub fn completion_cells(&self, mark: Mark) -> Vec<Position> {
        let own = mark.cell();
        let mut cells: Vec<Position> = WIN_LINES
            .iter()
            .filter_map(|line| {
                let cells = line.map(|idx| (idx, self.0[idx.0][idx.1]));
                let owned = cells.iter().filter(|(_, c)| *c == own).count();
                let empty: Vec<_> = cells.iter().filter(|(_, c)| c.is_empty()).collect();
                (owned == 2 && empty.len() == 1).then(|| Position::from_index(empty[0].0))
            })
            .collect();
        cells.sort();
        cells.dedup();
        cells
    }

    /// Empty cells where `mark` would create two completion threats at once.
    pub fn fork_cells(&self, mark: Mark) -> Vec<Position> {
        self.empty_cells()
            .into_iter()
            .filter(|pos| {
                let mut next = *self;
                next.place(*pos, mark).is_ok() && next.completion_cells(mark).len() >= 2
            })
            .collect()
    }

    fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(Cell::is_empty)
    }

    fn positions(&self) -> impl Iterator<Item = Position> {
        (0..SIZE).flat_map(|r| (0..SIZE).map(move |c| Position::from_index((r, c))))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                f.write_str(match cell {
                    Cell::Empty => ".",
                    Cell::X => "X",
                    Cell::O => "O",
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn board_serializes_as_nested_strings() {
        let b = Board::from_rows(["XX.", ".O.", "..."]);
        assert_eq!(
            serde_json::to_value(b).unwrap(),
            json!([["X", "X", ""], ["", "O", ""], ["", "", ""]])
        );
        let back: Board = serde_json::from_value(json!([["X", "X", ""], ["", "O", ""], ["", "", ""]]))
            .unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn validate_rejects_out_of_bounds_and_occupied() {
        let b = Board::from_rows(["X..", "...", "..."]);
        assert_eq!(
            b.validate(Position::new(3, 0)),
            Err(IllegalAction::OutOfBounds(Position::new(3, 0)))
        );
        assert_eq!(
            b.validate(Position::new(-1, 1)),
            Err(IllegalAction::OutOfBounds(Position::new(-1, 1)))
        );
        assert_eq!(
            b.validate(Position::new(0, 0)),
            Err(IllegalAction::Occupied(Position::new(0, 0)))
        );
        assert!(b.validate(Position::new(2, 2)).is_ok());
    }

    #[test]
    fn winner_detects_rows_columns_diagonals() {
        assert_eq!(Board::from_rows(["XXX", "OO.", "..."]).winner(), Some(Mark::X));
        assert_eq!(Board::from_rows(["XO.", "XO.", ".O."]).winner(), Some(Mark::O));
        assert_eq!(Board::from_rows(["X.O", ".O.", "O.X"]).winner(), Some(Mark::O));
        assert_eq!(Board::from_rows(["XO.", "...", "..."]).winner(), None);
    }

    #[test]
    fn completion_cells_are_row_major_and_unique() {
        // X threatens (0,2) via the row and (2,0) via the column.
        let b = Board::from_rows(["XX.", "X..", "..."]);
        assert_eq!(
            b.completion_cells(Mark::X),
            vec![Position::new(0, 2), Position::new(2, 0)]
        );
        assert!(b.completion_cells(Mark::O).is_empty());
    }

    #[test]
    fn fork_cells_find_double_threats() {
        let b = Board::from_rows(["X..", "...", "..X"]);
        assert!(b.fork_cells(Mark::X).contains(&Position::new(0, 2)));
        assert!(b.fork_cells(Mark::X).contains(&Position::new(2, 0)));
    }

    #[test]
    fn move_number_counts_marks() {
        assert_eq!(Board::new().move_number(), 1);
        assert_eq!(Board::from_rows(["XO.", "...", "..."]).move_number(), 3);
    }

    #[test]
    fn opposite_corner() {
        assert_eq!(
            Position::new(0, 0).opposite_corner(),
            Some(Position::new(2, 2))
        );
        assert_eq!(Position::CENTER.opposite_corner(), None);
    }
}
