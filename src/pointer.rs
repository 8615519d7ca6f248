use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The five reflecting instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    /// `/`
    Slash,
    /// `\`
    Backslash,
    /// `|`
    Vertical,
    /// `_`
    Horizontal,
    /// `#`
    Reverse,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    #[inline(always)]
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Direction after hitting `mirror`. Pure: depends on nothing else.
    pub fn reflect(self, mirror: Mirror) -> Direction {
        use Direction::*;
        match (mirror, self) {
            (Mirror::Slash, Right) => Up,
            (Mirror::Slash, Left) => Down,
            (Mirror::Slash, Up) => Right,
            (Mirror::Slash, Down) => Left,
            (Mirror::Backslash, Right) => Down,
            (Mirror::Backslash, Left) => Up,
            (Mirror::Backslash, Up) => Left,
            (Mirror::Backslash, Down) => Right,
            (Mirror::Vertical, Left | Right) => self.opposite(),
            (Mirror::Horizontal, Up | Down) => self.opposite(),
            (Mirror::Vertical | Mirror::Horizontal, _) => self,
            (Mirror::Reverse, _) => self.opposite(),
        }
    }
}

impl Mirror {
    pub fn from_char(c: char) -> Option<Mirror> {
        match c {
            '/' => Some(Mirror::Slash),
            '\\' => Some(Mirror::Backslash),
            '|' => Some(Mirror::Vertical),
            '_' => Some(Mirror::Horizontal),
            '#' => Some(Mirror::Reverse),
            _ => None,
        }
    }
}

/// Position and heading on a `Grid`. Coordinates always stay inside the
/// grid: every move wraps rather than clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionPointer {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

impl Default for InstructionPointer {
    fn default() -> Self {
        Self { x: 0, y: 0, direction: Direction::Right }
    }
}

impl InstructionPointer {
    /// Step one cell along `direction`, wrapping on both axes.
    pub fn move_on(&mut self, grid: &Grid) {
        let (dx, dy) = self.direction.delta();
        self.jump_to(self.x as i64 + dx, self.y as i64 + dy, grid);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn reflect(&mut self, mirror: Mirror) {
        self.direction = self.direction.reflect(mirror);
    }

    /// Place the pointer at arbitrary coordinates, wrapped onto the grid.
    pub fn jump_to(&mut self, x: i64, y: i64, grid: &Grid) {
        (self.x, self.y) = grid.wrap(x, y);
    }
}
