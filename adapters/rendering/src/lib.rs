#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Portal Snake adapters.

use anyhow::Result as AnyResult;
use portal_snake_core::{Cell, Direction, PortalRole};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors assigned to every kind of tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Color of wall cells.
    pub wall: Color,
    /// Color of the snake head.
    pub head: Color,
    /// Color of the remaining body segments.
    pub body: Color,
    /// Color of fruit cells.
    pub fruit: Color,
    /// Color of the portal entrance.
    pub entrance: Color,
    /// Color of the portal exit.
    pub exit: Color,
}

impl Palette {
    /// Color used for the provided tile, `None` for empty cells.
    #[must_use]
    pub const fn color(&self, tile: Tile) -> Option<Color> {
        match tile {
            Tile::Empty => None,
            Tile::Wall => Some(self.wall),
            Tile::Head => Some(self.head),
            Tile::Body => Some(self.body),
            Tile::Fruit => Some(self.fruit),
            Tile::Portal(PortalRole::Entrance) => Some(self.entrance),
            Tile::Portal(PortalRole::Exit) => Some(self.exit),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: Color::from_rgb_u8(0x6d, 0x6d, 0x7a),
            head: Color::from_rgb_u8(0x3c, 0xd0, 0x5a),
            body: Color::from_rgb_u8(0x2f, 0x95, 0x32),
            fruit: Color::from_rgb_u8(0xc8, 0x2a, 0x36),
            entrance: Color::from_rgb_u8(0x58, 0x47, 0xff),
            exit: Color::from_rgb_u8(0xff, 0xc1, 0x07),
        }
    }
}

/// Content of a single grid cell as seen by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Nothing occupies the cell.
    Empty,
    /// Wall cell.
    Wall,
    /// Snake head.
    Head,
    /// Visible body segment.
    Body,
    /// Fruit waiting to be eaten.
    Fruit,
    /// Open portal of the given role.
    Portal(PortalRole),
}

/// Dimensions of the drawable grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPresentation {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError::EmptyGrid`] when either dimension is zero.
    pub fn new(columns: u32, rows: u32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        Ok(Self { columns, rows })
    }

    /// Reports whether the cell lies within the drawable grid.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        u32::try_from(cell.x()).map_or(false, |x| x < self.columns)
            && u32::try_from(cell.y()).map_or(false, |y| y < self.rows)
    }
}

/// Scene description combining the grid, walls and inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Wall cells.
    pub walls: Vec<Cell>,
    /// Visible snake segments, head first.
    pub snake: Vec<Cell>,
    /// Direction the head is facing.
    pub heading: Direction,
    /// Fruit cells.
    pub fruit: Vec<Cell>,
    /// Open portals with their roles.
    pub portals: Vec<(Cell, PortalRole)>,
    /// Current score.
    pub score: u32,
    /// Indicates whether the game has ended.
    pub game_over: bool,
}

impl Scene {
    /// Creates an empty scene for the provided grid.
    #[must_use]
    pub fn new(grid: GridPresentation) -> Self {
        Self {
            grid,
            walls: Vec::new(),
            snake: Vec::new(),
            heading: Direction::North,
            fruit: Vec::new(),
            portals: Vec::new(),
            score: 0,
            game_over: false,
        }
    }

    /// Tile drawn at the provided cell.
    ///
    /// The snake is drawn above portals and fruit, which are drawn above walls.
    #[must_use]
    pub fn tile_at(&self, cell: Cell) -> Tile {
        if self.snake.first() == Some(&cell) {
            return Tile::Head;
        }
        if self.snake.contains(&cell) {
            return Tile::Body;
        }
        if let Some((_, role)) = self.portals.iter().find(|(portal, _)| *portal == cell) {
            return Tile::Portal(*role);
        }
        if self.fruit.contains(&cell) {
            return Tile::Fruit;
        }
        if self.walls.contains(&cell) {
            return Tile::Wall;
        }
        Tile::Empty
    }
}

/// Returns the body segments that should be drawn.
///
/// Segments still inside the exit column at or below the exit row are hidden
/// so the snake appears to emerge from the portal. The head is always drawn.
#[must_use]
pub fn visible_segments(body: &[Cell], exit: Option<Cell>) -> Vec<Cell> {
    let Some(exit) = exit else {
        return body.to_vec();
    };
    body.iter()
        .enumerate()
        .filter(|(index, segment)| {
            *index == 0 || !(segment.x() == exit.x() && segment.y() >= exit.y())
        })
        .map(|(_, segment)| *segment)
        .collect()
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction requested by the player on this frame.
    pub steer: Option<Direction>,
    /// Whether the player requested a new game on this frame.
    pub reset: bool,
}

/// Decision returned by the scene update closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Stop the backend after presenting the current frame.
    Exit,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub title: String,
    /// Palette used to draw tiles.
    pub palette: Palette,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, palette: Palette, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            palette,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Portal Snake scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update closure asks it to stop.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The grid must contain at least one cell.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must not be empty (received {columns}x{rows})")
            }
        }
    }
}

impl Error for RenderingError {}
