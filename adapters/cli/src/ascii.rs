use std::{io::Write, time::Duration};

use anyhow::{Context, Result as AnyResult};
use portal_snake_core::{Cell, PortalRole};
use portal_snake_rendering::{
    FrameControl, FrameInput, Presentation, RenderingBackend, Scene, Tile,
};

/// Headless backend printing the board as text.
#[derive(Debug)]
pub(crate) struct AsciiBackend<W> {
    writer: W,
    frames: u32,
    frame_every: u32,
    frame_dt: Duration,
}

impl<W: Write> AsciiBackend<W> {
    /// Creates a backend that simulates `frames` frames and prints every
    /// `frame_every`-th one, plus the last.
    pub(crate) fn new(writer: W, frames: u32, frame_every: u32, frame_dt: Duration) -> Self {
        Self {
            writer,
            frames,
            frame_every: frame_every.max(1),
            frame_dt,
        }
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl,
    {
        let Presentation {
            title, mut scene, ..
        } = presentation;
        writeln!(self.writer, "{title}").context("failed to write title")?;

        for frame in 0..self.frames {
            let control = update_scene(self.frame_dt, FrameInput::default(), &mut scene);
            let last = control == FrameControl::Exit || frame + 1 == self.frames;
            if frame % self.frame_every == 0 || last {
                write!(self.writer, "{}", render_frame(frame, &scene))
                    .context("failed to write frame")?;
            }
            if control == FrameControl::Exit {
                break;
            }
        }

        self.writer.flush().context("failed to flush frames")
    }
}

/// Renders the scene as a status line followed by one text row per grid row.
pub(crate) fn render_frame(frame: u32, scene: &Scene) -> String {
    let mut text = format!("frame {frame} score {}", scene.score);
    if scene.game_over {
        text.push_str(" game over");
    }
    text.push('\n');

    for y in 0..scene.grid.rows {
        for x in 0..scene.grid.columns {
            let cell = Cell::new(x as i32, y as i32);
            text.push(glyph(scene.tile_at(cell)));
        }
        text.push('\n');
    }
    text
}

fn glyph(tile: Tile) -> char {
    match tile {
        Tile::Empty => ' ',
        Tile::Wall => '#',
        Tile::Head => '@',
        Tile::Body => 'o',
        Tile::Fruit => '*',
        Tile::Portal(PortalRole::Entrance) => 'O',
        Tile::Portal(PortalRole::Exit) => 'X',
    }
}
