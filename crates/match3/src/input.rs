use crate::components::{Position, SWIPE_THRESHOLD};

/// Pointer events in screen pixels, as forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began at (x, y).
    PointerDown { x: f32, y: f32 },
    /// A touch/cursor moved to (x, y).
    PointerMove { x: f32, y: f32 },
    /// A touch/click ended at (x, y).
    PointerUp { x: f32, y: f32 },
}

/// What a finished swipe asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Swipe too short, or no drag in progress.
    None,
    Swap(Position, Position),
    /// Swipe pointed off the board; wiggle the tile at this position.
    Reject(Position),
}

/// Turns a drag that starts on a tile into a swap with the neighbour in the
/// dominant swipe direction.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    width: usize,
    height: usize,
    tile_size: f32,
    /// Screen position of the board's top-left corner.
    origin: (f32, f32),
    drag: Option<(Position, f32, f32)>,
}

impl SwipeTracker {
    pub fn new(width: usize, height: usize, tile_size: f32, origin: (f32, f32)) -> Self {
        Self {
            width,
            height,
            tile_size,
            origin,
            drag: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn cancel(&mut self) {
        self.drag = None;
    }

    pub fn handle(&mut self, event: InputEvent) -> Gesture {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.pointer_down(x, y);
                Gesture::None
            }
            InputEvent::PointerMove { .. } => Gesture::None,
            InputEvent::PointerUp { x, y } => self.pointer_up(x, y),
        }
    }

    /// Start a drag. Ignored off the board or while a drag is already running.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if self.drag.is_some() {
            return false;
        }
        match self.tile_at(x, y) {
            Some(pos) => {
                self.drag = Some((pos, x, y));
                true
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> Gesture {
        let Some((start, start_x, start_y)) = self.drag.take() else {
            return Gesture::None;
        };
        let dx = x - start_x;
        let dy = y - start_y;

        // Ties go to the vertical axis.
        let (step_x, step_y) = if dx.abs() > dy.abs() {
            if dx.abs() <= SWIPE_THRESHOLD {
                return Gesture::None;
            }
            (dx.signum() as isize, 0)
        } else {
            if dy.abs() <= SWIPE_THRESHOLD {
                return Gesture::None;
            }
            (0, dy.signum() as isize)
        };

        let target_x = start.x as isize + step_x;
        let target_y = start.y as isize + step_y;
        if target_x < 0
            || target_y < 0
            || target_x as usize >= self.width
            || target_y as usize >= self.height
        {
            return Gesture::Reject(start);
        }
        Gesture::Swap(start, Position::new(target_x as usize, target_y as usize))
    }

    fn tile_at(&self, x: f32, y: f32) -> Option<Position> {
        let local_x = (x - self.origin.0) / self.tile_size;
        let local_y = (y - self.origin.1) / self.tile_size;
        if local_x < 0.0 || local_y < 0.0 {
            return None;
        }
        let (tx, ty) = (local_x as usize, local_y as usize);
        (tx < self.width && ty < self.height).then(|| Position::new(tx, ty))
    }
}
