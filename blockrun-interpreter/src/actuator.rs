//! Turtle actuator driven by the movement blocks.

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

/// A line drawn by the turtle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// Heading in radians from `start` towards `dest`, measured anticlockwise from the x axis
pub fn heading_towards(start: Point, dest: Point) -> f64 {
    let dx = dest.x - start.x;
    let dy = dest.y - start.y;

    if dx == 0.0 {
        if dest.y < start.y { 1.5 * PI } else { 0.5 * PI }
    } else if dy == 0.0 && dx < 0.0 {
        PI
    } else {
        let heading = (dy / dx).atan();
        if dx < 0.0 { heading + PI } else { heading }
    }
}

/// Something the movement blocks can steer
pub trait Actuator {
    fn position(&self) -> Point;

    /// Heading in radians
    fn heading(&self) -> f64;

    fn segments(&self) -> &[Segment];

    /// Jump to a point without drawing
    fn relocate(&mut self, x: f64, y: f64);

    fn face(&mut self, heading: f64);

    /// Move along the current heading without drawing
    fn advance(&mut self, distance: f64);

    fn push_segment(&mut self, segment: Segment);

    fn rotate_by(&mut self, radians: f64) {
        self.face(self.heading() + radians);
    }

    /// Advance and leave a trail from the old position to the new one
    fn move_forward(&mut self, distance: f64) {
        let start = self.position();
        self.advance(distance);
        let end = self.position();
        self.push_segment(Segment::new(start, end));
    }

    /// Relocate to `start`, turn towards `dest` and travel there.
    ///
    /// The `(start, dest)` segment is only drawn once no matter how often the
    /// same movement runs.
    fn move_to(&mut self, start: Point, dest: Point) {
        self.relocate(start.x, start.y);
        self.face(heading_towards(start, dest));
        self.advance((dest.x - start.x).hypot(dest.y - start.y));

        let segment = Segment::new(start, dest);
        if !self.segments().contains(&segment) {
            self.push_segment(segment);
        }
    }
}

/// A 2D turtle starting at the origin and facing up
#[derive(Debug, Clone, PartialEq)]
pub struct Turtle {
    position: Point,
    heading: f64,
    segments: Vec<Segment>,
}

impl Turtle {
    pub fn new() -> Self {
        Self {
            position: Point::default(),
            heading: PI / 2.0,
            segments: Vec::new(),
        }
    }

    /// Back to the origin with no trail
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for Turtle {
    fn position(&self) -> Point {
        self.position
    }

    fn heading(&self) -> f64 {
        self.heading
    }

    fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn relocate(&mut self, x: f64, y: f64) {
        self.position = Point::new(x, y);
    }

    fn face(&mut self, heading: f64) {
        self.heading = heading;
    }

    fn advance(&mut self, distance: f64) {
        self.position.x += self.heading.cos() * distance;
        self.position.y += self.heading.sin() * distance;
    }

    fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }
}
