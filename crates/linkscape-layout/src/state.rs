use crate::config::PhysicsConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStatus {
    Uninitialized,
    /// Positions seeded, no iteration run yet.
    Initialized,
    Relaxing,
    Converged,
    IterationCapReached,
    /// Stopped by a cancellation token; positions are those of the last finished iteration.
    Cancelled,
}

impl LayoutStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LayoutStatus::Converged | LayoutStatus::IterationCapReached | LayoutStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Point,
    pub velocity: Point,
    /// Hierarchy row, set by the hierarchical solver only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
}

/// Snapshot of a simulation: every node's body plus the configuration that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutState {
    pub physics: PhysicsConfig,
    pub status: LayoutStatus,
    pub iterations: usize,
    /// Largest single-node displacement of the last iteration.
    pub max_displacement: f64,
    pub nodes: IndexMap<String, Body>,
}

impl LayoutState {
    pub fn uninitialized(physics: PhysicsConfig) -> Self {
        Self {
            physics,
            status: LayoutStatus::Uninitialized,
            iterations: 0,
            max_displacement: 0.0,
            nodes: IndexMap::new(),
        }
    }

    pub fn converged(&self) -> bool {
        self.status == LayoutStatus::Converged
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.nodes.get(id).map(|b| b.position)
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` without nodes.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut it = self.nodes.values().map(|b| b.position);
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}
