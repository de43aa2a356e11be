/// Invader formations ("grids") that move as one rigid body.

use glam::Vec2;
use rand::Rng;

use crate::entities::{AssetState, Invader, InvaderProjectile, Placement};
use crate::removal::RemovalSet;

pub const INVADER_SPACING: f32 = 30.0;
pub const FORMATION_DRIFT: f32 = 3.0;
/// Vertical impulse applied for one frame after an edge bounce.
pub const FORMATION_DROP: f32 = 30.0;

pub const MIN_ROWS: usize = 2;
pub const MAX_ROWS: usize = 6;
pub const MIN_COLUMNS: usize = 3;
pub const MAX_COLUMNS: usize = 12;

#[derive(Clone, Debug)]
pub struct Formation {
    /// Top-left reference point.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Horizontal extent used for edge bounces.
    pub width: f32,
    /// Column-major spawn order.
    pub invaders: Vec<Invader>,
    pub rows: usize,
    pub columns: usize,
}

impl Formation {
    /// A formation of random size, `MIN_ROWS..=MAX_ROWS` by
    /// `MIN_COLUMNS..=MAX_COLUMNS`.
    pub fn new(rng: &mut impl Rng, invader_sprite: Option<Vec2>) -> Self {
        let rows = rng.gen_range(MIN_ROWS..=MAX_ROWS);
        let columns = rng.gen_range(MIN_COLUMNS..=MAX_COLUMNS);
        Formation::with_dimensions(rows, columns, invader_sprite)
    }

    pub fn with_dimensions(rows: usize, columns: usize, invader_sprite: Option<Vec2>) -> Self {
        let mut invaders = Vec::with_capacity(rows * columns);
        for col in 0..columns {
            for row in 0..rows {
                let spawn = Vec2::new(col as f32 * INVADER_SPACING, row as f32 * INVADER_SPACING);
                invaders.push(Invader::new(spawn, invader_sprite));
            }
        }

        Formation {
            position: Vec2::ZERO,
            velocity: Vec2::new(FORMATION_DRIFT, 0.0),
            width: columns as f32 * INVADER_SPACING,
            invaders,
            rows,
            columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.invaders.is_empty()
    }

    /// Advance one frame.  Any drop impulse from the previous frame is
    /// spent here; touching either edge reverses the drift and arms a
    /// new drop that the invaders pick up this same frame.
    pub fn update(&mut self, world_width: f32) {
        self.position += self.velocity;
        self.velocity.y = 0.0;

        if self.position.x + self.width >= world_width || self.position.x <= 0.0 {
            self.velocity.x = -self.velocity.x;
            self.velocity.y = FORMATION_DROP;
        }
    }

    /// Move every Ready invader by the formation's current velocity.
    pub fn advance_invaders(&mut self) {
        let velocity = self.velocity;
        for invader in &mut self.invaders {
            invader.update(velocity);
        }
    }

    pub fn live_invaders(&self) -> usize {
        self.invaders.iter().filter(|i| i.asset.is_ready()).count()
    }

    /// Choose a Ready invader uniformly at random, by index.
    pub fn pick_shooter(&self, rng: &mut impl Rng) -> Option<usize> {
        let ready: Vec<usize> = self
            .invaders
            .iter()
            .enumerate()
            .filter(|(_, inv)| inv.asset.is_ready())
            .map(|(i, _)| i)
            .collect();
        if ready.is_empty() {
            return None;
        }
        Some(ready[rng.gen_range(0..ready.len())])
    }

    /// Let one random invader fire into `sink`.  Returns whether a shot
    /// was taken.
    pub fn fire(&self, rng: &mut impl Rng, sink: &mut Vec<InvaderProjectile>) -> bool {
        match self.pick_shooter(rng) {
            Some(i) => self.invaders[i].shoot(sink),
            None => false,
        }
    }

    /// Remove the marked invaders and refit the horizontal extent.
    /// Returns how many invaders were removed.
    pub fn remove_invaders(&mut self, doomed: &RemovalSet) -> usize {
        let removed = doomed.apply(&mut self.invaders);
        if removed > 0 && !self.invaders.is_empty() {
            self.recompute_extent();
        }
        removed
    }

    /// Refit `position.x` and `width` from the first and last surviving
    /// invaders in spawn order.  This is not a min/max scan: interior
    /// removals can leave it narrower than the true extent.
    pub fn recompute_extent(&mut self) {
        let mut ready = self.invaders.iter().filter_map(|i| i.asset.placement());
        let Some(first) = ready.next() else {
            return;
        };
        let last = ready.last().unwrap_or(first);

        self.width = last.position.x - first.position.x + last.size.x;
        self.position.x = first.position.x;
    }

    /// The invader sprite finished loading: place every Pending invader
    /// at its slot relative to where the formation has drifted to.
    pub fn invader_asset_ready(&mut self, size: Vec2) {
        let origin = self.position;
        for invader in &mut self.invaders {
            if !invader.asset.is_ready() {
                invader.asset = AssetState::Ready(Placement {
                    position: origin + invader.spawn,
                    size,
                });
            }
        }
    }
}
