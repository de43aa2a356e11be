/// All game entity types — plain data plus geometry helpers, no simulation.
///
/// Positions, velocities and sizes are world units (`glam::Vec2`).  The
/// playfield origin is the top-left corner; `y` grows downward.

use glam::Vec2;

use crate::config::ConfigError;
use crate::formation::Formation;

pub type Vector2 = Vec2;

// ── Tuning constants ─────────────────────────────────────────────────────────

pub const PLAYER_SPEED: f32 = 5.0;
pub const PLAYER_LEAN: f32 = 0.15;
/// Gap between the ship's bottom edge and the playfield floor.
pub const PLAYER_FLOOR_GAP: f32 = 20.0;

pub const PROJECTILE_RADIUS: f32 = 3.0;
pub const PROJECTILE_SPEED: f32 = 12.0;

pub const INVADER_PROJECTILE_WIDTH: f32 = 3.0;
pub const INVADER_PROJECTILE_HEIGHT: f32 = 10.0;
pub const INVADER_PROJECTILE_SPEED: f32 = 5.0;

// ── Status / input ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Which sprite finished loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Player,
    Invader,
}

/// Input sampled once per frame.  `left`/`right` are held state; `fire`
/// is an edge and is consumed by exactly one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

// ── Geometry ─────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.  Edges are inclusive: touching counts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Aabb {
            min: origin,
            max: origin + size,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Playfield dimensions, always finite and positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    width: f32,
    height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(ConfigError::InvalidBounds { width, height });
        }
        Ok(Bounds { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

// ── Asset lifecycle ──────────────────────────────────────────────────────────

/// Where a sprite-backed entity sits once its sprite has loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    pub size: Vec2,
}

impl Placement {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_origin_size(self.position, self.size)
    }
}

/// Sprite-backed entities have no geometry until their asset is ready.
/// Pending entities are skipped by update, draw and collision alike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AssetState {
    Pending,
    Ready(Placement),
}

impl AssetState {
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            AssetState::Ready(p) => Some(p),
            AssetState::Pending => None,
        }
    }

    pub fn placement_mut(&mut self) -> Option<&mut Placement> {
        match self {
            AssetState::Ready(p) => Some(p),
            AssetState::Pending => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AssetState::Ready(_))
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub velocity: Vec2,
    /// Visual lean in radians.
    pub rotation: f32,
    pub asset: AssetState,
}

impl Player {
    pub fn new() -> Self {
        Player {
            velocity: Vec2::ZERO,
            rotation: 0.0,
            asset: AssetState::Pending,
        }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.asset.placement().map(Placement::bounds)
    }

    /// Steer from input, then integrate horizontally.  Inert while Pending.
    pub fn update(&mut self, input: &InputState, world_width: f32) {
        let Some(placement) = self.asset.placement_mut() else {
            return;
        };

        if input.left && placement.position.x >= 0.0 {
            self.velocity.x = -PLAYER_SPEED;
            self.rotation = -PLAYER_LEAN;
        } else if input.right && placement.position.x + placement.size.x <= world_width {
            self.velocity.x = PLAYER_SPEED;
            self.rotation = PLAYER_LEAN;
        } else {
            self.velocity.x = 0.0;
            self.rotation = 0.0;
        }

        placement.position.x += self.velocity.x;
    }
}

impl Default for Player {
    fn default() -> Self {
        Player::new()
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// A round shot fired by the player.  `position` is the centre.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl Projectile {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Projectile {
            position,
            velocity,
            radius: PROJECTILE_RADIUS,
        }
    }

    /// Collision treats the circle as its bounding square.
    pub fn bounds(&self) -> Aabb {
        let r = Vec2::splat(self.radius);
        Aabb {
            min: self.position - r,
            max: self.position + r,
        }
    }

    pub fn update(&mut self) {
        self.position += self.velocity;
    }
}

/// A bar-shaped shot dropped by an invader.  `position` is the top-left.
#[derive(Clone, Debug, PartialEq)]
pub struct InvaderProjectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
}

impl InvaderProjectile {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        InvaderProjectile {
            position,
            velocity,
            width: INVADER_PROJECTILE_WIDTH,
            height: INVADER_PROJECTILE_HEIGHT,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_origin_size(self.position, Vec2::new(self.width, self.height))
    }

    pub fn update(&mut self) {
        self.position += self.velocity;
    }
}

// ── Invader ──────────────────────────────────────────────────────────────────

/// One member of a formation.  Invaders have no velocity of their own;
/// they always move with their formation's velocity.
#[derive(Clone, Debug)]
pub struct Invader {
    /// Offset from the formation origin.  Formations start at the world
    /// origin, so this is also the position at construction.
    pub spawn: Vec2,
    pub asset: AssetState,
}

impl Invader {
    pub fn new(spawn: Vec2, sprite: Option<Vec2>) -> Self {
        let asset = match sprite {
            Some(size) => AssetState::Ready(Placement {
                position: spawn,
                size,
            }),
            None => AssetState::Pending,
        };
        Invader { spawn, asset }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.asset.placement().map(Placement::bounds)
    }

    pub fn update(&mut self, formation_velocity: Vec2) {
        if let Some(placement) = self.asset.placement_mut() {
            placement.position += formation_velocity;
        }
    }

    /// Drop a shot from the bottom-centre.  Pending invaders cannot shoot.
    pub fn shoot(&self, sink: &mut Vec<InvaderProjectile>) -> bool {
        let Some(placement) = self.asset.placement() else {
            return false;
        };
        let origin = Vec2::new(
            placement.position.x + placement.size.x / 2.0,
            placement.position.y + placement.size.y,
        );
        sink.push(InvaderProjectile::new(
            origin,
            Vec2::new(0.0, INVADER_PROJECTILE_SPEED),
        ));
        true
    }
}

// ── Master game state ────────────────────────────────────────────────────────

/// The aggregate root.  Simulation lives in `compute`.
#[derive(Clone, Debug)]
pub struct World {
    pub bounds: Bounds,
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub invader_projectiles: Vec<InvaderProjectile>,
    pub formations: Vec<Formation>,
    pub status: GameStatus,
    /// Frames since the last formation spawn; also drives fire cadence.
    pub frames: u32,
    pub spawn_interval: u32,
    /// Total steps taken, never reset.
    pub elapsed: u64,
    /// Invader sprite size, once loaded.  New formations start Ready.
    pub invader_sprite: Option<Vec2>,
}
