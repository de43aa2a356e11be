/// Per-frame simulation of the `World`.
///
/// `step` is the only place entity collections change during play.  No
/// collection is spliced while it is being walked: every stage records
/// removal marks in a `RemovalSet`, and all marks are applied together
/// once detection is finished.  Randomness comes through the injected
/// RNG so callers control determinism (tests use a seeded RNG).

use glam::Vec2;
use log::{debug, info, trace};
use rand::Rng;

use crate::entities::{
    AssetKind, AssetState, Bounds, GameStatus, InputState, Placement, Player, Projectile, World,
    PLAYER_FLOOR_GAP, PROJECTILE_SPEED,
};
use crate::formation::Formation;
use crate::removal::RemovalSet;

/// Formations fire once every this many frames of the shared counter.
pub const FIRE_INTERVAL: u32 = 100;
pub const SPAWN_INTERVAL_MIN: u32 = 500;
pub const SPAWN_INTERVAL_MAX: u32 = 999;

/// What happened during one `World::step`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub player_shot: bool,
    /// Player projectiles that left through the top edge.
    pub projectiles_culled: usize,
    /// Player projectiles consumed by a hit; equals `invaders_destroyed`.
    pub projectiles_spent: usize,
    pub invaders_destroyed: usize,
    pub formations_cleared: usize,
    pub invader_shots: usize,
    /// Invader projectiles removed, whether off the bottom or on the player.
    pub invader_projectiles_removed: usize,
    pub formation_spawned: bool,
    /// Loss condition: an invader projectile reached the player.
    pub player_hit: bool,
}

fn draw_spawn_interval(rng: &mut impl Rng) -> u32 {
    rng.gen_range(SPAWN_INTERVAL_MIN..=SPAWN_INTERVAL_MAX)
}

impl World {
    /// A fresh session: one formation, the player waiting on its sprite.
    pub fn new(bounds: Bounds, rng: &mut impl Rng) -> Self {
        let formations = vec![Formation::new(rng, None)];
        World {
            bounds,
            player: Player::new(),
            projectiles: Vec::new(),
            invader_projectiles: Vec::new(),
            formations,
            status: GameStatus::Playing,
            frames: 0,
            spawn_interval: draw_spawn_interval(rng),
            elapsed: 0,
            invader_sprite: None,
        }
    }

    /// A sprite finished loading.  The player is placed bottom-centre;
    /// invaders already on the field take their slots in their formation, and
    /// formations spawned later start Ready.
    pub fn asset_ready(&mut self, kind: AssetKind, size: Vec2) {
        match kind {
            AssetKind::Player => {
                if self.player.asset.is_ready() {
                    return;
                }
                let position = Vec2::new(
                    self.bounds.width() / 2.0 - size.x / 2.0,
                    self.bounds.height() - size.y - PLAYER_FLOOR_GAP,
                );
                self.player.asset = AssetState::Ready(Placement { position, size });
                debug!("player ready at ({:.1}, {:.1})", position.x, position.y);
            }
            AssetKind::Invader => {
                self.invader_sprite = Some(size);
                for formation in &mut self.formations {
                    formation.invader_asset_ready(size);
                }
                debug!("invader sprite ready: {} formation(s) placed", self.formations.len());
            }
        }
    }

    /// Launch a projectile from the player's top-centre.  Does nothing
    /// until the player's sprite is ready.
    pub fn fire(&mut self) -> bool {
        let Some(placement) = self.player.asset.placement() else {
            return false;
        };
        let origin = Vec2::new(
            placement.position.x + placement.size.x / 2.0,
            placement.position.y,
        );
        self.projectiles
            .push(Projectile::new(origin, Vec2::new(0.0, -PROJECTILE_SPEED)));
        true
    }

    pub fn live_invaders(&self) -> usize {
        self.formations.iter().map(Formation::live_invaders).sum()
    }

    /// Advance the simulation by one frame.
    pub fn step(&mut self, input: &InputState, rng: &mut impl Rng) -> StepReport {
        let mut report = StepReport::default();
        let width = self.bounds.width();
        let height = self.bounds.height();

        if input.fire {
            report.player_shot = self.fire();
        }

        // ── 1. Player ────────────────────────────────────────────────────────
        self.player.update(input, width);

        // ── 2. Invader projectiles: cull, integrate, hit the player ─────────
        let player_box = self.player.bounds();
        let mut enemy_fire_done = RemovalSet::with_len(self.invader_projectiles.len());
        for (i, shot) in self.invader_projectiles.iter_mut().enumerate() {
            if shot.position.y + shot.height >= height {
                enemy_fire_done.mark(i);
                continue;
            }
            shot.update();
            if let Some(player_box) = player_box {
                if shot.bounds().overlaps(&player_box) {
                    enemy_fire_done.mark(i);
                    report.player_hit = true;
                }
            }
        }

        // ── 3. Player projectiles: cull, integrate ───────────────────────────
        let mut projectiles_done = RemovalSet::with_len(self.projectiles.len());
        for (i, shot) in self.projectiles.iter_mut().enumerate() {
            if shot.position.y - shot.radius <= 0.0 {
                projectiles_done.mark(i);
            } else {
                shot.update();
            }
        }
        report.projectiles_culled = projectiles_done.len();

        // ── 4. Formations: move, fire, detect hits ───────────────────────────
        // A projectile already marked (culled, or spent on an earlier
        // invader) is skipped, so each projectile and each invader is
        // consumed at most once.  First match in traversal order wins.
        let fire_now = self.frames % FIRE_INTERVAL == 0;
        let mut invaders_hit: Vec<RemovalSet> = Vec::with_capacity(self.formations.len());

        for formation in &mut self.formations {
            formation.update(width);

            if fire_now && formation.fire(rng, &mut self.invader_projectiles) {
                report.invader_shots += 1;
            }

            formation.advance_invaders();

            let mut hits = RemovalSet::with_len(formation.invaders.len());
            for (i, invader) in formation.invaders.iter().enumerate() {
                let Some(invader_box) = invader.bounds() else {
                    continue;
                };
                let target = self
                    .projectiles
                    .iter()
                    .enumerate()
                    .find(|(j, shot)| {
                        !projectiles_done.contains(*j) && shot.bounds().overlaps(&invader_box)
                    })
                    .map(|(j, _)| j);

                if let Some(j) = target {
                    if projectiles_done.mark(j) && hits.mark(i) {
                        report.projectiles_spent += 1;
                        trace!("projectile {} destroyed invader {}", j, i);
                    }
                }
            }
            invaders_hit.push(hits);
        }

        // ── 5. Apply removals ────────────────────────────────────────────────
        projectiles_done.apply(&mut self.projectiles);
        report.invader_projectiles_removed = enemy_fire_done.apply(&mut self.invader_projectiles);

        for (formation, hits) in self.formations.iter_mut().zip(&invaders_hit) {
            report.invaders_destroyed += formation.remove_invaders(hits);
        }

        let before = self.formations.len();
        self.formations.retain(|f| !f.is_empty());
        report.formations_cleared = before - self.formations.len();
        if report.formations_cleared > 0 {
            debug!("{} formation(s) cleared", report.formations_cleared);
        }

        if report.player_hit && self.status == GameStatus::Playing {
            self.status = GameStatus::GameOver;
            info!("player hit after {} frames", self.elapsed);
        }

        // ── 6. Frame counter & formation spawn ───────────────────────────────
        self.frames += 1;
        self.elapsed += 1;
        if self.frames >= self.spawn_interval {
            let formation = Formation::new(rng, self.invader_sprite);
            debug!(
                "spawning {}x{} formation after {} frames",
                formation.rows, formation.columns, self.frames
            );
            self.formations.push(formation);
            self.spawn_interval = draw_spawn_interval(rng);
            self.frames = 0;
            report.formation_spawned = true;
        }

        report
    }
}
