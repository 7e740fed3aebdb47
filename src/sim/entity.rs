//! Actors on the field
//!
//! Every actor shares one base record; the player carries its extra
//! progression fields in a wrapper instead of optional fields on the base.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::{Tuning, WeaponKind};
use crate::{clamp_to_arena, square_center};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    MeleeEnemy,
    Boss,
    Ally,
}

impl EntityKind {
    pub fn is_enemy(self) -> bool {
        matches!(self, EntityKind::MeleeEnemy | EntityKind::Boss)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, +1 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing that looks along a horizontal delta (right when zero)
    pub fn toward(dx: f32) -> Self {
        if dx < 0.0 { Facing::Left } else { Facing::Right }
    }
}

/// Common actor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    /// Top-left corner of the bounding square
    pub pos: Vec2,
    pub size: f32,
    pub facing: Facing,
    /// Displacement per tick
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub weapon: WeaponKind,
    pub damage: i32,
    /// Ticks until the next attack may start
    pub attack_cooldown: u32,
    pub max_attack_cooldown: u32,
    /// Attack pose; shorter than the full cooldown
    pub is_attacking: bool,
    /// Presentation-only walk flag
    pub is_moving: bool,
    /// Ticks of hit feedback remaining
    pub hit_flash: u32,
}

impl Entity {
    pub fn center(&self) -> Vec2 {
        square_center(self.pos, self.size)
    }

    /// Euclidean distance between centers
    pub fn distance_to(&self, other: &Entity) -> f32 {
        self.center().distance(other.center())
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Per-tick timer decay
    pub fn decay_timers(&mut self) {
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.hit_flash = self.hit_flash.saturating_sub(1);
        if self.attack_cooldown <= self.max_attack_cooldown / 2 {
            self.is_attacking = false;
        }
    }

    /// Begin an attack if the cooldown is free
    pub fn try_begin_attack(&mut self) -> bool {
        if self.attack_cooldown > 0 {
            return false;
        }
        self.attack_cooldown = self.max_attack_cooldown;
        self.is_attacking = true;
        true
    }

    /// Walk toward `target` (a center point), stopping `stop_distance` short.
    /// Returns the distance measured before moving.
    pub fn chase(&mut self, target: Vec2, stop_distance: f32) -> f32 {
        let delta = target - self.center();
        let dist = delta.length();
        if dist > stop_distance && dist > 0.0 {
            self.pos += delta / dist * self.speed;
            self.facing = Facing::toward(delta.x);
        }
        dist
    }
}

/// Directional movement flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    /// Per-axis displacement; diagonals are not normalized
    pub fn displacement(&self, speed: f32) -> Vec2 {
        let mut d = Vec2::ZERO;
        if self.up {
            d.y -= speed;
        }
        if self.down {
            d.y += speed;
        }
        if self.left {
            d.x -= speed;
        }
        if self.right {
            d.x += speed;
        }
        d
    }
}

/// The controllable character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Entity,
    /// Ticks until the dash strike is ready
    pub dash_cooldown: u32,
    /// Starts at 1, never decreases
    pub upgrade_level: u32,
}

impl Player {
    /// Fresh player with base stats in the middle of the arena
    pub fn new(tuning: &Tuning) -> Self {
        let spec = &tuning.player;
        Self {
            body: Entity {
                id: "player".to_string(),
                kind: EntityKind::Player,
                pos: Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0),
                size: PLAYER_SIZE,
                facing: Facing::Right,
                speed: spec.speed,
                health: spec.health,
                max_health: spec.health,
                weapon: spec.weapon,
                damage: spec.damage,
                attack_cooldown: 0,
                max_attack_cooldown: spec.cooldown,
                is_attacking: false,
                is_moving: false,
                hit_flash: 0,
            },
            dash_cooldown: 0,
            upgrade_level: 1,
        }
    }

    pub fn decay_timers(&mut self) {
        self.body.decay_timers();
        self.dash_cooldown = self.dash_cooldown.saturating_sub(1);
    }

    /// Apply directional intent, clamped to the arena. Horizontal intent sets facing.
    pub fn apply_movement(&mut self, intent: MoveIntent) {
        let body = &mut self.body;
        if intent.left {
            body.facing = Facing::Left;
        }
        if intent.right {
            body.facing = Facing::Right;
        }
        let before = body.pos;
        body.pos = clamp_to_arena(body.pos + intent.displacement(body.speed), body.size);
        body.is_moving = body.pos != before;
    }
}
