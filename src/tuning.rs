//! Data-driven game balance
//!
//! Every number the simulation consults lives here so hosts can ship
//! alternative balance files without touching the tick. Defaults reproduce
//! the shipped five-level campaign.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Weapon kinds the player (and bosses) can wield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Fists,
    Sword,
    Hammer,
    DualBlades,
}

impl WeaponKind {
    /// Weapons that can appear as pickups
    pub const DROPPABLE: [WeaponKind; 3] =
        [WeaponKind::Sword, WeaponKind::Hammer, WeaponKind::DualBlades];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Fists => "FISTS",
            WeaponKind::Sword => "SWORD",
            WeaponKind::Hammer => "HAMMER",
            WeaponKind::DualBlades => "DUAL_BLADES",
        }
    }
}

/// Per-weapon combat numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub damage: i32,
    /// Ticks between activations
    pub cooldown: u32,
    pub range: f32,
    /// Displacement applied to each target hit
    pub knockback: f32,
    /// Feedback text colour
    pub color: String,
}

impl WeaponStats {
    fn new(damage: i32, cooldown: u32, range: f32, knockback: f32, color: &str) -> Self {
        Self {
            damage,
            cooldown,
            range,
            knockback,
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub fists: WeaponStats,
    pub sword: WeaponStats,
    pub hammer: WeaponStats,
    pub dual_blades: WeaponStats,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            fists: WeaponStats::new(25, 18, 75.0, 10.0, "#f5deb3"),
            sword: WeaponStats::new(60, 22, 115.0, 18.0, "#22c55e"),
            // Blunt weapons send targets flying
            hammer: WeaponStats::new(110, 55, 135.0, 45.0, "#d97706"),
            dual_blades: WeaponStats::new(40, 12, 100.0, 6.0, "#84cc16"),
        }
    }
}

impl WeaponTable {
    pub fn get(&self, kind: WeaponKind) -> &WeaponStats {
        match kind {
            WeaponKind::Fists => &self.fists,
            WeaponKind::Sword => &self.sword,
            WeaponKind::Hammer => &self.hammer,
            WeaponKind::DualBlades => &self.dual_blades,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (WeaponKind, &WeaponStats)> {
        [
            WeaponKind::Fists,
            WeaponKind::Sword,
            WeaponKind::Hammer,
            WeaponKind::DualBlades,
        ]
        .into_iter()
        .map(move |k| (k, self.get(k)))
    }
}

/// One row of the difficulty table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub enemy_count: u32,
    pub enemy_speed: f32,
    pub enemy_health: i32,
    pub boss: bool,
}

impl LevelSpec {
    fn new(enemy_count: u32, enemy_speed: f32, enemy_health: i32, boss: bool) -> Self {
        Self {
            enemy_count,
            enemy_speed,
            enemy_health,
            boss,
        }
    }
}

/// Boss stats, derived from the level row it appears on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossSpec {
    pub speed_factor: f32,
    pub health_factor: i32,
    pub damage: i32,
    pub cooldown: u32,
    pub weapon: WeaponKind,
    /// Score and currency multiplier on kill
    pub reward_factor: u32,
}

impl Default for BossSpec {
    fn default() -> Self {
        Self {
            speed_factor: 0.75,
            health_factor: 5,
            damage: 55,
            cooldown: 85,
            weapon: WeaponKind::Hammer,
            reward_factor: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpec {
    pub health: i32,
    pub speed: f32,
    pub damage: i32,
    pub cooldown: u32,
    pub weapon: WeaponKind,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        Self {
            health: 100,
            speed: 9.0,
            damage: 40,
            cooldown: 20,
            weapon: WeaponKind::Fists,
        }
    }
}

/// Recruited companion stat block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllySpec {
    pub health: i32,
    pub speed: f32,
    pub damage: i32,
    pub range: f32,
    pub cooldown: u32,
    pub weapon: WeaponKind,
}

impl Default for AllySpec {
    fn default() -> Self {
        Self {
            health: 150,
            speed: 5.0,
            damage: 30,
            range: 90.0,
            cooldown: 30,
            weapon: WeaponKind::Sword,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Added to weapon range for the center-to-center reach test
    pub melee_slop: f32,
    /// Random bonus damage is drawn from `0..damage_jitter`
    pub damage_jitter: i32,
    pub hit_flash_ticks: u32,
    /// Shake added per target hit
    pub hit_shake: f32,
    pub max_shake: f32,
    /// Shake removed every tick
    pub shake_decay: f32,
    /// Enemy center distance at which contact damage applies
    pub contact_range: f32,
    /// Contact damage lands on ticks where `combat_tick % interval == 0`
    pub contact_interval: u64,
    pub contact_shake: f32,
    pub enemy_base_damage: i32,
    pub enemy_damage_per_level: i32,
    pub enemy_cooldown: u32,
    /// Enemies stop closing in below this distance
    pub chase_stop_distance: f32,
    /// Enemies report `is_moving` above this distance
    pub moving_threshold: f32,
    pub dash_distance: f32,
    pub dash_cooldown: u32,
    /// Damage multiplier when striking a target from behind
    pub backstab_multiplier: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            melee_slop: 60.0,
            damage_jitter: 25,
            hit_flash_ticks: 12,
            hit_shake: 25.0,
            max_shake: 40.0,
            shake_decay: 3.0,
            contact_range: 90.0,
            contact_interval: 40,
            contact_shake: 18.0,
            enemy_base_damage: 20,
            enemy_damage_per_level: 3,
            enemy_cooldown: 60,
            chase_stop_distance: 50.0,
            moving_threshold: 60.0,
            dash_distance: 120.0,
            dash_cooldown: 150,
            backstab_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    pub kill_score: u64,
    pub kill_currency: u32,
    /// Amount carried by a dropped currency bundle
    pub currency_drop_amount: u32,
    /// Probability a kill drops a weapon instead of currency
    pub weapon_drop_chance: f32,
    pub pickup_radius: f32,
    pub heal_cost: u32,
    pub heal_amount: i32,
    /// Upgrade cost is `upgrade_cost_base * upgrade_level`
    pub upgrade_cost_base: u32,
    pub upgrade_max_health: i32,
    pub upgrade_damage: i32,
    pub upgrade_speed: f32,
    /// Weapon pickup damage is `weapon.damage + upgrade_level * weapon_level_bonus`
    pub weapon_level_bonus: i32,
    /// Warehouse full repair
    pub repair_cost: u32,
    /// Warehouse weapon crate
    pub armory_cost: u32,
    pub challenge_reward: u32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            kill_score: 1000,
            kill_currency: 60,
            currency_drop_amount: 40,
            weapon_drop_chance: 0.15,
            pickup_radius: 55.0,
            heal_cost: 40,
            heal_amount: 50,
            upgrade_cost_base: 100,
            upgrade_max_health: 50,
            upgrade_damage: 25,
            upgrade_speed: 0.4,
            weapon_level_bonus: 20,
            repair_cost: 60,
            armory_cost: 150,
            challenge_reward: 80,
        }
    }
}

/// Task board entry offered in the warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward: u32,
}

impl TaskSpec {
    fn new(id: &str, title: &str, description: &str, reward: u32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            reward,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerSpec,
    pub weapons: WeaponTable,
    /// Row `n` describes level `n + 1`
    pub levels: Vec<LevelSpec>,
    pub boss: BossSpec,
    pub ally: AllySpec,
    pub combat: CombatTuning,
    pub economy: EconomyTuning,
    /// Non-interactive window after a level clear
    pub celebration_ticks: u32,
    /// Levels followed by the warehouse interlude
    pub warehouse_levels: Vec<u32>,
    pub tasks: Vec<TaskSpec>,
    /// Ticks to wait for narrative text before using the fallback
    pub narrative_timeout_ticks: u64,
    /// Lifetime of floating feedback text
    pub feedback_life: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerSpec::default(),
            weapons: WeaponTable::default(),
            levels: vec![
                LevelSpec::new(3, 2.3, 60, false),
                LevelSpec::new(5, 2.7, 85, false),
                LevelSpec::new(6, 3.3, 120, false),
                LevelSpec::new(8, 3.8, 150, false),
                LevelSpec::new(2, 4.5, 500, true),
            ],
            boss: BossSpec::default(),
            ally: AllySpec::default(),
            combat: CombatTuning::default(),
            economy: EconomyTuning::default(),
            celebration_ticks: 132,
            warehouse_levels: vec![2, 4],
            tasks: vec![
                TaskSpec::new("patrol", "Night patrol", "Sweep the market alleys.", 50),
                TaskSpec::new("supply", "Supply run", "Haul medkits to the depot.", 70),
                TaskSpec::new("intel", "Intercept comms", "Decode the gang's radio chatter.", 100),
            ],
            narrative_timeout_ticks: 300,
            feedback_life: 40,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {} ({} levels)", path.display(), tuning.levels.len());
        Ok(tuning)
    }

    /// Reject balance sheets the simulation cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Invalid("level table is empty".into()));
        }
        for (kind, stats) in self.weapons.iter() {
            if stats.cooldown == 0 {
                return Err(ConfigError::Invalid(format!(
                    "weapon {} has zero cooldown",
                    kind.as_str()
                )));
            }
        }
        if self.player.cooldown == 0 || self.ally.cooldown == 0 || self.boss.cooldown == 0 {
            return Err(ConfigError::Invalid("attack cooldowns must be positive".into()));
        }
        if self.combat.contact_interval == 0 {
            return Err(ConfigError::Invalid("contact_interval must be positive".into()));
        }
        if self.combat.damage_jitter < 0 {
            return Err(ConfigError::Invalid("damage_jitter must not be negative".into()));
        }
        if self.economy.pickup_radius <= 0.0 {
            return Err(ConfigError::Invalid("pickup_radius must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.economy.weapon_drop_chance) {
            return Err(ConfigError::Invalid(format!(
                "weapon_drop_chance {} outside [0, 1]",
                self.economy.weapon_drop_chance
            )));
        }
        if self.player.health <= 0 {
            return Err(ConfigError::Invalid("player health must be positive".into()));
        }
        Ok(())
    }

    /// Difficulty row for a 1-based level index
    pub fn level(&self, level: u32) -> Option<&LevelSpec> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.levels.get(index)
    }

    /// Last level of the campaign
    pub fn final_level(&self) -> u32 {
        u32::try_from(self.levels.len()).unwrap_or(u32::MAX)
    }

    pub fn is_boss_level(&self, level: u32) -> bool {
        self.level(level).is_some_and(|spec| spec.boss)
    }

    pub fn is_warehouse_level(&self, level: u32) -> bool {
        self.warehouse_levels.contains(&level)
    }

    /// Contact damage for a melee enemy on the given level
    pub fn enemy_damage(&self, level: u32) -> i32 {
        let level = i32::try_from(level).unwrap_or(i32::MAX);
        self.combat
            .enemy_base_damage
            .saturating_add(self.combat.enemy_damage_per_level.saturating_mul(level))
    }
}
