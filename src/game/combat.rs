//! # Combat Module
//!
//! One-on-one turn-based combat against a single enemy.
//!
//! Damage formulas are plain functions of the combatants' stats and an
//! already-drawn roll, so they can be checked exhaustively. [`Combat`] owns
//! the live encounter and draws rolls from the shared [`GameRng`].

use crate::config::MAX_LEVEL;
use crate::content::{AiBehavior, ContentLibrary, Enemy, Item, ItemKind, Spell, SpellKind};
use crate::{DescentError, DescentResult, GameRng, Player};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Combat sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for the player's command
    #[default]
    Choose,
    /// Reserved for animated player actions
    Act,
    /// The enemy acts, or the fight is won
    EnemyResolve,
    /// Fight over
    Result,
}

/// Applies the defend halving and then the damage floor.
fn settle(raw: i32, defending: bool, minimum: i32) -> i32 {
    let raw = if defending { raw / 2 } else { raw };
    raw.max(minimum)
}

/// Hit points removed by `damage`, clamped to the `u16` range.
fn hp_loss(damage: i32) -> u16 {
    u16::try_from(damage.max(0)).unwrap_or(u16::MAX)
}

/// Physical attack by the player. `roll` is drawn from `-2..=2`.
///
/// # Examples
///
/// ```
/// use descent::player_attack_damage;
///
/// assert_eq!(player_attack_damage(5, 2, 3, 0), 4);
/// assert_eq!(player_attack_damage(1, 0, 20, -2), 1);
/// ```
pub fn player_attack_damage(atk: i32, weapon_bonus: i32, enemy_def: i32, roll: i32) -> i32 {
    settle(atk + weapon_bonus - enemy_def + roll, false, 1)
}

/// Plain enemy attack. `roll` is drawn from `-2..=2`.
pub fn enemy_attack_damage(
    enemy_atk: i32,
    player_def: i32,
    armor_bonus: i32,
    roll: i32,
    defending: bool,
) -> i32 {
    settle(enemy_atk - player_def - armor_bonus + roll, defending, 1)
}

/// Enemy spell. `roll` is drawn from `-1..=2`.
pub fn enemy_spell_damage(enemy_mag: i32, player_def: i32, roll: i32, defending: bool) -> i32 {
    settle(enemy_mag + roll - player_def / 2, defending, 1)
}

/// Boss magic blast. `roll` is drawn from `2..=5`.
pub fn boss_blast_damage(enemy_mag: i32, player_def: i32, roll: i32, defending: bool) -> i32 {
    settle(enemy_mag + roll - player_def / 3, defending, 2)
}

/// Boss heavy strike at one and a half times attack. `roll` is drawn from `-1..=2`.
pub fn boss_heavy_damage(enemy_atk: i32, player_def: i32, roll: i32, defending: bool) -> i32 {
    settle(enemy_atk * 3 / 2 - player_def + roll, defending, 2)
}

/// Damage spell cast by the player. `roll` is drawn from `-2..=2`.
pub fn spell_damage(power: i32, mag: i32, magic_bonus: i32, enemy_def: i32, roll: i32) -> i32 {
    settle(power + mag + magic_bonus - enemy_def / 2 + roll, false, 1)
}

/// Hit points restored by a healing spell.
pub fn spell_heal(power: i32, mag: i32) -> i32 {
    power + mag / 2
}

/// Percent chance to escape, between 15 and 90.
///
/// # Examples
///
/// ```
/// use descent::flee_chance;
///
/// assert_eq!(flee_chance(4, 4), 40);
/// assert_eq!(flee_chance(1, 20), 15);
/// assert_eq!(flee_chance(30, 1), 90);
/// ```
pub fn flee_chance(player_spd: i32, enemy_spd: i32) -> u32 {
    (40 + (player_spd - enemy_spd) * 5).clamp(15, 90) as u32
}

/// What the enemy did on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyAction {
    Strike { damage: i32 },
    Cast { damage: i32 },
    Blast { damage: i32 },
    Smash { damage: i32 },
    /// Raised its guard instead of attacking
    Brace,
}

impl EnemyAction {
    pub fn damage(&self) -> i32 {
        match *self {
            EnemyAction::Strike { damage }
            | EnemyAction::Cast { damage }
            | EnemyAction::Blast { damage }
            | EnemyAction::Smash { damage } => damage,
            EnemyAction::Brace => 0,
        }
    }

    /// Combat log line for this action.
    pub fn describe(&self, enemy_name: &str) -> String {
        match *self {
            EnemyAction::Strike { damage } => format!("{} hits! {} dmg!", enemy_name, damage),
            EnemyAction::Cast { damage } => format!("{} casts! {} dmg!", enemy_name, damage),
            EnemyAction::Blast { damage } => format!("{} blasts! {}!", enemy_name, damage),
            EnemyAction::Smash { damage } => format!("{} SMASH! {}!", enemy_name, damage),
            EnemyAction::Brace => format!("{} defends!", enemy_name),
        }
    }
}

/// Rewards granted for defeating an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VictoryReport {
    pub xp: u32,
    pub gold: u32,
    /// Item dropped by the enemy, if the drop roll succeeded
    pub drop: Option<u16>,
}

/// Outcome of resolving the enemy phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnemyTurn {
    Victory(VictoryReport),
    Acted(EnemyAction),
}

/// Result of a spell cast attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    Damaged(i32),
    Healed(i32),
    Buffed(u16),
    Debuffed(u16),
}

/// Stat increases from a level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelGains {
    pub hp: u16,
    pub mp: u16,
    pub atk: u16,
    pub def: u16,
    pub mag: u16,
    pub spd: u16,
}

/// A fight in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combat {
    pub enemy: Enemy,
    pub phase: TurnPhase,
    pub player_defending: bool,
    /// Shown on screen only; it does not change damage
    pub enemy_defending: bool,
    /// Last combat log line
    pub message: String,
    /// Rewards of a won fight, kept for the result screen
    pub victory: Option<VictoryReport>,
}

impl Combat {
    pub fn new(enemy: Enemy) -> Self {
        Self {
            enemy,
            phase: TurnPhase::Choose,
            player_defending: false,
            enemy_defending: false,
            message: String::new(),
            victory: None,
        }
    }

    /// Attacks the enemy and hands the turn over.
    pub fn player_attack(
        &mut self,
        player: &Player,
        content: &ContentLibrary,
        rng: &mut GameRng,
    ) -> i32 {
        self.player_defending = false;
        let damage = player_attack_damage(
            player.atk as i32,
            player.weapon_bonus(content),
            self.enemy.def as i32,
            rng.range(-2, 2),
        );
        self.enemy.hp = self.enemy.hp.saturating_sub(hp_loss(damage));
        self.message = format!("Hit {} for {}!", self.enemy.name, damage);
        self.phase = TurnPhase::EnemyResolve;
        damage
    }

    pub fn player_defend(&mut self) {
        self.player_defending = true;
        self.message = "Defending!".to_string();
        self.phase = TurnPhase::EnemyResolve;
    }

    /// Rolls an escape. A failed attempt costs the turn.
    pub fn try_flee(&mut self, player: &Player, rng: &mut GameRng) -> bool {
        let chance = flee_chance(player.spd as i32, self.enemy.spd as i32);
        if rng.chance(chance) {
            self.message = "Escaped!".to_string();
            true
        } else {
            self.message = "Can't escape!".to_string();
            self.phase = TurnPhase::EnemyResolve;
            false
        }
    }

    /// Casts a spell the player has unlocked.
    ///
    /// Fails without side effects when the spell is still locked or the
    /// player lacks mana.
    pub fn cast(
        &mut self,
        player: &mut Player,
        content: &ContentLibrary,
        spell: &Spell,
        rng: &mut GameRng,
    ) -> DescentResult<CastOutcome> {
        if spell.unlock_level > player.level {
            return Err(DescentError::InvalidAction(format!(
                "{} is not learned yet",
                spell.name
            )));
        }
        if player.mp < spell.mp_cost as u16 {
            return Err(DescentError::InvalidAction("Not enough MP!".to_string()));
        }

        player.mp -= spell.mp_cost as u16;
        let outcome = match spell.kind {
            SpellKind::Damage => {
                let damage = spell_damage(
                    spell.power as i32,
                    player.mag as i32,
                    player.magic_bonus(content),
                    self.enemy.def as i32,
                    rng.range(-2, 2),
                );
                self.enemy.hp = self.enemy.hp.saturating_sub(hp_loss(damage));
                self.message = format!("{}! {} dmg!", spell.name, damage);
                CastOutcome::Damaged(damage)
            }
            SpellKind::Heal => {
                let heal = spell_heal(spell.power as i32, player.mag as i32);
                player.restore(heal, 0);
                self.message = format!("{}! +{} HP!", spell.name, heal);
                CastOutcome::Healed(heal)
            }
            SpellKind::Buff => {
                player.def = player.def.saturating_add(spell.power);
                self.message = format!("{}! DEF+{}!", spell.name, spell.power);
                CastOutcome::Buffed(spell.power)
            }
            SpellKind::Debuff => {
                let reduction = spell.power.min(self.enemy.def);
                self.enemy.def -= reduction;
                self.message = format!("{}! DEF-{}!", spell.name, reduction);
                CastOutcome::Debuffed(reduction)
            }
        };

        debug!("cast {} -> {:?}", spell.name, outcome);
        self.player_defending = false;
        self.phase = TurnPhase::EnemyResolve;
        Ok(outcome)
    }

    /// Uses one unit of a consumable during combat.
    pub fn use_item(&mut self, player: &mut Player, item: &Item) -> DescentResult<()> {
        let ItemKind::Consumable {
            hp_restore,
            mp_restore,
        } = item.kind
        else {
            return Err(DescentError::InvalidAction("Can't use that!".to_string()));
        };

        player.restore(hp_restore as i32, mp_restore as i32);
        player.inventory.remove(item.id, 1);
        self.message = format!("Used {}!", item.name);
        self.player_defending = false;
        self.phase = TurnPhase::EnemyResolve;
        Ok(())
    }

    /// Resolves the enemy phase: pays out a victory or lets the enemy act.
    ///
    /// Enemy damage is applied to the player. The caller moves to the game
    /// over screen when the player dies.
    pub fn resolve_enemy_turn(
        &mut self,
        player: &mut Player,
        content: &ContentLibrary,
        rng: &mut GameRng,
    ) -> EnemyTurn {
        if self.enemy.is_defeated() {
            let report = self.grant_victory(player, content, rng);
            return EnemyTurn::Victory(report);
        }

        let action = choose_enemy_action(
            &self.enemy,
            player.def as i32,
            player.armor_bonus(content),
            self.player_defending,
            rng,
        );
        if action == EnemyAction::Brace {
            self.enemy_defending = true;
        }
        player.take_damage(action.damage());
        self.message = action.describe(&self.enemy.name);

        if player.is_dead() {
            info!("{} was defeated by {}", player.name, self.enemy.name);
            self.phase = TurnPhase::Result;
        } else {
            self.phase = TurnPhase::Choose;
            self.player_defending = false;
        }
        EnemyTurn::Acted(action)
    }

    fn grant_victory(
        &mut self,
        player: &mut Player,
        content: &ContentLibrary,
        rng: &mut GameRng,
    ) -> VictoryReport {
        let drop_rolled = rng.chance(self.enemy.drop_chance as u32);
        let report = VictoryReport {
            xp: self.enemy.xp_reward as u32,
            gold: self.enemy.gold_reward as u32,
            drop: (drop_rolled && self.enemy.drop_item > 0).then_some(self.enemy.drop_item),
        };

        player.xp = player.xp.saturating_add(report.xp);
        player.gold = player.gold.saturating_add(report.gold);
        if let Some(item_id) = report.drop {
            player.inventory.add(item_id, 1);
        }
        player.quests.record_kill(content, self.enemy.id);

        info!(
            "defeated {}: +{} xp, +{} gold, drop {:?}",
            self.enemy.name, report.xp, report.gold, report.drop
        );
        self.phase = TurnPhase::Result;
        self.victory = Some(report);
        report
    }
}

/// Picks and rolls the enemy's action according to its behaviour.
pub fn choose_enemy_action(
    enemy: &Enemy,
    player_def: i32,
    armor_bonus: i32,
    defending: bool,
    rng: &mut GameRng,
) -> EnemyAction {
    let enemy_atk = enemy.atk as i32;
    let enemy_mag = enemy.mag as i32;

    match enemy.ai {
        AiBehavior::Boss => {
            let roll = rng.percent();
            if roll < 30 && enemy.mag > 0 {
                EnemyAction::Blast {
                    damage: boss_blast_damage(enemy_mag, player_def, rng.range(2, 5), defending),
                }
            } else if roll < 50 {
                EnemyAction::Smash {
                    damage: boss_heavy_damage(enemy_atk, player_def, rng.range(-1, 2), defending),
                }
            } else {
                strike(enemy_atk, player_def, armor_bonus, defending, rng)
            }
        }
        AiBehavior::Magic if rng.chance(50) => EnemyAction::Cast {
            damage: enemy_spell_damage(enemy_mag, player_def, rng.range(-1, 2), defending),
        },
        AiBehavior::Defensive if rng.chance(30) => EnemyAction::Brace,
        _ => strike(enemy_atk, player_def, armor_bonus, defending, rng),
    }
}

fn strike(
    enemy_atk: i32,
    player_def: i32,
    armor_bonus: i32,
    defending: bool,
    rng: &mut GameRng,
) -> EnemyAction {
    EnemyAction::Strike {
        damage: enemy_attack_damage(enemy_atk, player_def, armor_bonus, rng.range(-2, 2), defending),
    }
}

/// Levels the player up once if enough experience has been gathered.
pub fn check_level_up(
    player: &mut Player,
    content: &ContentLibrary,
    rng: &mut GameRng,
) -> Option<LevelGains> {
    if player.xp < player.xp_next || player.level >= MAX_LEVEL {
        return None;
    }

    player.level += 1;
    let level = player.level;
    let gains = LevelGains {
        hp: 3 + rng.below(3) as u16,
        mp: 2 + rng.below(2) as u16,
        atk: 1 + u16::from(level % 3 == 0),
        def: 1 + u16::from(level % 3 == 1),
        mag: 1 + u16::from(level % 3 == 2),
        spd: u16::from(level % 2 == 0),
    };

    player.max_hp = player.max_hp.saturating_add(gains.hp);
    player.max_mp = player.max_mp.saturating_add(gains.mp);
    player.atk = player.atk.saturating_add(gains.atk);
    player.def = player.def.saturating_add(gains.def);
    player.mag = player.mag.saturating_add(gains.mag);
    player.spd = player.spd.saturating_add(gains.spd);
    player.heal_full();
    player.xp_next = content.xp_for_level(level.saturating_add(1));

    info!("{} reached level {}", player.name, level);
    Some(gains)
}
