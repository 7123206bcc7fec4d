//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rust_combat::combat::{CombatState, ConfigSpawner, SlotGrid};
use rust_combat::combatant::{CombatantConfig, CombatantModel};
use rust_combat::core::{CombatConfig, CombatantId, FixedRandom, TeamId};
use rust_combat::events::EventLog;

/// Install a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builder for a small fight with scripted randomness.
pub struct Arena {
    config: CombatConfig,
    rng: FixedRandom,
    slots: u8,
    spawner: ConfigSpawner,
    combatants: Vec<CombatantModel>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            config: CombatConfig::default(),
            rng: FixedRandom::always(),
            slots: 4,
            spawner: ConfigSpawner::new(),
            combatants: Vec::new(),
        }
    }

    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rng(mut self, rng: FixedRandom) -> Self {
        self.rng = rng;
        self
    }

    pub fn slots(mut self, slots: u8) -> Self {
        self.slots = slots;
        self
    }

    /// Make a configuration available to summons.
    pub fn summonable(mut self, config: CombatantConfig) -> Self {
        self.spawner.register(config);
        self
    }

    pub fn player(self, id: u32, config: CombatantConfig) -> Self {
        self.with(id, TeamId::PLAYER, config)
    }

    pub fn enemy(self, id: u32, config: CombatantConfig) -> Self {
        self.with(id, TeamId::ENEMY, config)
    }

    fn with(mut self, id: u32, team: TeamId, config: CombatantConfig) -> Self {
        self.combatants
            .push(CombatantModel::new(CombatantId(id), team, Arc::new(config)));
        self
    }

    /// Build the fight, queue every combatant in insertion order and
    /// attach a recording listener.
    pub fn build(self) -> (CombatState, EventLog) {
        init_tracing();
        let mut combat = CombatState::new(self.config, self.rng, SlotGrid::new(self.slots), self.spawner);
        for model in self.combatants {
            let id = combat.add_combatant(model).expect("add combatant");
            combat.add_to_turn_order(id).expect("queue combatant");
        }
        let log = EventLog::new();
        combat.subscribe(log.clone());
        (combat, log)
    }
}

pub fn id(raw: u32) -> CombatantId {
    CombatantId(raw)
}

pub fn health(combat: &CombatState, raw: u32) -> i64 {
    combat.combatant(CombatantId(raw)).expect("combatant").health()
}
