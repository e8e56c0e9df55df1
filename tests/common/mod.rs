//! In-memory host used by the integration suites.
//!
//! Every fake is a cheap handle over shared state, so a test keeps one
//! clone for assertions and hands another to the engine.

#![allow(dead_code)]

use paragon::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const LEVEL_CAP: u8 = 80;

/// Route engine logs to the test harness; `RUST_LOG=paragon=debug` shows them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Standard curve: 1000 xp per level.
pub fn standard_xp(level: u8) -> u32 {
    u32::from(level) * 1_000
}

#[derive(Clone, Default)]
pub struct MemoryCurrency {
    pub ranks: Arc<Mutex<HashMap<CharacterId, u32>>>,
    pub offline: Arc<AtomicBool>,
    pub fail_reads: Arc<AtomicBool>,
    pub fail_increments: Arc<AtomicBool>,
    pub increments: Arc<AtomicUsize>,
}

impl MemoryCurrency {
    pub fn set_rank(&self, character: CharacterId, rank: u32) {
        self.ranks.lock().unwrap().insert(character, rank);
    }

    pub fn rank(&self, character: CharacterId) -> Option<u32> {
        self.ranks.lock().unwrap().get(&character).copied()
    }

    pub fn increments(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }
}

impl CurrencyStore for MemoryCurrency {
    fn paragon_rank(&self, character: CharacterId) -> Result<Option<u32>, StoreError> {
        if self.offline.load(Ordering::SeqCst) || self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("currency offline".into()));
        }
        Ok(self.rank(character))
    }

    fn increment_paragon_rank(&self, character: CharacterId) -> Result<u32, StoreError> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) || self.fail_increments.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("currency offline".into()));
        }
        let mut ranks = self.ranks.lock().unwrap();
        let rank = ranks.entry(character).or_insert(0);
        *rank += 1;
        Ok(*rank)
    }
}

#[derive(Clone, Default)]
pub struct MemoryPreferences {
    pub rows: Arc<Mutex<HashMap<CharacterId, bool>>>,
    pub loads: Arc<AtomicUsize>,
    pub fail_saves: Arc<AtomicBool>,
}

impl MemoryPreferences {
    pub fn row(&self, character: CharacterId) -> Option<bool> {
        self.rows.lock().unwrap().get(&character).copied()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load_chat_color(&self, character: CharacterId) -> Result<Option<bool>, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.row(character))
    }

    fn save_chat_color(&self, character: CharacterId, enabled: bool) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("preferences offline".into()));
        }
        self.rows.lock().unwrap().insert(character, enabled);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryTitles {
    pub catalog: Arc<Mutex<HashMap<u32, String>>>,
    pub granted: Arc<Mutex<Vec<(CharacterId, u32)>>>,
    pub lookups: Arc<AtomicUsize>,
}

impl MemoryTitles {
    pub fn add(&self, id: u32, name: &str) {
        self.catalog.lock().unwrap().insert(id, name.to_string());
    }

    pub fn granted(&self) -> Vec<(CharacterId, u32)> {
        self.granted.lock().unwrap().clone()
    }
}

impl TitleCatalog for MemoryTitles {
    fn find_title(&self, id: u32) -> Result<Option<TitleEntry>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .catalog
            .lock()
            .unwrap()
            .get(&id)
            .map(|name| TitleEntry { id, name: name.clone() }))
    }

    fn grant_title(&self, character: CharacterId, title: &TitleEntry) -> Result<(), StoreError> {
        self.granted.lock().unwrap().push((character, title.id));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingRewards {
    pub events: Arc<Mutex<Vec<(CharacterId, RewardEvent)>>>,
}

impl RecordingRewards {
    pub fn events(&self) -> Vec<RewardEvent> {
        self.events.lock().unwrap().iter().map(|(_, e)| *e).collect()
    }
}

impl RewardHooks for RecordingRewards {
    fn handle_rewards(&self, character: CharacterId, event: RewardEvent) {
        self.events.lock().unwrap().push((character, event));
    }
}

#[derive(Clone, Default)]
pub struct FakeWorld {
    pub online: Arc<Mutex<HashMap<String, CharacterId>>>,
    pub max_player_level: Arc<Mutex<Option<u8>>>,
}

impl FakeWorld {
    pub fn login(&self, name: &str, character: CharacterId) {
        self.online.lock().unwrap().insert(name.to_string(), character);
    }

    pub fn max_player_level(&self) -> Option<u8> {
        *self.max_player_level.lock().unwrap()
    }
}

impl World for FakeWorld {
    fn find_online_by_name(&self, name: &str) -> Option<CharacterId> {
        self.online.lock().unwrap().get(name).copied()
    }

    fn set_max_player_level(&self, level: u8) {
        *self.max_player_level.lock().unwrap() = Some(level);
    }
}

/// One of each fake, shared with the engine built from it.
#[derive(Clone, Default)]
pub struct FakeHost {
    pub currency: MemoryCurrency,
    pub preferences: MemoryPreferences,
    pub titles: MemoryTitles,
    pub rewards: RecordingRewards,
    pub world: FakeWorld,
}

impl FakeHost {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    pub fn services(&self) -> HostServices {
        HostServices {
            currency: Box::new(self.currency.clone()),
            preferences: Box::new(self.preferences.clone()),
            experience: Box::new(standard_xp),
            titles: Box::new(self.titles.clone()),
            rewards: Box::new(self.rewards.clone()),
            world: Box::new(self.world.clone()),
        }
    }

    pub fn engine(&self, config: ProgressionConfig) -> ParagonEngine {
        ParagonEngine::new(config, self.services())
    }
}

/// Config with the test level cap and no level-up effect.
pub fn test_config() -> ProgressionConfig {
    ProgressionConfig {
        host_level_cap: LEVEL_CAP,
        level_up_effect: None,
        ..ProgressionConfig::default()
    }
}

pub struct FakePlayer {
    pub id: CharacterId,
    pub name: String,
    pub level: u8,
    pub dead: bool,
    pub bot: bool,
    pub spells: Vec<u32>,
    pub full_health: bool,
    pub powers: HashMap<Power, (u32, u32)>,
    pub next_level_xp: Option<u32>,
    pub messages: Vec<String>,
    pub packets: Vec<(u16, Vec<u8>)>,
}

impl FakePlayer {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id: CharacterId::new(id),
            name: name.to_string(),
            level: LEVEL_CAP,
            dead: false,
            bot: false,
            spells: Vec::new(),
            full_health: false,
            powers: HashMap::new(),
            next_level_xp: None,
            messages: Vec::new(),
            packets: Vec::new(),
        }
    }

    pub fn with_power(mut self, power: Power, current: u32, max: u32) -> Self {
        self.powers.insert(power, (current, max));
        self
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl Player for FakePlayer {
    fn id(&self) -> CharacterId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> u8 {
        self.level
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn is_bot(&self) -> bool {
        self.bot
    }

    fn cast_spell_on_self(&mut self, spell_id: u32) {
        self.spells.push(spell_id);
    }

    fn set_full_health(&mut self) {
        self.full_health = true;
    }

    fn power(&self, power: Power) -> u32 {
        self.powers.get(&power).map(|p| p.0).unwrap_or(0)
    }

    fn max_power(&self, power: Power) -> u32 {
        self.powers.get(&power).map(|p| p.1).unwrap_or(0)
    }

    fn set_power(&mut self, power: Power, value: u32) {
        self.powers.entry(power).or_insert((0, 0)).0 = value;
    }

    fn set_next_level_xp(&mut self, xp: u32) {
        self.next_level_xp = Some(xp);
    }

    fn send_system_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn send_packet(&mut self, opcode: u16, body: &[u8]) {
        self.packets.push((opcode, body.to_vec()));
    }
}
