//! Milestone reward dispatch.
//!
//! Every rank-up fires the reward system; multiples of five fire it again
//! with a separate event, and configured milestone ranks grant a title.

use crate::character::CharacterId;
use crate::config::ProgressionConfig;
use crate::error::ParagonError;
use crate::host::{Player, RewardEvent, RewardHooks, TitleCatalog};
use tracing::{info, warn};

/// What a single dispatch did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Reward events fired, in order.
    pub events: Vec<RewardEvent>,
    /// Title granted at a milestone, if any.
    pub title_granted: Option<u32>,
}

/// Fires rank-up rewards and milestone titles.
pub struct MilestoneDispatcher {
    rewards: Box<dyn RewardHooks>,
    titles: Box<dyn TitleCatalog>,
}

impl MilestoneDispatcher {
    pub fn new(rewards: Box<dyn RewardHooks>, titles: Box<dyn TitleCatalog>) -> Self {
        Self { rewards, titles }
    }

    /// Dispatch rewards for `player` reaching `rank`.
    ///
    /// A milestone title that cannot be resolved or granted is reported to
    /// the character and not retried.
    pub fn dispatch(
        &self,
        player: &mut dyn Player,
        rank: u32,
        config: &ProgressionConfig,
    ) -> DispatchOutcome {
        let character = player.id();
        let mut outcome = DispatchOutcome::default();

        self.rewards.handle_rewards(character, RewardEvent::RankUp);
        outcome.events.push(RewardEvent::RankUp);

        if rank % 5 == 0 {
            self.rewards
                .handle_rewards(character, RewardEvent::FiveRankInterval);
            outcome.events.push(RewardEvent::FiveRankInterval);
        }

        if let Some(title) = config.title_for_rank(rank) {
            match self.grant_title(character, title) {
                Ok(()) => {
                    info!(%character, rank, title, "paragon milestone title granted");
                    outcome.title_granted = Some(title);
                }
                Err(err) => {
                    warn!(%character, rank, title, error = %err, "paragon milestone title not granted");
                    player.send_system_message(&format!(
                        "Paragon milestone {rank}: title {title} could not be granted ({err})."
                    ));
                }
            }
        }

        outcome
    }

    fn grant_title(&self, character: CharacterId, title: u32) -> Result<(), ParagonError> {
        let entry = self
            .titles
            .find_title(title)
            .map_err(|source| ParagonError::TitleCatalog { title, source })?
            .ok_or(ParagonError::UnknownTitle(title))?;

        self.titles
            .grant_title(character, &entry)
            .map_err(|source| ParagonError::TitleCatalog { title, source })
    }
}

impl std::fmt::Debug for MilestoneDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilestoneDispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::host::{Power, TitleEntry};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<RewardEvent>>>);

    impl RewardHooks for Recorder {
        fn handle_rewards(&self, _character: CharacterId, event: RewardEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    /// Knows title 143 and fails every grant.
    struct RefusingTitles;

    impl TitleCatalog for RefusingTitles {
        fn find_title(&self, id: u32) -> Result<Option<TitleEntry>, StoreError> {
            Ok((id == 143).then(|| TitleEntry {
                id,
                name: "the Paragon".into(),
            }))
        }

        fn grant_title(&self, _character: CharacterId, _title: &TitleEntry) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("title table locked".into()))
        }
    }

    #[derive(Default)]
    struct Inbox {
        messages: Vec<String>,
    }

    impl Player for Inbox {
        fn id(&self) -> CharacterId {
            CharacterId::new(5)
        }
        fn name(&self) -> &str {
            "Eve"
        }
        fn level(&self) -> u8 {
            80
        }
        fn is_dead(&self) -> bool {
            false
        }
        fn is_bot(&self) -> bool {
            false
        }
        fn cast_spell_on_self(&mut self, _spell_id: u32) {}
        fn set_full_health(&mut self) {}
        fn power(&self, _power: Power) -> u32 {
            0
        }
        fn max_power(&self, _power: Power) -> u32 {
            0
        }
        fn set_power(&mut self, _power: Power, _value: u32) {}
        fn set_next_level_xp(&mut self, _xp: u32) {}
        fn send_system_message(&mut self, text: &str) {
            self.messages.push(text.to_string());
        }
        fn send_packet(&mut self, _opcode: u16, _body: &[u8]) {}
    }

    fn dispatcher() -> (MilestoneDispatcher, Recorder) {
        let recorder = Recorder::default();
        let dispatcher = MilestoneDispatcher::new(Box::new(recorder.clone()), Box::new(RefusingTitles));
        (dispatcher, recorder)
    }

    #[test]
    fn test_fifth_rank_fires_interval_event() {
        let (dispatcher, recorder) = dispatcher();
        let mut player = Inbox::default();

        let outcome = dispatcher.dispatch(&mut player, 5, &ProgressionConfig::default());

        let expected = vec![RewardEvent::RankUp, RewardEvent::FiveRankInterval];
        assert_eq!(outcome.events, expected);
        assert_eq!(*recorder.0.lock().unwrap(), expected);
        assert_eq!(outcome.title_granted, None);
    }

    #[test]
    fn test_other_ranks_fire_rank_up_only() {
        let (dispatcher, recorder) = dispatcher();
        let mut player = Inbox::default();

        let outcome = dispatcher.dispatch(&mut player, 6, &ProgressionConfig::default());

        assert_eq!(outcome.events, vec![RewardEvent::RankUp]);
        assert_eq!(*recorder.0.lock().unwrap(), vec![RewardEvent::RankUp]);
        assert!(player.messages.is_empty());
    }

    #[test]
    fn test_failed_grant_is_reported_to_character() {
        let (dispatcher, recorder) = dispatcher();
        let mut player = Inbox::default();
        let mut config = ProgressionConfig::default();
        config.milestone_titles[0] = Some(143);

        let outcome = dispatcher.dispatch(&mut player, 50, &config);

        assert_eq!(outcome.title_granted, None);
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![RewardEvent::RankUp, RewardEvent::FiveRankInterval]
        );
        assert_eq!(player.messages.len(), 1);
        assert!(player.messages[0].starts_with("Paragon milestone 50: title 143 could not be granted"));
        assert!(player.messages[0].contains("title table locked"));
    }

    #[test]
    fn test_unknown_title_is_reported_to_character() {
        let (dispatcher, _) = dispatcher();
        let mut player = Inbox::default();
        let mut config = ProgressionConfig::default();
        config.milestone_titles[1] = Some(999);

        let outcome = dispatcher.dispatch(&mut player, 100, &config);

        assert_eq!(outcome.title_granted, None);
        assert_eq!(player.messages.len(), 1);
        assert!(player.messages[0].contains("Title 999 does not exist"));
    }
}
