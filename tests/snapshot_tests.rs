//! Snapshot persistence integration tests.
//!
//! Verifies that a live ledger and chat record survive a JSON round trip, that
//! snapshots written by older hosts (camelCase field names, odd values) restore
//! cleanly, and that the restored ledger always satisfies the ledger invariants.

#[cfg(feature = "serde")]
mod tests {
    use slow_burn_core::validate::Repair;
    use slow_burn_core::{
        Archetype, ChatRecord, Engine, EngineConfig, LedgerSnapshot, MilestoneFlags, Pacing,
        ProgressionLedger, Stage, StateValidator, Topic,
    };

    const NOW: i64 = 1_740_000_000_000;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn fixed_clock() -> i64 {
        NOW
    }

    fn engine() -> Engine<fn() -> i64> {
        Engine::with_clock(EngineConfig::default(), fixed_clock as fn() -> i64)
    }

    /// Play a few turns so the ledger and record carry real history.
    fn played() -> (ProgressionLedger, ChatRecord) {
        let mut e = engine();
        let mut ledger = ProgressionLedger::new(NOW)
            .with_archetype(Archetype::Confident)
            .with_pacing(Pacing::Fast)
            .with_affection(45);
        let mut record = ChatRecord::new();
        for text in [
            "What do you do when you can't sleep?",
            "I'm scared I'll mess this job up, honestly.",
            "Remember what you said yesterday? You were right.",
        ] {
            let out = e.before_prompt(ledger, record, text);
            ledger = out.ledger;
            record = out.record;
        }
        (ledger, record)
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_ledger_round_trip_is_exact() {
        let (ledger, _) = played();
        let json = serde_json::to_string(&ledger.snapshot()).expect("serialise snapshot");
        let back: LedgerSnapshot = serde_json::from_str(&json).expect("deserialise snapshot");
        let repaired = StateValidator::new().repair(&back, 0);

        assert!(
            repaired.repairs.is_empty(),
            "a snapshot of a live ledger needs no repair, got {:?}",
            repaired.repairs
        );
        assert_eq!(repaired.ledger, ledger);
    }

    #[test]
    fn test_chat_record_round_trip_keeps_topics_and_events() {
        let (ledger, record) = played();
        assert!(ledger.affection() >= Topic::FamilyBackground.threshold());

        let json = serde_json::to_string(&record).expect("serialise record");
        let back: ChatRecord = serde_json::from_str(&json).expect("deserialise record");

        assert_eq!(back, record);
        assert!(back.is_topic_unlocked(Topic::FamilyBackground));
        assert_eq!(back.events().len(), record.events().len());
        assert_eq!(back.growth_level(), record.growth_level());
    }

    #[test]
    fn test_camel_case_host_snapshot_is_accepted() {
        let json = r#"{
            "affection": 88,
            "relationshipStage": "friends",
            "characterArchetype": "TSUNDERE",
            "pacingSpeed": "moderate",
            "interactionCount": 31,
            "messagesThisSession": 4,
            "lastInteractionTime": 1739999999000,
            "sessionStartTime": 1739999000000
        }"#;
        let snapshot: LedgerSnapshot = serde_json::from_str(json).expect("camelCase snapshot");
        let ledger = engine().restore(&snapshot);

        assert_eq!(ledger.affection(), 88);
        assert_eq!(ledger.stage(), Stage::Friends);
        assert_eq!(ledger.archetype(), Archetype::Tsundere);
        assert_eq!(ledger.pacing(), Pacing::Moderate);
        assert_eq!(ledger.interaction_count(), 31);
        assert_eq!(ledger.messages_this_session(), 4);
        assert_eq!(ledger.session_start_ms(), 1_739_999_000_000);
    }

    #[test]
    fn test_empty_archetype_is_repaired_and_nothing_else_changes() {
        let (ledger, _) = played();
        let mut snapshot = ledger.snapshot();
        snapshot.archetype = Some(String::new());
        let json = serde_json::to_string(&snapshot).expect("serialise");
        let back: LedgerSnapshot = serde_json::from_str(&json).expect("deserialise");

        let restored = engine().restore(&back);
        assert_eq!(restored.archetype(), Archetype::Guarded);
        assert_eq!(restored.affection(), ledger.affection());
        assert_eq!(restored.stage(), ledger.stage());
        assert_eq!(restored.pacing(), ledger.pacing());
        assert_eq!(restored.interaction_count(), ledger.interaction_count());
        assert_eq!(restored.flags(), ledger.flags());
    }

    #[test]
    fn test_out_of_range_values_restore_within_bounds() {
        let json = r#"{"affection": 612.7, "relationshipStage": "strangers", "pacingSpeed": "ludicrous"}"#;
        let snapshot: LedgerSnapshot = serde_json::from_str(json).expect("snapshot");
        let ledger = engine().restore(&snapshot);

        assert_eq!(ledger.affection(), 250);
        assert_eq!(ledger.stage(), Stage::Romance);
        assert_eq!(ledger.pacing(), Pacing::Slow);
        assert_eq!(ledger.last_interaction_ms(), NOW);
    }

    #[test]
    fn test_empty_json_object_restores_default_ledger() {
        let snapshot: LedgerSnapshot = serde_json::from_str("{}").expect("empty object");
        assert_eq!(engine().restore(&snapshot), ProgressionLedger::new(NOW));
    }

    #[test]
    fn test_host_record_with_camel_case_fields() {
        let json = r#"{
            "permanentlyUnlockedTopics": ["family_background"],
            "significantEvents": [
                {"event": "stage_change_to_acquaintances", "timestamp": 5, "affectionAtTime": 36}
            ],
            "characterGrowthLevel": 7,
            "peakAffection": 60
        }"#;
        let record: ChatRecord = serde_json::from_str(json).expect("host record");
        assert!(record.is_topic_unlocked(Topic::FamilyBackground));
        assert_eq!(record.events()[0].affection_at_time, 36);
        assert_eq!(record.growth_level(), 7);
        assert_eq!(record.peak_affection(), 60);
    }

    #[test]
    fn test_host_milestone_flags_survive_restore() {
        let json = r#"{"affection": 50, "flags": {"firstCompliment": true, "hadArgument": true}}"#;
        let snapshot: LedgerSnapshot = serde_json::from_str(json).expect("host flags");
        let ledger = engine().restore(&snapshot);

        assert_eq!(
            ledger.flags(),
            MilestoneFlags {
                first_compliment: true,
                had_argument: true,
                ..MilestoneFlags::default()
            }
        );
    }

    #[test]
    fn test_wrong_typed_fields_are_repaired_not_rejected() {
        let json = r#"{"affection": 50, "characterArchetype": 3, "pacingSpeed": "fast"}"#;
        let snapshot: LedgerSnapshot = serde_json::from_str(json).expect("wrong-typed archetype");
        assert!(snapshot.archetype.is_none());

        let ledger = engine().restore(&snapshot);
        assert_eq!(ledger.affection(), 50);
        assert_eq!(ledger.archetype(), Archetype::Guarded);
        assert_eq!(ledger.pacing(), Pacing::Fast);

        let json = r#"{"affection": "abc", "interactionCount": [1], "flags": "yes", "sessionStartTime": 9}"#;
        let snapshot: LedgerSnapshot = serde_json::from_str(json).expect("wrong-typed fields");
        let repaired = StateValidator::new().repair(&snapshot, NOW);
        assert!(repaired.repairs.contains(&Repair::AffectionMissing));
        assert_eq!(repaired.ledger.affection(), 0);
        assert_eq!(repaired.ledger.interaction_count(), 0);
        assert_eq!(repaired.ledger.flags(), MilestoneFlags::default());
        assert_eq!(repaired.ledger.session_start_ms(), 9);
    }
}
