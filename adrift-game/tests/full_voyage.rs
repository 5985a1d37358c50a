use adrift_game::{
    Card, Deck, Difficulty, LogEntryKind, Options, Phase, Rank, Roller, RollerBundle,
    ScriptedRoller, Session, Suit,
    seed::{decode_to_seed, encode_friendly, generate_code_from_entropy},
};

fn start_session(seed: u64, options: Options, deck: Deck) -> Session {
    let mut session = Session::new(RollerBundle::from_user_seed(seed), seed);
    session.start_game("mara", options, deck).unwrap();
    session
}

/// Play a started session to its decision, journaling as it goes. Panics
/// if the runner lands anywhere a voyage cannot legally sit.
fn drive_to_decision<R: Roller>(session: &mut Session<R>) {
    session.transition_to(Phase::InitialDamageRoll).unwrap();
    let mut steps = 0;
    while !session.state().game_over {
        steps += 1;
        assert!(steps < 10_000, "voyage never decided");
        match session.state().phase {
            Phase::InitialDamageRoll => {
                session.initial_damage_roll().unwrap();
                session.apply_initial_damage().unwrap();
            }
            Phase::StartRound => session.transition_to(Phase::RollForTasks).unwrap(),
            Phase::RollForTasks => {
                session.roll_for_tasks().unwrap();
                session.apply_task_roll().unwrap();
            }
            Phase::DrawCard => {
                let drawn = session.draw_card().unwrap();
                if drawn.card.is_some() {
                    session.confirm_card().unwrap();
                }
            }
            Phase::FailureCheck => {
                session.stability_roll().unwrap();
                session.apply_stability_check().unwrap();
            }
            Phase::Log => {
                let round = session.state().round;
                session
                    .record_journal_entry(&format!("round {round} in the log"))
                    .unwrap();
            }
            Phase::SuccessCheck => {
                session.salvation_roll().unwrap();
                session.apply_salvation_check().unwrap();
            }
            Phase::FinalDamageRoll => {
                session.final_damage_roll().unwrap();
                session.apply_final_damage().unwrap();
            }
            other => panic!("runner stuck in {other}"),
        }

        let state = session.state();
        assert!((0..=20).contains(&state.hull));
        assert!(state.aces_revealed() <= 4);
        assert!(state.kings_revealed() <= 4);
        assert!(state.pending.is_none());
    }
    assert_eq!(session.state().phase, Phase::GameOver);
}

#[test]
fn full_voyages_decide_and_replay_deterministically() {
    for seed in [0xDEAD_BEEF_u64, 0x5EED, 7, 42] {
        let mut session = start_session(seed, Options::default(), Deck::standard());
        drive_to_decision(&mut session);
        let first = session.into_state();
        assert!(first.game_over);
        assert!(!first.journal.is_empty());
        if first.win {
            assert_eq!(first.tokens, 0);
        } else {
            assert!(first.hull == 0 || first.deck.is_empty() || first.kings_revealed() == 4);
        }

        // The same seed replays to the identical decision.
        let mut replay = start_session(seed, Options::default(), Deck::standard());
        drive_to_decision(&mut replay);
        assert_eq!(replay.into_state(), first);
    }
}

#[test]
fn decided_voyages_restart_onto_a_pristine_deck() {
    let mut session = start_session(0xBAD_CAFE, Options::default(), Deck::standard());
    drive_to_decision(&mut session);
    session.restart_game().unwrap();

    let state = session.state();
    assert_eq!(state.phase, Phase::Intro);
    assert_eq!(state.hull, 20);
    assert_eq!(state.round, 1);
    assert_eq!(state.deck.len(), 52);
    assert!(state.journal.is_empty());
    assert!(!state.game_over);
    assert_eq!(state.seed, 0xBAD_CAFE);
    assert_eq!(state.player, "mara");
}

fn beacon_deck() -> Deck {
    Deck::from_cards(vec![
        Card::bare(Rank::Two, Suit::Spades),
        Card::bare(Rank::Four, Suit::Diamonds),
        Card::bare(Rank::Ace, Suit::Hearts),
    ])
}

#[test]
fn drawing_the_beacon_first_can_win_outright() {
    // A single rescue token left, and the ace of hearts stacked on top.
    let options = Options {
        difficulty: Difficulty::Standard,
        starting_tokens: 1,
    };
    let mut session = start_session(11, options, beacon_deck());

    // Put the draw order back after the shuffle; the scripted path cares
    // about order, not fairness.
    session.with_state_mut(|state| state.deck = beacon_deck());
    let mut session = Session::from_state(session.into_state(), ScriptedRoller::new(&[12, 1, 20]));

    session.transition_to(Phase::InitialDamageRoll).unwrap();
    session.initial_damage_roll().unwrap();
    session.apply_initial_damage().unwrap();
    session.transition_to(Phase::RollForTasks).unwrap();
    session.roll_for_tasks().unwrap();
    session.apply_task_roll().unwrap();

    let drawn = session.draw_card().unwrap().card.unwrap();
    assert_eq!(drawn.rank, Rank::Ace);
    assert_eq!(drawn.suit, Suit::Hearts);
    assert_eq!(session.confirm_card().unwrap(), Phase::Log);
    assert!(session.state().salvation_unlocked);

    session.record_journal_entry("the beacon answers").unwrap();
    assert_eq!(session.state().phase, Phase::SuccessCheck);
    session.salvation_roll().unwrap();
    let outcome = session.apply_salvation_check().unwrap();
    assert!(outcome.game_over);
    assert!(outcome.win);
    assert_eq!(session.state().tokens, 0);

    // The ending still gets its closing entry.
    session.transition_to(Phase::FinalLog).unwrap();
    session.record_final_entry("pulled out alive").unwrap();
    let state = session.into_state();
    let last = state.journal.last().unwrap();
    assert_eq!(last.id, "final");
    assert!(matches!(last.kind, LogEntryKind::Final { .. }));
}

#[test]
fn an_exhausted_deck_sinks_the_station() {
    let mut session = start_session(3, Options::default(), Deck::standard());
    session.with_state_mut(|state| {
        state.deck = Deck::from_cards(vec![
            Card::bare(Rank::Two, Suit::Clubs),
            Card::bare(Rank::Four, Suit::Spades),
        ]);
    });
    let mut session = Session::from_state(session.into_state(), ScriptedRoller::new(&[12, 16]));

    session.transition_to(Phase::InitialDamageRoll).unwrap();
    session.initial_damage_roll().unwrap();
    session.apply_initial_damage().unwrap();
    session.transition_to(Phase::RollForTasks).unwrap();
    session.roll_for_tasks().unwrap();
    session.apply_task_roll().unwrap();
    assert_eq!(session.state().cards_to_draw, 5);

    for _ in 0..2 {
        assert!(session.draw_card().unwrap().card.is_some());
        assert_eq!(session.confirm_card().unwrap(), Phase::DrawCard);
    }
    let last = session.draw_card().unwrap();
    assert!(last.deck_exhausted);
    assert!(last.card.is_none());

    let state = session.state();
    assert_eq!(state.phase, Phase::GameOver);
    assert!(state.game_over);
    assert!(!state.win);
}

#[test]
fn the_fourth_king_sinks_the_station() {
    let mut session = start_session(9, Options::default(), Deck::standard());
    session.with_state_mut(|state| {
        state.deck = Deck::from_cards(vec![
            Card::bare(Rank::King, Suit::Clubs),
            Card::bare(Rank::King, Suit::Diamonds),
            Card::bare(Rank::King, Suit::Hearts),
            Card::bare(Rank::King, Suit::Spades),
        ]);
    });
    // Calm stability rolls keep the hull out of the picture.
    let mut session =
        Session::from_state(session.into_state(), ScriptedRoller::new(&[12, 16, 12, 12, 12]));
    drive_to_decision(&mut session);

    let state = session.into_state();
    assert_eq!(state.kings_revealed(), 4);
    assert!(!state.win);
    assert_eq!(state.hull, 20);
}

#[test]
fn share_codes_survive_the_round_trip() {
    let friendly = encode_friendly(Difficulty::Abyssal, 0x5EED);
    let (difficulty, seed) = decode_to_seed(&friendly).unwrap();
    assert_eq!(encode_friendly(difficulty, seed), friendly);

    let share = generate_code_from_entropy(Difficulty::Respite, 123_456_789);
    assert!(decode_to_seed(&share).is_some());
}
