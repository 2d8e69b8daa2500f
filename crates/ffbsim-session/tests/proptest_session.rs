//! Property-based tests for cursor navigation and the single-playing rule.

#[cfg(test)]
mod proptest_session {
    use ffbsim_ffb::{EffectDefinition, EffectKind};
    use ffbsim_session::{
        DeviceLocator, DeviceSession, EffectCatalog, EffectHandle, SessionConfig,
        VirtualWheelControl,
    };
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Next,
        Previous,
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Play(usize),
        PlaySelected,
        StopAll,
        StopSelected,
        Next,
        Previous,
    }

    fn catalog_of(size: usize) -> EffectCatalog {
        let mut catalog = EffectCatalog::new();
        for i in 0..size {
            let added = catalog.add_resident(
                EffectDefinition::new(format!("E{i}"), EffectKind::constant(0.1)),
                EffectHandle(u32::try_from(i).unwrap_or(u32::MAX)),
            );
            assert!(added.is_ok());
        }
        catalog
    }

    fn steps() -> impl Strategy<Value = Vec<Step>> {
        prop::collection::vec(prop_oneof![Just(Step::Next), Just(Step::Previous)], 0..64)
    }

    fn ops() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(
            prop_oneof![
                (0usize..14).prop_map(Op::Play),
                Just(Op::PlaySelected),
                Just(Op::StopAll),
                Just(Op::StopSelected),
                Just(Op::Next),
                Just(Op::Previous),
            ],
            1..24,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        // --- Cursor stays in [0, N) for any navigation sequence ---

        #[test]
        fn cursor_stays_in_range(size in 1usize..20, sequence in steps()) {
            let mut catalog = catalog_of(size);
            for step in sequence {
                match step {
                    Step::Next => catalog.advance(),
                    Step::Previous => catalog.retreat(),
                }
                let index = catalog.current_index();
                prop_assert!(index.is_some_and(|i| i < size), "index {:?} for size {}", index, size);
            }
        }

        // --- N consecutive advances return to the starting index ---

        #[test]
        fn full_lap_returns_home(size in 1usize..20, sequence in steps()) {
            let mut catalog = catalog_of(size);
            for step in sequence {
                match step {
                    Step::Next => catalog.advance(),
                    Step::Previous => catalog.retreat(),
                }
            }
            let home = catalog.current_index();
            for _ in 0..size {
                catalog.advance();
            }
            prop_assert_eq!(catalog.current_index(), home);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        // --- At most one effect plays, and the session agrees with the device ---

        #[test]
        fn at_most_one_effect_plays(sequence in ops()) {
            let wheel = VirtualWheelControl::resident();
            let config = SessionConfig { poll_interval_ms: 50, ..SessionConfig::default() };
            let initialized = DeviceSession::initialize(&wheel.provider(), &DeviceLocator::default(), config);
            prop_assert!(initialized.is_ok());
            let Ok((session, _)) = initialized else {
                return Ok(());
            };
            let names = session.list_effect_names();

            for op in sequence {
                match op {
                    Op::Play(i) => {
                        let handle = names.get(i).and_then(|n| session.handle_of(n));
                        prop_assert!(handle.is_some());
                        if let Some(handle) = handle {
                            prop_assert!(session.play(handle).is_ok());
                            prop_assert_eq!(wheel.playing_handles(), vec![handle]);
                        }
                    }
                    Op::PlaySelected => prop_assert!(session.play_selected().is_ok()),
                    Op::StopAll => {
                        session.stop_all();
                        prop_assert!(wheel.playing_handles().is_empty());
                        prop_assert_eq!(session.playing_handle(), None);
                    }
                    Op::StopSelected => session.stop_selected(),
                    Op::Next => {
                        session.select_next();
                    }
                    Op::Previous => {
                        session.select_previous();
                    }
                }
                let playing = wheel.playing_handles();
                prop_assert!(playing.len() <= 1);
                prop_assert_eq!(playing.first().copied(), session.playing_handle());
            }
        }
    }
}
