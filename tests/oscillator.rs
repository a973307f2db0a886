mod tests {
    use myrtio_light_oscillator::channel::{ChannelId, ColorMode, WhiteChannelPolicy};
    use myrtio_light_oscillator::config::{HardDefaults, OscillatorConfig};
    use myrtio_light_oscillator::oscillator::{ChannelOscillator, TickMode};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn config(min: u8, max: u8, step: u8) -> OscillatorConfig {
        let mut config = OscillatorConfig::from(HardDefaults::new());
        config.min = min;
        config.max = max;
        config.step = step;
        config
    }

    fn oscillator(policy: WhiteChannelPolicy) -> ChannelOscillator<SmallRng> {
        ChannelOscillator::new(SmallRng::seed_from_u64(0x5eed), policy)
    }

    fn brightness(osc: &ChannelOscillator<SmallRng>) -> u8 {
        osc.channel(ChannelId::Brightness).unwrap().value
    }

    #[test]
    fn test_bounce_sequence() {
        let config = config(0, 15, 3);
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 0, &config).unwrap();

        let mut values = Vec::new();
        for _ in 0..10 {
            assert_eq!(osc.advance(&config), TickMode::Bounce);
            values.push(brightness(&osc));
        }
        assert_eq!(values, [3, 6, 9, 12, 15, 12, 9, 6, 3, 0]);

        let state = osc.channel(ChannelId::Brightness).unwrap();
        assert!(state.count_up);
        assert_eq!((state.active_min, state.active_max), (0, 15));

        osc.advance(&config);
        assert_eq!(brightness(&osc), 3);
    }

    #[test]
    fn test_direction_flips_at_boundary() {
        let config = config(0, 15, 3);
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 12, &config).unwrap();

        osc.advance(&config);
        let state = osc.channel(ChannelId::Brightness).unwrap();
        assert_eq!(state.value, 15);
        assert!(!state.count_up);
    }

    #[test]
    fn test_rgbw_white_forced_off() {
        let config = config(0, 255, 5);
        let mut osc = oscillator(WhiteChannelPolicy::ForceOff);
        osc.seed_mode(ColorMode::Rgbw, &config, |id| match id {
            ChannelId::Red => 10,
            ChannelId::Green => 100,
            ChannelId::Blue => 250,
            _ => 125,
        });

        for _ in 0..200 {
            osc.advance(&config);
            let values = osc.values();
            assert_eq!(values.get(&ChannelId::White), Some(&0));
            assert_eq!(values.len(), 4);
        }

        // r, g and b bounce independently and drift apart
        let values = osc.values();
        assert_ne!(values.get(&ChannelId::Red), values.get(&ChannelId::Green));
        assert_ne!(values.get(&ChannelId::Green), values.get(&ChannelId::Blue));
    }

    #[test]
    fn test_rgbw_white_forced_off_in_default_mode() {
        let mut config = config(0, 255, 5);
        config.default_mode_enabled = true;
        config.default_value = 80;
        let mut osc = oscillator(WhiteChannelPolicy::ForceOff);
        osc.seed_mode(ColorMode::Rgbw, &config, |_| 200);

        for _ in 0..5 {
            osc.advance(&config);
            assert_eq!(osc.values().get(&ChannelId::White), Some(&0));
        }
        assert_eq!(osc.values().get(&ChannelId::Red), Some(&80));
    }

    #[test]
    fn test_rgbw_white_oscillates_when_allowed() {
        let config = config(0, 255, 3);
        let mut osc = oscillator(WhiteChannelPolicy::Oscillate);
        osc.seed_mode(ColorMode::Rgbw, &config, |_| 125);

        osc.advance(&config);
        assert_eq!(osc.values().get(&ChannelId::White), Some(&128));
    }

    #[test]
    fn test_collapsed_range_is_constant() {
        let config = config(100, 100, 1);
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 100, &config).unwrap();

        let mut count_up = true;
        for _ in 0..20 {
            osc.advance(&config);
            let state = osc.channel(ChannelId::Brightness).unwrap();
            assert_eq!(state.value, 100);
            assert_ne!(state.count_up, count_up);
            count_up = state.count_up;
        }
    }

    #[test]
    fn test_fixed_range_invariant() {
        let config = config(20, 230, 7);
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed_mode(ColorMode::Rgb, &config, |id| match id {
            ChannelId::Red => 20,
            ChannelId::Green => 121,
            _ => 229,
        });

        for _ in 0..500 {
            osc.advance(&config);
            for (_, state) in osc.channels().iter() {
                assert_eq!(state.active_min, 20);
                assert_eq!(state.active_max, 230);
                assert!((20..=230).contains(&state.value));
            }
        }
    }

    #[test]
    fn test_random_limits_stay_ordered() {
        let mut config = config(10, 200, 25);
        config.random_limits = true;
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 125, &config).unwrap();

        let mut narrowed = false;
        for _ in 0..2000 {
            osc.advance(&config);
            let state = osc.channel(ChannelId::Brightness).unwrap();
            assert!(config.min <= state.active_min);
            assert!(state.active_min <= state.active_max);
            assert!(state.active_max <= config.max);
            assert!((state.active_min..=state.active_max).contains(&state.value));
            narrowed |= state.active_min > config.min || state.active_max < config.max;
        }
        assert!(narrowed);
    }

    #[test]
    fn test_new_minimum_drawn_below_old_maximum() {
        let mut config = config(0, 255, 10);
        config.random_limits = true;

        for seed in 0..50 {
            let mut osc = ChannelOscillator::new(
                SmallRng::seed_from_u64(seed),
                WhiteChannelPolicy::default(),
            );
            osc.seed(ChannelId::Brightness, 250, &config).unwrap();
            osc.advance(&config);

            let state = osc.channel(ChannelId::Brightness).unwrap();
            assert_eq!(state.value, 255);
            assert!(!state.count_up);
            assert!(state.active_min <= state.value);
            assert_eq!(state.active_max, 255);
        }
    }

    #[test]
    fn test_default_transition_converges() {
        let mut config = config(0, 255, 3);
        config.default_mode_enabled = true;
        config.default_value = 100;
        config.steps_to_default = 5;
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 0, &config).unwrap();

        let mut values = Vec::new();
        for _ in 0..5 {
            assert_eq!(osc.advance(&config), TickMode::DefaultTransition);
            let value = brightness(&osc);
            assert!(value <= 100);
            values.push(value);
        }
        assert_eq!(values, [20, 40, 60, 80, 100]);
        assert_eq!(osc.remaining_steps_to_default(), Some(0));

        // Holding the default once reached
        osc.advance(&config);
        assert_eq!(brightness(&osc), 100);
    }

    #[test]
    fn test_default_transition_rounding() {
        let mut config = config(0, 255, 3);
        config.default_mode_enabled = true;
        config.default_value = 100;
        config.steps_to_default = 3;
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 0, &config).unwrap();

        let mut values = Vec::new();
        for _ in 0..3 {
            osc.advance(&config);
            values.push(brightness(&osc));
        }
        assert_eq!(values, [33, 67, 100]);
    }

    #[test]
    fn test_default_transition_shares_counter() {
        let mut config = config(0, 255, 3);
        config.default_mode_enabled = true;
        config.default_value = 100;
        config.steps_to_default = 2;
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed_mode(ColorMode::Rgb, &config, |id| match id {
            ChannelId::Red => 0,
            ChannelId::Green => 50,
            _ => 200,
        });

        osc.advance(&config);
        let values = osc.values();
        assert_eq!(values.get(&ChannelId::Red), Some(&50));
        assert_eq!(values.get(&ChannelId::Green), Some(&75));
        assert_eq!(values.get(&ChannelId::Blue), Some(&150));
        assert_eq!(osc.remaining_steps_to_default(), Some(1));

        osc.advance(&config);
        for (_, value) in osc.values().iter() {
            assert_eq!(*value, 100);
        }
    }

    #[test]
    fn test_leaving_default_mode_resets_counter() {
        let mut config = config(0, 255, 3);
        config.default_mode_enabled = true;
        config.default_value = 100;
        config.steps_to_default = 4;
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 0, &config).unwrap();

        osc.advance(&config);
        assert_eq!(osc.remaining_steps_to_default(), Some(3));

        config.default_mode_enabled = false;
        assert_eq!(osc.advance(&config), TickMode::Bounce);
        assert_eq!(osc.remaining_steps_to_default(), Some(4));
        assert_eq!(brightness(&osc), 28);

        // Next activation restarts from the full step count
        config.default_mode_enabled = true;
        osc.advance(&config);
        assert_eq!(osc.remaining_steps_to_default(), Some(3));
        assert_eq!(brightness(&osc), 46);
    }

    #[test]
    fn test_seed_outside_range_is_pulled_in() {
        let config = config(50, 100, 10);
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 200, &config).unwrap();

        osc.advance(&config);
        assert_eq!(brightness(&osc), 100);

        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 10, &config).unwrap();
        for _ in 0..4 {
            osc.advance(&config);
        }
        assert_eq!(brightness(&osc), 50);
        for _ in 0..100 {
            osc.advance(&config);
            assert!((50..=100).contains(&brightness(&osc)));
        }
    }

    #[test]
    fn test_range_change_reconciles_active_range() {
        let mut config = config(0, 255, 3);
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 125, &config).unwrap();
        osc.advance(&config);
        assert_eq!(brightness(&osc), 128);

        config.max = 100;
        osc.advance(&config);
        let state = osc.channel(ChannelId::Brightness).unwrap();
        assert_eq!(state.value, 100);
        assert_eq!(state.active_max, 100);
        assert!(!state.count_up);
    }

    #[test]
    fn test_swapped_bounds_do_not_panic() {
        let mut config = config(0, 255, 10);
        config.min = 200;
        config.max = 50;
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 45, &config).unwrap();

        for _ in 0..50 {
            osc.advance(&config);
            let state = osc.channel(ChannelId::Brightness).unwrap();
            assert!((50..=200).contains(&state.value));
            assert!(50 <= state.active_min && state.active_max <= 200);
        }

        config.random_limits = true;
        for _ in 0..200 {
            osc.advance(&config);
            assert!((50..=200).contains(&brightness(&osc)));
        }
    }

    #[test]
    fn test_zero_steps_to_default_does_not_panic() {
        let mut config = config(0, 255, 3);
        config.default_mode_enabled = true;
        config.default_value = 60;
        config.steps_to_default = 0;
        let mut osc = oscillator(WhiteChannelPolicy::default());
        osc.seed(ChannelId::Brightness, 200, &config).unwrap();

        osc.advance(&config);
        assert_eq!(brightness(&osc), 60);
        assert_eq!(osc.remaining_steps_to_default(), Some(0));

        osc.advance(&config);
        assert_eq!(brightness(&osc), 60);
    }

    #[test]
    fn test_channel_set_follows_color_mode() {
        let config = config(0, 255, 3);
        let mut osc = oscillator(WhiteChannelPolicy::default());
        assert!(osc.channels().is_empty());

        osc.seed_mode(ColorMode::Rgbw, &config, |_| 0);
        assert_eq!(osc.channels().len(), 4);
        for (id, _) in osc.channels().iter() {
            assert_eq!(ChannelId::parse_from_str(id.as_str()), Some(id));
        }

        osc.seed_mode(ColorMode::Brightness, &config, |_| 0);
        assert_eq!(osc.channels().len(), 1);

        osc.clear();
        assert!(osc.channels().is_empty());
        assert_eq!(osc.remaining_steps_to_default(), None);
    }

    #[test]
    fn test_full_range_stays_in_bounds() {
        let mut config = config(0, 255, 25);
        config.random_limits = true;
        let mut osc = oscillator(WhiteChannelPolicy::Oscillate);
        osc.seed_mode(ColorMode::Rgbw, &config, |_| 0);

        for _ in 0..1000 {
            osc.advance(&config);
            for (_, state) in osc.channels().iter() {
                assert!(state.active_min <= state.active_max);
                assert!((state.active_min..=state.active_max).contains(&state.value));
            }
        }
    }
}
