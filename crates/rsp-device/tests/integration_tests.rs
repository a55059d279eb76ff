//! Integration tests for the RSP gain stack
//!
//! These tests drive the gain modes through [`RspDevice`] and check:
//! - The documented gain scenarios for each mode
//! - Staging while idle and pushes while streaming
//! - The bounded gain change acknowledgement
//! - Table shape and search properties for every model and band

use rsp_device::{
    AckBehavior, DeviceConfig, DeviceError, RspDevice, SimulatedPort, UpdateReason,
    AGC_SET_POINT_KEY, RF_GAIN_SELECT_KEY,
};
use rsp_gain::{
    AgcControl, AntennaPort, GainControl, GainModeKind, HardwareModel, HardwareRegisters,
    RfAttGain,
};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Open a device on a simulated port tuned to `rf_hz`
    pub fn open(
        model: HardwareModel,
        gain_mode: GainModeKind,
        rf_hz: f64,
    ) -> (RspDevice<SimulatedPort>, SimulatedPort) {
        open_with(
            DeviceConfig {
                gain_mode,
                rf_hz,
                ..DeviceConfig::for_model(model)
            },
            SimulatedPort::new(),
        )
    }

    /// Open a device from an explicit configuration and port
    pub fn open_with(
        config: DeviceConfig,
        port: SimulatedPort,
    ) -> (RspDevice<SimulatedPort>, SimulatedPort) {
        let device = RspDevice::new(&config, port.clone()).expect("device should open");
        (device, port)
    }

    /// Open a device with AGC off, so IF writes are accepted
    pub fn open_manual(
        model: HardwareModel,
        gain_mode: GainModeKind,
        rf_hz: f64,
    ) -> RspDevice<SimulatedPort> {
        let (device, _) = open(model, gain_mode, rf_hz);
        if device.has_gain_mode() {
            device.set_gain_mode(false);
        }
        device
    }
}

use helpers::*;

// ============================================================================
// Gain Scenarios
// ============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn db_rf_gain_on_rsp1a_vhf() {
        let (device, _) = open(HardwareModel::Rsp1A, GainModeKind::Db, 100e6);
        assert!(device.set_named_gain("RF", 50.0));
        assert_eq!(device.registers().lna_state, 2);
        assert_eq!(device.named_gain("RF"), 50.0);
    }

    #[test]
    fn legacy_agc_already_enabled_is_not_rewritten() {
        let (device, _) = open(HardwareModel::Rsp1A, GainModeKind::Legacy, 100e6);
        assert!(device.set_gain_mode(true));
        assert_eq!(device.registers().agc, AgcControl::CtrlEnabled);
        assert!(!device.set_gain_mode(true));
    }

    #[test]
    fn steps_rsp1_am_step_8() {
        let (device, _) = open(HardwareModel::Rsp1, GainModeKind::Steps, 10e6);
        assert_eq!(device.registers().agc, AgcControl::Disabled);
        assert!(device.write_rf_gain_setting(8));
        let regs = device.registers();
        assert_eq!(regs.lna_state, 1);
        assert_eq!(regs.if_gain_reduction_db, 58);
        assert_eq!(device.read_rf_gain_setting(), 8);
    }

    #[test]
    fn rfatt_forces_agc_on() {
        let mut regs = HardwareRegisters::tuned_to(100e6);
        regs.agc = AgcControl::Disabled;
        let mut mode = RfAttGain::new(HardwareModel::Rsp1A);

        // Same LNA state, but the AGC transition still counts
        assert_eq!(mode.set_gain(&mut regs, 0.0), Ok(true));
        assert_eq!(regs.agc, AgcControl::Hz50);
        assert_eq!(regs.lna_state, 0);
    }

    #[test]
    fn ifgr_rf_gain_select() {
        let (device, _) = open(HardwareModel::Rsp2, GainModeKind::IfGr, 100e6);
        assert_eq!(device.list_gains(), vec!["IFGR"]);
        assert_eq!(device.rf_gain_setting_name(), "RF Gain Select");
        let options = device.rf_gain_setting_options();
        assert_eq!(options.values, (0..=8).collect::<Vec<_>>());
        assert_eq!(options.default, 4);

        assert!(device.set_gain_mode(false));
        assert!(device.set_gain_mode(true));
        assert_eq!(device.registers().agc, AgcControl::Hz50);
        assert!(device.write_setting(RF_GAIN_SELECT_KEY, "5").unwrap());
        assert_eq!(device.registers().lna_state, 5);
    }

    #[test]
    fn rsp2_l_band_duplicate_resolves_to_first() {
        let (device, _) = open(HardwareModel::Rsp2, GainModeKind::RfAtt, 1500e6);
        let options = device.rf_gain_setting_options();
        assert_eq!(options.values, vec![0, 5, 15, 21, 34]);
        assert!(device.write_rf_gain_setting(15));
        assert_eq!(device.registers().lna_state, 3);
    }

    #[test]
    fn hi_z_port_switches_row() {
        let (device, _) = open(HardwareModel::Rsp2, GainModeKind::RfAtt, 10e6);
        assert_eq!(device.gain_range().max, 64.0);
        assert!(device.set_antenna_port(AntennaPort::HighZ));
        assert_eq!(device.gain_range().max, 37.0);
    }

    #[test]
    fn out_of_band_frequency_reports_no_gain() {
        let (device, _) = open(HardwareModel::Rsp1A, GainModeKind::Db, 100e6);
        assert!(device.set_frequency(3_000e6));
        assert!(!device.set_named_gain("RF", 10.0));
        assert_eq!(device.named_gain("RF"), 0.0);
        assert!(device.rf_gain_setting_options().values.is_empty());
    }

    #[test]
    fn offset_db_hides_if_under_agc() {
        let config = DeviceConfig {
            gain_mode: GainModeKind::OffsetDb,
            rf_hz: 100e6,
            rf_offset_db: 62,
            if_offset_db: 79,
            ..DeviceConfig::for_model(HardwareModel::Rsp1A)
        };
        let (device, _) = open_with(config, SimulatedPort::new());
        assert_eq!(device.list_gains(), vec!["RF"]);
        assert!(!device.set_gain(100.0));

        assert!(device.set_gain_mode(false));
        assert_eq!(device.list_gains(), vec!["RF", "IF"]);
        assert!(device.set_named_gain("RF", 50.0));
        assert_eq!(device.registers().lna_state, 2);
    }
}

// ============================================================================
// Hardware Apply Cycle
// ============================================================================

mod apply_tests {
    use super::*;

    #[test]
    fn idle_device_stages_values() {
        let (device, port) = open(HardwareModel::RspDx, GainModeKind::Db, 100e6);
        assert!(device.set_gain_mode(false));
        assert!(device.set_named_gain("IF", 30.0));
        assert!(device.set_named_gain("RF", 40.0));
        assert!(port.updates().is_empty());

        device.activate_stream().unwrap();
        assert_eq!(port.stream_registers(), Some(device.registers()));
    }

    #[test]
    fn streaming_pushes_each_change_once() {
        let (device, port) = open(HardwareModel::Rsp1A, GainModeKind::Db, 100e6);
        device.activate_stream().unwrap();

        assert!(device.set_gain_mode(false));
        assert!(device.set_named_gain("IF", 40.0));
        assert!(!device.set_named_gain("IF", 40.0));
        assert!(device.set_frequency(433e6));
        assert_eq!(
            port.reasons(),
            vec![
                UpdateReason::Agc,
                UpdateReason::GainReduction,
                UpdateReason::Frequency
            ]
        );
    }

    #[test]
    fn steps_push_gain_reduction_only() {
        let (device, port) = open(HardwareModel::Rsp1A, GainModeKind::Steps, 100e6);
        device.activate_stream().unwrap();
        assert!(device.set_gain(20.0));
        assert_eq!(port.reasons(), vec![UpdateReason::GainReduction]);
    }

    #[test]
    fn stopped_stream_stages_again() {
        let (device, port) = open(HardwareModel::Rsp1A, GainModeKind::Db, 100e6);
        device.activate_stream().unwrap();
        device.deactivate_stream().unwrap();
        assert!(!port.is_streaming());
        assert!(device.set_named_gain("RF", 50.0));
        assert!(port.updates().is_empty());
    }

    #[test]
    fn ack_arrives_immediately() {
        let (device, _) = open(HardwareModel::Rsp1A, GainModeKind::Db, 100e6);
        device.activate_stream().unwrap();
        assert!(device.set_named_gain("RF", 50.0));
        assert!(device.gain_ack().is_set());
    }

    #[test]
    fn ack_timeout_is_not_an_error() {
        let config = DeviceConfig {
            rf_hz: 100e6,
            update_timeout_ticks: 2,
            ..Default::default()
        };
        let (device, port) = open_with(config, SimulatedPort::with_behavior(AckBehavior::Never));
        device.activate_stream().unwrap();
        assert!(device.set_named_gain("RF", 50.0));
        assert!(!device.gain_ack().is_set());
        assert_eq!(port.reasons(), vec![UpdateReason::GainReduction]);

        // The stream callback can still acknowledge late
        device.notify_gain_changed();
        assert!(device.gain_ack().is_set());
    }

    #[test]
    fn agc_set_point_pushes_agc() {
        let (device, port) = open(HardwareModel::Rsp1A, GainModeKind::Db, 100e6);
        device.activate_stream().unwrap();
        assert!(device.write_setting(AGC_SET_POINT_KEY, "-45").unwrap());
        assert!(!device.write_setting(AGC_SET_POINT_KEY, "-45").unwrap());
        assert_eq!(port.reasons(), vec![UpdateReason::Agc]);
        assert_eq!(port.last_update().unwrap().regs.agc_set_point_dbfs, -45);
    }
}

// ============================================================================
// Configuration
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn config_file_selects_mode() {
        let path = std::env::temp_dir().join(format!("rspgain-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "model": "2", "gain_mode": "normalized", "rf_hz": 1.0e8 }"#,
        )
        .unwrap();
        let config = DeviceConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let (device, _) = open_with(config, SimulatedPort::new());
        assert_eq!(device.model(), HardwareModel::Rsp2);
        assert_eq!(device.gain_mode_kind(), GainModeKind::Normalized);
        assert_eq!(device.rf_gain_setting_name(), "RF Gain (%)");
    }

    #[test]
    fn missing_config_file() {
        let result = DeviceConfig::load("/nonexistent/rspgain.json");
        assert!(matches!(result, Err(DeviceError::Io(_))));
    }

    #[test]
    fn steps_mode_needs_a_step_table() {
        let config = DeviceConfig {
            gain_mode: GainModeKind::Steps,
            rf_hz: 5_000e6,
            ..Default::default()
        };
        assert!(matches!(
            RspDevice::new(&config, SimulatedPort::new()),
            Err(DeviceError::Gain(_))
        ));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use rsp_gain::{gr_to_lna_state, GainReductionTable, MatchMode, RowSelector, MAX_TABLE_HZ};

    fn model_strategy() -> impl Strategy<Value = HardwareModel> {
        prop_oneof![
            Just(HardwareModel::Rsp1),
            Just(HardwareModel::Rsp1A),
            Just(HardwareModel::Rsp2),
            Just(HardwareModel::RspDuo),
            Just(HardwareModel::RspDx),
        ]
    }

    fn mode_strategy() -> impl Strategy<Value = GainModeKind> {
        prop_oneof![
            Just(GainModeKind::Legacy),
            Just(GainModeKind::Db),
            Just(GainModeKind::RfAtt),
            Just(GainModeKind::Steps),
            Just(GainModeKind::IfGr),
            Just(GainModeKind::Normalized),
            Just(GainModeKind::OffsetDb),
        ]
    }

    fn frequency_strategy() -> impl Strategy<Value = f64> {
        prop_oneof![
            // One frequency inside every band
            prop::sample::select(vec![
                1e6, 5e6, 30e6, 100e6, 200e6, 300e6, 500e6, 1500e6, MAX_TABLE_HZ
            ]),
            10e3..=MAX_TABLE_HZ,
        ]
    }

    fn selector_strategy() -> impl Strategy<Value = RowSelector> {
        (frequency_strategy(), any::<bool>(), any::<bool>()).prop_map(|(rf_hz, hi_z, hdr)| {
            RowSelector {
                rf_hz,
                antenna_port: if hi_z {
                    AntennaPort::HighZ
                } else {
                    AntennaPort::Standard
                },
                hdr_enabled: hdr,
            }
        })
    }

    proptest! {
        #[test]
        fn every_band_has_a_row(model in model_strategy(), sel in selector_strategy()) {
            let row = GainReductionTable::new(model).row_for(sel).unwrap();
            prop_assert!(!row.is_empty());
            prop_assert_eq!(row.values()[0], 0);
            prop_assert_eq!(usize::from(row.max_lna_state()) + 1, row.len());
            prop_assert!(row.max_lna_state() <= model.max_lna_state());
        }

        #[test]
        fn exact_match_round_trip(model in model_strategy(), sel in selector_strategy()) {
            let row = GainReductionTable::new(model).row_for(sel).unwrap();
            let values = row.values();
            for (i, &gr) in values.iter().enumerate() {
                let found = gr_to_lna_state(f64::from(gr), values, MatchMode::Exact);
                let first = values.iter().position(|&v| v == gr).map(|p| p as u8);
                prop_assert_eq!(found, first);
                if values[..i].iter().all(|&v| v != gr) {
                    prop_assert_eq!(found, Some(i as u8));
                }
            }
        }

        #[test]
        fn nearest_match_always_resolves(
            model in model_strategy(),
            sel in selector_strategy(),
            target in -1000.0f64..1000.0,
        ) {
            let row = GainReductionTable::new(model).row_for(sel).unwrap();
            let found = gr_to_lna_state(target, row.values(), MatchMode::Nearest);
            prop_assert!(found.is_some());
            let idx = usize::from(found.unwrap_or(0));
            prop_assert!(idx < row.len());
            let best = row
                .values()
                .iter()
                .map(|&v| (target - f64::from(v)).abs())
                .fold(f64::INFINITY, f64::min);
            prop_assert_eq!((target - f64::from(row.values()[idx])).abs(), best);
        }

        #[test]
        fn db_combined_gain_within_one_db(
            model in model_strategy(),
            rf_hz in frequency_strategy(),
            fraction in 0.0f64..=1.0,
        ) {
            let device = open_manual(model, GainModeKind::Db, rf_hz);
            let range = device.gain_range();
            let value = range.min + fraction * (range.max - range.min);
            device.set_gain(value);
            let achieved = device.gain();
            prop_assert!(
                (achieved - value).abs() < 1.0,
                "requested {} got {} on {} at {} Hz",
                value, achieved, model, rf_hz
            );
        }

        #[test]
        fn out_of_range_leaves_registers(
            model in model_strategy(),
            kind in mode_strategy(),
            rf_hz in frequency_strategy(),
            excess in 0.5f64..100.0,
            above in any::<bool>(),
        ) {
            let device = open_manual(model, kind, rf_hz);
            for name in device.list_gains() {
                let range = device.named_gain_range(name);
                let value = if above { range.max + excess } else { range.min - excess };
                let before = device.registers();
                prop_assert!(!device.set_named_gain(name, value));
                prop_assert_eq!(device.registers(), before);
            }
        }

        #[test]
        fn setting_current_value_is_idempotent(
            model in model_strategy(),
            kind in mode_strategy(),
            rf_hz in frequency_strategy(),
            fraction in 0.0f64..=1.0,
        ) {
            let device = open_manual(model, kind, rf_hz);
            for name in device.list_gains() {
                let range = device.named_gain_range(name);
                device.set_named_gain(name, range.min + fraction * (range.max - range.min));
                let current = device.named_gain(name);
                prop_assert!(
                    !device.set_named_gain(name, current),
                    "{} {} rewrote {} = {}",
                    model, kind, name, current
                );
            }
        }
    }
}
