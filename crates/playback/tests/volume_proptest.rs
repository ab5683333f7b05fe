//! Property tests for the stepped volume control.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use proptest::prelude::*;
use playback::Volume;

proptest! {
    /// After any sequence of up/down presses the volume stays in [5, 100].
    #[test]
    fn volume_stays_in_range(presses in proptest::collection::vec(any::<bool>(), 0..200)) {
        let mut volume = Volume::default_level();
        for up in presses {
            let level = if up { volume.up() } else { volume.down() };
            prop_assert!((Volume::MIN..=Volume::MAX).contains(&level));
            prop_assert_eq!(level, volume.get());
        }
    }

    /// Each press moves by exactly 5, except when saturating at a bound.
    #[test]
    fn volume_moves_by_exactly_one_step(presses in proptest::collection::vec(any::<bool>(), 0..200)) {
        let mut volume = Volume::default_level();
        for up in presses {
            let before = volume.get();
            let after = if up { volume.up() } else { volume.down() };
            if up {
                let expected = if before > Volume::MAX - Volume::STEP {
                    Volume::MAX
                } else {
                    before + Volume::STEP
                };
                prop_assert_eq!(after, expected);
            } else {
                let expected = if before < Volume::MIN + Volume::STEP {
                    Volume::MIN
                } else {
                    before - Volume::STEP
                };
                prop_assert_eq!(after, expected);
            }
        }
    }

    /// The volume is always reachable back to the default: stepping is not
    /// lossy (values stay on the 5-grid).
    #[test]
    fn volume_stays_on_step_grid(presses in proptest::collection::vec(any::<bool>(), 0..200)) {
        let mut volume = Volume::default_level();
        for up in presses {
            if up { volume.up(); } else { volume.down(); }
        }
        prop_assert_eq!(volume.get() % Volume::STEP, 0);
    }
}
