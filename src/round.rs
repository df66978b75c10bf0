//! Rounding state.

use super::{graphics::GraphicsState, math};
use font_types::F26Dot6;

/// Active rounding function, selected by the round state instructions.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum RoundMode {
    /// Round to the nearest pixel boundary. Set by RTG.
    #[default]
    Grid,
    /// Round to the nearest half pixel. Set by RTHG.
    HalfGrid,
    /// Round to the nearest half or full pixel. Set by RTDG.
    DoubleGrid,
    /// Round toward zero to a pixel boundary. Set by RDTG.
    DownToGrid,
    /// Round away from zero to a pixel boundary. Set by RUTG.
    UpToGrid,
    /// Pass distances through unchanged. Set by ROFF.
    Off,
    /// Snap to a configurable lattice of period, phase and threshold,
    /// with a power-of-two period. Set by SROUND.
    Super,
    /// Like [`Super`](RoundMode::Super) but the period is derived from
    /// sqrt(2)/2 pixels for measuring along diagonals, so snapping uses
    /// division instead of masking. Set by S45ROUND.
    Super45,
}

/// Rounding portion of the graphics state.
///
/// `phase`, `period` and `threshold` only participate in the two super
/// modes; the fixed modes are special cases baked into [`round`].
///
/// [`round`]: RoundState::round
#[derive(Copy, Clone, Debug)]
pub struct RoundState {
    pub mode: RoundMode,
    pub threshold: i32,
    pub phase: i32,
    pub period: i32,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            mode: RoundMode::Grid,
            threshold: 0,
            phase: 0,
            period: 64,
        }
    }
}

impl RoundState {
    /// Rounds a 26.6 distance according to the current mode.
    ///
    /// Every mode rounds the magnitude and reapplies the sign, and the
    /// result never crosses zero: a positive distance stays non-negative
    /// and vice versa.
    pub fn round(&self, distance: F26Dot6) -> F26Dot6 {
        use RoundMode::*;
        let bits = distance.to_bits();
        let result = match self.mode {
            Off => bits,
            Super | Super45 => self.super_round(bits),
            fixed => {
                let magnitude = bits.wrapping_abs();
                let rounded = match fixed {
                    Grid => math::round(magnitude),
                    HalfGrid => math::floor(magnitude) + 32,
                    DoubleGrid => math::round_pad(magnitude, 32),
                    DownToGrid => math::floor(magnitude),
                    UpToGrid => math::ceil(magnitude),
                    _ => unreachable!(),
                };
                if bits >= 0 {
                    rounded.max(0)
                } else {
                    rounded.wrapping_neg().min(0)
                }
            }
        };
        F26Dot6::from_bits(result)
    }

    fn super_round(&self, bits: i32) -> i32 {
        let bump = self.threshold - self.phase;
        if bits >= 0 {
            let value = self.snap(bits + bump) + self.phase;
            if value < 0 {
                self.phase
            } else {
                value
            }
        } else {
            let value = -self.snap(bump - bits) - self.phase;
            if value > 0 {
                -self.phase
            } else {
                value
            }
        }
    }

    /// Floors `value` to a multiple of the period.
    fn snap(&self, value: i32) -> i32 {
        if self.mode == RoundMode::Super {
            // period is a power of two here
            value & -self.period
        } else {
            (value / self.period) * self.period
        }
    }
}

impl GraphicsState<'_> {
    pub fn round(&self, distance: F26Dot6) -> F26Dot6 {
        self.round_state.round(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::{F26Dot6, RoundMode, RoundState};

    fn state(mode: RoundMode) -> RoundState {
        RoundState {
            mode,
            ..Default::default()
        }
    }

    fn check(state: RoundState, cases: &[(i32, i32)]) {
        for (input, expected) in cases.iter().copied() {
            let result = state.round(F26Dot6::from_bits(input)).to_bits();
            assert_eq!(
                result, expected,
                "{:?}: round({input}) = {result}, expected {expected}",
                state.mode
            );
        }
    }

    #[test]
    fn fixed_modes() {
        check(
            state(RoundMode::Grid),
            &[(0, 0), (31, 0), (32, 64), (-32, -64), (96, 128)],
        );
        check(
            state(RoundMode::HalfGrid),
            &[(0, 32), (63, 32), (64, 96), (-70, -96)],
        );
        check(
            state(RoundMode::DoubleGrid),
            &[(0, 0), (15, 0), (16, 32), (-40, -32), (90, 96)],
        );
        check(
            state(RoundMode::DownToGrid),
            &[(0, 0), (63, 0), (64, 64), (-63, 0), (-65, -64)],
        );
        check(
            state(RoundMode::UpToGrid),
            &[(0, 0), (1, 64), (64, 64), (-1, -64), (-65, -128)],
        );
        check(state(RoundMode::Off), &[(0, 0), (37, 37), (-37, -37)]);
    }

    #[test]
    fn super_masks_to_period_and_phase() {
        // one pixel period, quarter pixel phase, default threshold
        let state = RoundState {
            mode: RoundMode::Super,
            period: 64,
            phase: 16,
            threshold: 63,
        };
        check(state, &[(0, 16), (17, 80), (80, 80), (81, 144)]);
        // results below zero clamp to the phase
        assert_eq!(state.round(F26Dot6::from_bits(-1)).to_bits(), -16);
    }

    #[test]
    fn super45_divides_by_period() {
        // sqrt(2)/2 pixel period in 26.6 is not a power of two
        let state = RoundState {
            mode: RoundMode::Super45,
            period: 45,
            phase: 0,
            threshold: 22,
        };
        check(state, &[(0, 0), (23, 45), (45, 45), (68, 90), (-23, -45)]);
    }

    #[test]
    fn all_modes_sign_symmetric() {
        for state in property_states() {
            // zero is excluded: modes with a phase round it to the phase
            // in both directions
            for bits in 1..=256 {
                let pos = state.round(F26Dot6::from_bits(bits)).to_bits();
                let neg = state.round(F26Dot6::from_bits(-bits)).to_bits();
                assert_eq!(
                    neg,
                    -pos,
                    "{:?}: round({}) = {} but round({}) = {}",
                    state.mode,
                    bits,
                    pos,
                    -bits,
                    neg
                );
            }
        }
    }

    #[test]
    fn all_modes_idempotent() {
        for state in property_states() {
            for bits in -256..=256 {
                let once = state.round(F26Dot6::from_bits(bits));
                let twice = state.round(once);
                assert_eq!(
                    twice, once,
                    "{:?}: rounding {} a second time moved {} to {}",
                    state.mode, bits, once, twice
                );
            }
        }
    }

    /// One state per mode, with representative lattices for the super
    /// modes.
    fn property_states() -> Vec<RoundState> {
        let mut states: Vec<_> = [
            RoundMode::Grid,
            RoundMode::HalfGrid,
            RoundMode::DoubleGrid,
            RoundMode::DownToGrid,
            RoundMode::UpToGrid,
            RoundMode::Off,
        ]
        .into_iter()
        .map(state)
        .collect();
        states.push(RoundState {
            mode: RoundMode::Super,
            period: 32,
            phase: 8,
            threshold: 16,
        });
        states.push(RoundState {
            mode: RoundMode::Super45,
            period: 45,
            phase: 11,
            threshold: 22,
        });
        states
    }
}
