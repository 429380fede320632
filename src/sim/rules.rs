//! Game balance rules
//!
//! Pure functions of streak, timing and axe tier. Nothing in here touches
//! session state; the engine calls these and applies the results.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Grade of a successful chop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChopQuality {
    Perfect,
    Good,
    Ok,
}

impl ChopQuality {
    /// Points before the multiplier is applied
    pub fn base_points(&self) -> u64 {
        match self {
            ChopQuality::Perfect => 100,
            ChopQuality::Good => 75,
            ChopQuality::Ok => 50,
        }
    }

    /// Feedback text and color shown for this grade
    pub fn feedback(&self) -> (&'static str, &'static str) {
        match self {
            ChopQuality::Perfect => ("PERFECT!", "#60ff60"),
            ChopQuality::Good => ("GOOD!", "#90d090"),
            ChopQuality::Ok => ("OK", "#d0d090"),
        }
    }
}

/// Sky theme, ordered from the default up to the longest streaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Day,
    Dawn,
    Sunset,
    Dusk,
    Night,
    Aurora,
    Space,
    Galaxy,
    Lightspeed,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Day => "day",
            Theme::Dawn => "dawn",
            Theme::Sunset => "sunset",
            Theme::Dusk => "dusk",
            Theme::Night => "night",
            Theme::Aurora => "aurora",
            Theme::Space => "space",
            Theme::Galaxy => "galaxy",
            Theme::Lightspeed => "lightspeed",
        }
    }
}

/// Cosmetic axe upgrade level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum AxeTier {
    #[default]
    Standard,
    Golden,
    Flame,
    Sapphire,
}

/// One-shot cosmetic bundle played when the axe is promoted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpgradeEffect {
    pub shake_intensity: f32,
    pub shake_duration_ms: u32,
    pub flash_color: u32,
    pub spark_count: u32,
    /// Scale pulse of the axe sprite (from, to)
    pub scale_pulse: (f32, f32),
    pub feedback_text: &'static str,
    pub feedback_color: &'static str,
}

impl AxeTier {
    /// Numeric tier, 0..=3
    pub fn index(&self) -> u8 {
        match self {
            AxeTier::Standard => 0,
            AxeTier::Golden => 1,
            AxeTier::Flame => 2,
            AxeTier::Sapphire => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(AxeTier::Standard),
            1 => Some(AxeTier::Golden),
            2 => Some(AxeTier::Flame),
            3 => Some(AxeTier::Sapphire),
            _ => None,
        }
    }

    /// Streak needed to unlock this tier
    pub fn unlock_streak(&self) -> u32 {
        match self {
            AxeTier::Standard => 0,
            AxeTier::Golden => 40,
            AxeTier::Flame => 65,
            AxeTier::Sapphire => 80,
        }
    }

    /// Multiplier applied to both timing windows
    pub fn window_bonus(&self) -> f64 {
        1.0 + f64::from(self.index()) * TIER_WINDOW_BONUS
    }

    /// Promotion effects (None for the base tier)
    pub fn upgrade_effect(&self) -> Option<UpgradeEffect> {
        match self {
            AxeTier::Standard => None,
            AxeTier::Golden => Some(UpgradeEffect {
                shake_intensity: 4.0,
                shake_duration_ms: 150,
                flash_color: 0xffd700,
                spark_count: 30,
                scale_pulse: (2.0, 1.712),
                feedback_text: "GOLDEN AXE!",
                feedback_color: "#ffd700",
            }),
            AxeTier::Flame => Some(UpgradeEffect {
                shake_intensity: 6.0,
                shake_duration_ms: 200,
                flash_color: 0xff4422,
                spark_count: 40,
                scale_pulse: (2.1, 1.824),
                feedback_text: "FLAME AXE!",
                feedback_color: "#ff4422",
            }),
            AxeTier::Sapphire => Some(UpgradeEffect {
                shake_intensity: 8.0,
                shake_duration_ms: 250,
                flash_color: 0x4488ff,
                spark_count: 50,
                scale_pulse: (2.2, 1.936),
                feedback_text: "SAPPHIRE AXE!",
                feedback_color: "#4488ff",
            }),
        }
    }
}

/// Score multiplier for a streak (step function, 1..=10)
pub fn multiplier_for(streak: u32) -> u32 {
    match streak {
        250.. => 10,
        200.. => 9,
        150.. => 8,
        100.. => 7,
        75.. => 6,
        50.. => 5,
        25.. => 4,
        5.. => 2,
        _ => 1,
    }
}

/// Sky theme for a streak. Boundaries are inclusive.
pub fn theme_for(streak: u32) -> Theme {
    match streak {
        250.. => Theme::Lightspeed,
        200.. => Theme::Galaxy,
        150.. => Theme::Space,
        100.. => Theme::Aurora,
        50.. => Theme::Night,
        25.. => Theme::Dusk,
        10.. => Theme::Sunset,
        5.. => Theme::Dawn,
        _ => Theme::Day,
    }
}

/// Grade a tap by its distance from the landing time.
///
/// There is no "too late" grade: anything outside the GOOD window is OK.
pub fn judge_timing(timing_offset_ms: f64, tier: AxeTier) -> ChopQuality {
    let abs_timing = timing_offset_ms.abs();
    let bonus = tier.window_bonus();
    if abs_timing < PERFECT_WINDOW_MS * bonus {
        ChopQuality::Perfect
    } else if abs_timing < GOOD_WINDOW_MS * bonus {
        ChopQuality::Good
    } else {
        ChopQuality::Ok
    }
}

/// Fall duration after one more successful chop
pub fn next_drop_time(current_ms: f64) -> f64 {
    (current_ms - DROP_TIME_STEP_MS).max(MIN_DROP_TIME_MS)
}

/// Tier the axe should be promoted to, if any.
///
/// Picks the highest unlocked tier above `current`; never returns a downgrade.
pub fn promotion_target(streak: u32, current: AxeTier) -> Option<AxeTier> {
    [AxeTier::Sapphire, AxeTier::Flame, AxeTier::Golden]
        .into_iter()
        .find(|tier| streak >= tier.unlock_streak() && current < *tier)
}

pub fn is_streak_milestone(streak: u32) -> bool {
    STREAK_MILESTONES.contains(&streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_multiplier_boundaries() {
        assert_eq!(multiplier_for(0), 1);
        assert_eq!(multiplier_for(4), 1);
        assert_eq!(multiplier_for(5), 2);
        assert_eq!(multiplier_for(24), 2);
        assert_eq!(multiplier_for(25), 4);
        assert_eq!(multiplier_for(49), 4);
        assert_eq!(multiplier_for(50), 5);
        assert_eq!(multiplier_for(75), 6);
        assert_eq!(multiplier_for(100), 7);
        assert_eq!(multiplier_for(150), 8);
        assert_eq!(multiplier_for(200), 9);
        assert_eq!(multiplier_for(249), 9);
        assert_eq!(multiplier_for(250), 10);
        assert_eq!(multiplier_for(u32::MAX), 10);
    }

    #[test]
    fn test_theme_boundaries_inclusive() {
        let cases = [
            (0, Theme::Day),
            (4, Theme::Day),
            (5, Theme::Dawn),
            (9, Theme::Dawn),
            (10, Theme::Sunset),
            (25, Theme::Dusk),
            (50, Theme::Night),
            (100, Theme::Aurora),
            (150, Theme::Space),
            (200, Theme::Galaxy),
            (249, Theme::Galaxy),
            (250, Theme::Lightspeed),
        ];
        for (streak, theme) in cases {
            assert_eq!(theme_for(streak), theme, "streak {}", streak);
        }
    }

    #[test]
    fn test_judge_timing_windows() {
        assert_eq!(judge_timing(0.0, AxeTier::Standard), ChopQuality::Perfect);
        assert_eq!(judge_timing(-39.9, AxeTier::Standard), ChopQuality::Perfect);
        assert_eq!(judge_timing(40.0, AxeTier::Standard), ChopQuality::Good);
        assert_eq!(judge_timing(-99.0, AxeTier::Standard), ChopQuality::Good);
        assert_eq!(judge_timing(100.0, AxeTier::Standard), ChopQuality::Ok);
        // Late taps are never worse than OK
        assert_eq!(judge_timing(290.0, AxeTier::Standard), ChopQuality::Ok);
    }

    #[test]
    fn test_axe_tier_widens_windows() {
        // 41ms: GOOD at base tier, PERFECT once the window is 5% wider (42ms)
        assert_eq!(judge_timing(41.0, AxeTier::Standard), ChopQuality::Good);
        assert_eq!(judge_timing(41.0, AxeTier::Golden), ChopQuality::Perfect);
        // Sapphire: 46ms perfect, 115ms good
        assert_eq!(judge_timing(45.9, AxeTier::Sapphire), ChopQuality::Perfect);
        assert_eq!(judge_timing(114.0, AxeTier::Sapphire), ChopQuality::Good);
        assert_eq!(judge_timing(115.5, AxeTier::Sapphire), ChopQuality::Ok);
    }

    #[test]
    fn test_promotion_target() {
        assert_eq!(promotion_target(39, AxeTier::Standard), None);
        assert_eq!(promotion_target(40, AxeTier::Standard), Some(AxeTier::Golden));
        assert_eq!(promotion_target(40, AxeTier::Golden), None);
        assert_eq!(promotion_target(65, AxeTier::Golden), Some(AxeTier::Flame));
        assert_eq!(promotion_target(80, AxeTier::Flame), Some(AxeTier::Sapphire));
        assert_eq!(promotion_target(80, AxeTier::Standard), Some(AxeTier::Sapphire));
        assert_eq!(promotion_target(500, AxeTier::Sapphire), None);
    }

    #[test]
    fn test_drop_time_clamps_at_minimum() {
        assert_eq!(next_drop_time(1000.0), 985.0);
        assert_eq!(next_drop_time(290.0), 280.0);
        assert_eq!(next_drop_time(280.0), 280.0);
    }

    #[test]
    fn test_streak_milestones() {
        let hits: Vec<u32> = (0..=200).filter(|s| is_streak_milestone(*s)).collect();
        assert_eq!(hits, vec![5, 10, 25, 50, 100]);
    }

    proptest! {
        #[test]
        fn prop_multiplier_non_decreasing(s in 0u32..1000) {
            prop_assert!(multiplier_for(s) <= multiplier_for(s + 1));
            prop_assert!((1..=10).contains(&multiplier_for(s)));
        }

        #[test]
        fn prop_theme_non_decreasing(s in 0u32..1000) {
            prop_assert!(theme_for(s) <= theme_for(s + 1));
        }

        #[test]
        fn prop_drop_time_never_below_minimum(chops in 0usize..200) {
            let mut t = BASE_DROP_TIME_MS;
            for _ in 0..chops {
                t = next_drop_time(t);
            }
            prop_assert!(t >= MIN_DROP_TIME_MS);
            prop_assert!(t <= BASE_DROP_TIME_MS);
        }

        #[test]
        fn prop_promotion_never_downgrades(streak in 0u32..300, idx in 0u8..4) {
            let current = AxeTier::from_index(idx).unwrap();
            if let Some(target) = promotion_target(streak, current) {
                prop_assert!(target > current);
                prop_assert!(streak >= target.unlock_streak());
            }
        }
    }
}
