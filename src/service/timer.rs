//! Pure time accounting for sprint countdowns.
//!
//! Remaining time is always recomputed from the sprint's absolute timestamps,
//! never decremented tick by tick, so calling this at any cadence accumulates
//! no drift. While a sprint is paused the reference instant is frozen at
//! `paused_at`, which is what makes the displayed value stable for every
//! observer regardless of when they look.

use crate::models::sprint::{Sprint, SprintStatus};
use chrono::{DateTime, Utc};

/// Where a loaded sprint sits in its lifecycle, as seen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// Actively counting down.
    Running,
    /// Frozen at `paused_at`.
    Paused,
    /// Status is completed, or the clock ran out.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub remaining_seconds: i64,
    pub phase: TimerPhase,
}

/// Milliseconds left on the clock at `now`.
///
/// elapsed = reference − start − total_paused, where reference is `paused_at`
/// while paused and `now` otherwise. Clamped at zero.
pub fn remaining_ms(
    start_time: DateTime<Utc>,
    duration_minutes: i32,
    total_paused_ms: i64,
    paused_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i64 {
    let duration_ms = i64::from(duration_minutes) * 60_000;
    let reference = paused_at.unwrap_or(now);
    let elapsed_ms = (reference - start_time).num_milliseconds() - total_paused_ms;
    (duration_ms - elapsed_ms).max(0)
}

/// One-instant view of a sprint's countdown.
pub fn snapshot(sprint: &Sprint, now: DateTime<Utc>) -> TimerSnapshot {
    if sprint.status == SprintStatus::Completed {
        return TimerSnapshot {
            remaining_seconds: 0,
            phase: TimerPhase::Completed,
        };
    }

    let remaining = remaining_ms(
        sprint.start_time,
        sprint.duration_minutes,
        sprint.total_paused_ms,
        sprint.paused_at,
        now,
    );
    let remaining_seconds = remaining / 1000;

    let phase = if sprint.paused_at.is_some() {
        TimerPhase::Paused
    } else if remaining > 0 {
        TimerPhase::Running
    } else {
        TimerPhase::Completed
    };

    TimerSnapshot {
        remaining_seconds,
        phase,
    }
}

/// mm:ss display form, e.g. 1500 seconds -> "25:00".
pub fn format_mm_ss(remaining_seconds: i64) -> String {
    let clamped = remaining_seconds.max(0);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn sprint(paused_at: Option<DateTime<Utc>>, total_paused_ms: i64) -> Sprint {
        Sprint {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            started_by: Uuid::new_v4(),
            title: "Focus Sprint".to_string(),
            duration_minutes: 25,
            start_time: start(),
            end_time: None,
            status: SprintStatus::Active,
            paused_at,
            total_paused_ms,
            created_at: start(),
        }
    }

    #[test]
    fn full_duration_at_start() {
        let s = sprint(None, 0);
        let snap = snapshot(&s, start());
        assert_eq!(snap.remaining_seconds, 25 * 60);
        assert_eq!(snap.phase, TimerPhase::Running);
    }

    #[test]
    fn no_pause_scenario_hits_zero_exactly_at_duration() {
        // duration=25 min, start=T, no pauses: remaining at T+25min is 0
        let s = sprint(None, 0);
        let at_end = start() + Duration::minutes(25);
        let snap = snapshot(&s, at_end);
        assert_eq!(snap.remaining_seconds, 0);
        assert_eq!(snap.phase, TimerPhase::Completed);

        // and stays at zero thereafter
        let later = snapshot(&s, at_end + Duration::minutes(10));
        assert_eq!(later.remaining_seconds, 0);
    }

    #[test]
    fn two_minute_pause_shifts_completion_by_two_minutes() {
        // pause at T+5, resume at T+7: total_paused_ms = 120000 and the clock
        // runs out at T+27 wall time.
        let s = sprint(None, 120_000);
        let at_27 = start() + Duration::minutes(27);
        assert_eq!(remaining_ms(s.start_time, 25, 120_000, None, at_27), 0);

        let just_before = at_27 - Duration::seconds(1);
        assert_eq!(snapshot(&s, just_before).remaining_seconds, 1);
    }

    #[test]
    fn paused_sprint_is_frozen() {
        let paused_at = start() + Duration::minutes(5);
        let s = sprint(Some(paused_at), 0);

        let a = snapshot(&s, paused_at + Duration::seconds(3));
        let b = snapshot(&s, paused_at + Duration::minutes(90));
        assert_eq!(a.remaining_seconds, b.remaining_seconds);
        assert_eq!(a.remaining_seconds, 20 * 60);
        assert_eq!(a.phase, TimerPhase::Paused);
    }

    #[test]
    fn completed_sprint_reports_zero_regardless_of_clock() {
        let mut s = sprint(None, 0);
        s.status = SprintStatus::Completed;
        let snap = snapshot(&s, start() + Duration::minutes(1));
        assert_eq!(snap.remaining_seconds, 0);
        assert_eq!(snap.phase, TimerPhase::Completed);
    }

    #[test]
    fn format_mm_ss_pads_both_fields() {
        assert_eq!(format_mm_ss(1500), "25:00");
        assert_eq!(format_mm_ss(65), "01:05");
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(-5), "00:00");
    }

    proptest! {
        /// With no active pause, remaining(t) never increases as t advances.
        #[test]
        fn remaining_is_monotone_non_increasing(
            duration in 1i32..=180,
            total_paused in 0i64..3_600_000,
            t1 in 0i64..10_800_000,
            dt in 0i64..10_800_000,
        ) {
            let t_a = start() + Duration::milliseconds(t1);
            let t_b = t_a + Duration::milliseconds(dt);
            let r_a = remaining_ms(start(), duration, total_paused, None, t_a);
            let r_b = remaining_ms(start(), duration, total_paused, None, t_b);
            prop_assert!(r_b <= r_a);
            prop_assert!(r_a >= 0 && r_b >= 0);
        }

        /// Remaining hits zero exactly at start + duration + total_paused.
        #[test]
        fn zero_point_is_shifted_by_paused_time(
            duration in 1i32..=180,
            total_paused in 0i64..3_600_000,
        ) {
            let duration_ms = i64::from(duration) * 60_000;
            let zero_at = start() + Duration::milliseconds(duration_ms + total_paused);
            prop_assert_eq!(remaining_ms(start(), duration, total_paused, None, zero_at), 0);
            let just_before = zero_at - Duration::milliseconds(1);
            prop_assert_eq!(remaining_ms(start(), duration, total_paused, None, just_before), 1);
        }

        /// While paused_at is fixed, the observation instant is irrelevant.
        #[test]
        fn pause_freezes_remaining(
            duration in 1i32..=180,
            pause_offset in 0i64..600_000,
            obs_a in 0i64..10_800_000,
            obs_b in 0i64..10_800_000,
        ) {
            let paused_at = start() + Duration::milliseconds(pause_offset);
            let r_a = remaining_ms(start(), duration, 0, Some(paused_at), paused_at + Duration::milliseconds(obs_a));
            let r_b = remaining_ms(start(), duration, 0, Some(paused_at), paused_at + Duration::milliseconds(obs_b));
            prop_assert_eq!(r_a, r_b);
        }

        /// Resume is accounting-neutral: remaining right after resume equals
        /// remaining right before the matching pause.
        #[test]
        fn resume_restores_pre_pause_remaining(
            duration in 1i32..=180,
            pause_offset in 0i64..600_000,
            pause_len in 0i64..3_600_000,
        ) {
            let paused_at = start() + Duration::milliseconds(pause_offset);
            let before_pause = remaining_ms(start(), duration, 0, None, paused_at);

            // resume folds the pause interval into total_paused_ms
            let resumed_at = paused_at + Duration::milliseconds(pause_len);
            let after_resume = remaining_ms(start(), duration, pause_len, None, resumed_at);
            prop_assert_eq!(before_pause, after_resume);
        }
    }
}
