//! Channel selection for one admission step.

/// Load snapshot of a channel that can start a job right now.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    /// Position in registration order.
    pub index: usize,
    pub priority: f64,
    pub running: usize,
}

/// Desired share minus consumed share. When the priority sum is not positive
/// the priority term is dropped and channels compete on load alone.
pub(crate) fn admission_ratio(
    priority: f64,
    running: usize,
    sum_priorities: f64,
    thread_limit: usize,
) -> f64 {
    let desired = if sum_priorities > 0.0 {
        priority / sum_priorities
    } else {
        0.0
    };
    desired - running as f64 / thread_limit as f64
}

/// Picks the candidate with the strictly greatest ratio; on ties the earliest
/// candidate wins. `None` when `in_flight` already reached `thread_limit` or
/// there are no candidates.
pub(crate) fn choose_channel<I>(
    candidates: I,
    sum_priorities: f64,
    in_flight: usize,
    thread_limit: usize,
) -> Option<usize>
where
    I: IntoIterator<Item = Candidate>,
{
    if in_flight >= thread_limit {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for c in candidates {
        let ratio = admission_ratio(c.priority, c.running, sum_priorities, thread_limit);
        match best {
            Some((_, best_ratio)) if ratio <= best_ratio => {}
            _ => best = Some((c.index, ratio)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(index: usize, priority: f64, running: usize) -> Candidate {
        Candidate {
            index,
            priority,
            running,
        }
    }

    #[test]
    fn saturated_selects_nothing() {
        let c = [cand(0, 10.0, 0)];
        assert_eq!(choose_channel(c, 10.0, 4, 4), None);
        assert_eq!(choose_channel(c, 10.0, 5, 4), None);
        assert_eq!(choose_channel(c, 10.0, 0, 0), None);
    }

    #[test]
    fn no_candidates_selects_nothing() {
        assert_eq!(choose_channel(Vec::new(), 3.0, 0, 4), None);
    }

    #[test]
    fn higher_priority_wins_at_equal_load() {
        let c = [cand(0, 1.0, 1), cand(1, 3.0, 1)];
        assert_eq!(choose_channel(c, 4.0, 2, 8), Some(1));
    }

    #[test]
    fn idle_channel_backfills_against_fair_share() {
        // limit 4, A (p=1) and B (p=1) each hold their fair share of 1,
        // C (p=2) holds nothing: C = 0.5, A = B = 0.25 - 0.25 = 0.
        let c = [cand(0, 1.0, 1), cand(1, 1.0, 1), cand(2, 2.0, 0)];
        assert_eq!(choose_channel(c, 4.0, 2, 4), Some(2));
    }

    #[test]
    fn over_served_channel_is_penalized() {
        // A desires 2/3 but already holds 3 of 4 slots: 0.667 - 0.75 < 0.333.
        let c = [cand(0, 2.0, 3), cand(1, 1.0, 0)];
        assert_eq!(choose_channel(c, 3.0, 3, 4), Some(1));
    }

    #[test]
    fn tie_goes_to_first_registered() {
        let c = [cand(0, 1.0, 0), cand(1, 1.0, 0), cand(2, 1.0, 0)];
        assert_eq!(choose_channel(c, 3.0, 0, 3), Some(0));
        let c = [cand(1, 1.0, 0), cand(2, 1.0, 0)];
        assert_eq!(choose_channel(c, 3.0, 1, 3), Some(1));
    }

    #[test]
    fn zero_priority_sum_uses_load_term_only() {
        assert_eq!(admission_ratio(0.0, 2, 0.0, 4), -0.5);
        assert!(admission_ratio(0.0, 0, 0.0, 4).is_finite());
        let c = [cand(0, 0.0, 2), cand(1, 0.0, 1)];
        assert_eq!(choose_channel(c, 0.0, 3, 4), Some(1));
    }

    #[test]
    fn two_channel_scenario_ratios() {
        // priorities 2 and 1, limit 2
        let a = admission_ratio(2.0, 0, 3.0, 2);
        let b = admission_ratio(1.0, 0, 3.0, 2);
        assert!((a - 2.0 / 3.0).abs() < 1e-9);
        assert!((b - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(choose_channel([cand(0, 2.0, 0), cand(1, 1.0, 0)], 3.0, 0, 2), Some(0));
        let a_after = admission_ratio(2.0, 1, 3.0, 2);
        assert!((a_after - (2.0 / 3.0 - 0.5)).abs() < 1e-9);
        assert_eq!(choose_channel([cand(0, 2.0, 1), cand(1, 1.0, 0)], 3.0, 1, 2), Some(1));
    }
}
