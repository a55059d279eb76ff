//! Gain reduction to LNA state search

/// How a target reduction is matched against a table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Closest entry, lowest index on ties
    #[default]
    Nearest,
    /// First entry equal to the floored target
    Exact,
}

/// Find the LNA state whose reduction matches `target_db`.
///
/// Returns `None` when `Exact` finds no equal entry, and for an empty
/// row or a non-finite target. `Nearest` resolves every finite target,
/// including ones far outside the row.
pub fn gr_to_lna_state(target_db: f64, row: &[u8], mode: MatchMode) -> Option<u8> {
    if target_db.is_nan() {
        return None;
    }

    match mode {
        MatchMode::Exact => {
            let wanted = target_db.floor();
            row.iter()
                .position(|&gr| f64::from(gr) == wanted)
                .map(|idx| idx as u8)
        }
        MatchMode::Nearest => {
            let mut best = None;
            let mut min_diff = f64::INFINITY;
            for (idx, &gr) in row.iter().enumerate() {
                let diff = (target_db - f64::from(gr)).abs();
                if diff < min_diff {
                    min_diff = diff;
                    best = Some(idx as u8);
                }
            }
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VHF: &[u8] = &[0, 6, 12, 18, 20, 26, 32, 38, 57, 62];

    #[test]
    fn test_exact_match() {
        assert_eq!(gr_to_lna_state(12.0, VHF, MatchMode::Exact), Some(2));
        assert_eq!(gr_to_lna_state(12.9, VHF, MatchMode::Exact), Some(2));
        assert_eq!(gr_to_lna_state(13.0, VHF, MatchMode::Exact), None);
    }

    #[test]
    fn test_nearest_match() {
        assert_eq!(gr_to_lna_state(13.0, VHF, MatchMode::Nearest), Some(2));
        assert_eq!(gr_to_lna_state(50.0, VHF, MatchMode::Nearest), Some(8));
        assert_eq!(gr_to_lna_state(-100.0, VHF, MatchMode::Nearest), Some(0));
    }

    #[test]
    fn test_nearest_tie_prefers_lowest_index() {
        // 3 is equidistant from 0 and 6
        assert_eq!(gr_to_lna_state(3.0, VHF, MatchMode::Nearest), Some(0));
        // 19 is equidistant from 18 and 20
        assert_eq!(gr_to_lna_state(19.0, VHF, MatchMode::Nearest), Some(3));
    }

    #[test]
    fn test_far_targets_still_resolve() {
        assert_eq!(gr_to_lna_state(1.0e9, VHF, MatchMode::Nearest), Some(9));
        assert_eq!(gr_to_lna_state(f64::INFINITY, VHF, MatchMode::Nearest), None);
    }

    #[test]
    fn test_duplicate_entries_resolve_to_first() {
        let rsp2_l = &[0, 5, 21, 15, 15, 34];
        assert_eq!(gr_to_lna_state(15.0, rsp2_l, MatchMode::Exact), Some(3));
        assert_eq!(gr_to_lna_state(16.0, rsp2_l, MatchMode::Nearest), Some(3));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(gr_to_lna_state(1.0, &[], MatchMode::Nearest), None);
        assert_eq!(gr_to_lna_state(f64::NAN, VHF, MatchMode::Nearest), None);
    }
}
