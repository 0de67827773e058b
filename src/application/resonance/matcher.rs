use super::lifecycle::CombinationStatus;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::resonance::{Combination, ZoneState};
use std::collections::{BTreeSet, HashMap};

/// Why a satisfied combination is worth a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Strictly extends the anchor's last active combination with IN timeframes
    Upgrade,
    /// Never notified before
    FirstHit,
    /// Notified before, then deactivated
    Reactivated,
    /// Still marked active although its anchor is OUT
    Reopened,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboMatch {
    pub combo: Combination,
    pub kind: MatchKind,
}

impl ComboMatch {
    pub fn is_upgrade(&self) -> bool {
        self.kind == MatchKind::Upgrade
    }
}

/// Evaluates each whitelisted combination against the current zone states.
///
/// A combination is satisfied only when every member is IN or WARM. Each
/// satisfied combination is then classified independently, upgrade first:
/// - upgrade: `last_active` is a strict subset and every added member is IN
/// - first hit: no status entry yet
/// - reactivated: entry exists but is inactive
/// - reopened: entry is active but the anchor is OUT
///
/// Anything else (active, anchor still engaged, not an upgrade) is dropped.
pub fn match_combinations(
    satisfied: &BTreeSet<Timeframe>,
    states: &HashMap<Timeframe, ZoneState>,
    statuses: Option<&HashMap<Combination, CombinationStatus>>,
    last_active: Option<&Combination>,
    allowed: &[Combination],
) -> Vec<ComboMatch> {
    let state_of = |tf: Timeframe| states.get(&tf).copied().unwrap_or(ZoneState::Out);

    let mut matches = Vec::new();
    for combo in allowed {
        let fully_satisfied = combo
            .members()
            .iter()
            .all(|tf| satisfied.contains(tf) && state_of(*tf).is_engaged());
        if !fully_satisfied {
            continue;
        }

        let kind = if is_upgrade(combo, last_active, &state_of) {
            Some(MatchKind::Upgrade)
        } else {
            match statuses.and_then(|s| s.get(combo)) {
                None => Some(MatchKind::FirstHit),
                Some(status) if !status.active => Some(MatchKind::Reactivated),
                Some(status) if state_of(status.anchor) == ZoneState::Out => {
                    Some(MatchKind::Reopened)
                }
                Some(_) => None,
            }
        };

        if let Some(kind) = kind {
            matches.push(ComboMatch {
                combo: combo.clone(),
                kind,
            });
        }
    }
    matches
}

fn is_upgrade(
    combo: &Combination,
    last_active: Option<&Combination>,
    state_of: &impl Fn(Timeframe) -> ZoneState,
) -> bool {
    let Some(previous) = last_active else {
        return false;
    };
    previous.is_strict_subset_of(combo)
        && combo
            .added_over(previous)
            .all(|tf| state_of(tf) == ZoneState::In)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use Timeframe::*;

    fn combo(tfs: &[Timeframe]) -> Combination {
        Combination::new(tfs.iter().copied()).unwrap()
    }

    fn states(entries: &[(Timeframe, ZoneState)]) -> (BTreeSet<Timeframe>, HashMap<Timeframe, ZoneState>) {
        let map: HashMap<Timeframe, ZoneState> = entries.iter().copied().collect();
        let satisfied = map
            .iter()
            .filter(|(_, s)| s.is_engaged())
            .map(|(tf, _)| *tf)
            .collect();
        (satisfied, map)
    }

    fn status(anchor: Timeframe, active: bool) -> CombinationStatus {
        CombinationStatus {
            active,
            last_notified_at: Utc.timestamp_opt(0, 0).unwrap(),
            anchor,
        }
    }

    #[test]
    fn test_first_hit() {
        let (sat, st) = states(&[(FourHour, ZoneState::In), (OneHour, ZoneState::Warm)]);
        let allowed = vec![combo(&[FourHour, OneHour])];

        let result = match_combinations(&sat, &st, None, None, &allowed);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].kind, MatchKind::FirstHit);
        assert!(!result[0].is_upgrade());
    }

    #[test]
    fn test_out_member_never_matches() {
        let (sat, st) = states(&[(FourHour, ZoneState::In), (OneHour, ZoneState::Out)]);
        let allowed = vec![combo(&[FourHour, OneHour])];
        assert!(match_combinations(&sat, &st, None, None, &allowed).is_empty());

        // Member missing from the state map entirely
        let (sat, st) = states(&[(FourHour, ZoneState::In)]);
        assert!(match_combinations(&sat, &st, None, None, &allowed).is_empty());
    }

    #[test]
    fn test_active_entry_is_suppressed() {
        let (sat, st) = states(&[(FourHour, ZoneState::In), (OneHour, ZoneState::In)]);
        let c = combo(&[FourHour, OneHour]);
        let statuses = HashMap::from([(c.clone(), status(FourHour, true))]);

        let result = match_combinations(&sat, &st, Some(&statuses), Some(&c), &[c.clone()]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_inactive_entry_reactivates() {
        let (sat, st) = states(&[(FourHour, ZoneState::In), (OneHour, ZoneState::In)]);
        let c = combo(&[FourHour, OneHour]);
        let statuses = HashMap::from([(c.clone(), status(FourHour, false))]);

        let result = match_combinations(&sat, &st, Some(&statuses), None, &[c.clone()]);
        assert_eq!(result, vec![ComboMatch { combo: c, kind: MatchKind::Reactivated }]);
    }

    #[test]
    fn test_active_entry_with_out_anchor_reopens() {
        // Stored anchor differs from the canonical anchor, so the satisfied
        // check passes while the recorded anchor reads OUT.
        let (sat, st) = states(&[
            (OneHour, ZoneState::In),
            (FifteenMin, ZoneState::In),
            (FourHour, ZoneState::Out),
        ]);
        let c = combo(&[OneHour, FifteenMin]);
        let statuses = HashMap::from([(c.clone(), status(FourHour, true))]);

        let result = match_combinations(&sat, &st, Some(&statuses), None, &[c.clone()]);
        assert_eq!(result, vec![ComboMatch { combo: c, kind: MatchKind::Reopened }]);
    }

    #[test]
    fn test_upgrade_with_new_in_member() {
        let (sat, st) = states(&[
            (FourHour, ZoneState::In),
            (OneHour, ZoneState::Warm),
            (FifteenMin, ZoneState::In),
        ]);
        let base = combo(&[FourHour, OneHour]);
        let big = combo(&[FourHour, OneHour, FifteenMin]);
        let statuses = HashMap::from([(base.clone(), status(FourHour, true))]);

        let result = match_combinations(
            &sat,
            &st,
            Some(&statuses),
            Some(&base),
            &[base.clone(), big.clone()],
        );
        assert_eq!(result, vec![ComboMatch { combo: big, kind: MatchKind::Upgrade }]);
    }

    #[test]
    fn test_warm_extension_is_not_upgrade() {
        let (sat, st) = states(&[
            (FourHour, ZoneState::In),
            (OneHour, ZoneState::In),
            (FifteenMin, ZoneState::Warm),
        ]);
        let base = combo(&[FourHour, OneHour]);
        let big = combo(&[FourHour, OneHour, FifteenMin]);
        let statuses = HashMap::from([
            (base.clone(), status(FourHour, true)),
            (big.clone(), status(FourHour, true)),
        ]);

        let result = match_combinations(&sat, &st, Some(&statuses), Some(&base), &[big.clone()]);
        assert!(result.is_empty());

        // Without a prior entry it is still reported, but as a first hit
        let statuses = HashMap::from([(base.clone(), status(FourHour, true))]);
        let result = match_combinations(&sat, &st, Some(&statuses), Some(&base), &[big.clone()]);
        assert_eq!(result, vec![ComboMatch { combo: big, kind: MatchKind::FirstHit }]);
    }

    #[test]
    fn test_upgrade_takes_priority_over_active_entry() {
        let (sat, st) = states(&[
            (FourHour, ZoneState::In),
            (OneHour, ZoneState::In),
            (FifteenMin, ZoneState::In),
        ]);
        let base = combo(&[FourHour, OneHour]);
        let big = combo(&[FourHour, OneHour, FifteenMin]);
        let statuses = HashMap::from([(big.clone(), status(FourHour, true))]);

        let result = match_combinations(&sat, &st, Some(&statuses), Some(&base), &[big.clone()]);
        assert_eq!(result, vec![ComboMatch { combo: big, kind: MatchKind::Upgrade }]);
    }

    #[test]
    fn test_multiple_combos_evaluated_independently() {
        let (sat, st) = states(&[
            (FourHour, ZoneState::In),
            (OneHour, ZoneState::In),
            (FifteenMin, ZoneState::In),
        ]);
        let allowed = vec![
            combo(&[FourHour, OneHour]),
            combo(&[FourHour, OneHour, FifteenMin]),
            combo(&[FourHour, FifteenMin]),
        ];
        let result = match_combinations(&sat, &st, None, None, &allowed);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|m| m.kind == MatchKind::FirstHit));
    }
}
