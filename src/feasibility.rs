//! Feasibility preprocessing.
//!
//! Computes, for every session, the set of physicians eligible under the
//! hard per-session rules, before any capacity or overlap reasoning:
//!
//! 1. the session date is not in the physician's unavailable set;
//! 2. a required skill must be in the physician's skill set;
//! 3. a physician with workday rules is eligible only on listed weekdays;
//! 4. a week-of-month rule matching (week, weekday) pins the physician to
//!    its required location for that day.
//!
//! Sessions whose eligible set is empty are structurally infeasible: they
//! are excluded from the constraint model and reported with a histogram
//! of which rule removed how many candidates.

use std::fmt;

use crate::io::PlanningInput;

/// Eligible physicians per session, plus structural-infeasibility
/// diagnostics.
#[derive(Debug, Clone)]
pub struct Eligibility {
    /// Per-session eligible physician indices, ascending.
    pub eligible: Vec<Vec<usize>>,
    /// Diagnostics for sessions with an empty eligible set.
    pub infeasible: Vec<SessionDiagnostic>,
}

/// Why a structurally infeasible session has no candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDiagnostic {
    /// Session id.
    pub session_id: String,
    /// Session arena index.
    pub session_idx: usize,
    /// Candidates removed per rule class.
    pub removed: RemovalHistogram,
}

/// Counts of physicians removed from a session's candidate set, keyed by
/// the first rule that eliminated them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalHistogram {
    /// Removed by a blocked date.
    pub unavailable: usize,
    /// Removed by a missing required skill.
    pub missing_skill: usize,
    /// Removed by workday cadence.
    pub workday: usize,
    /// Removed by a week-of-month location rule.
    pub week_rule: usize,
}

impl RemovalHistogram {
    /// Total number of removed candidates.
    pub fn total(&self) -> usize {
        self.unavailable + self.missing_skill + self.workday + self.week_rule
    }
}

impl fmt::Display for RemovalHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unavailable: {}, missing skill: {}, workday: {}, week rule: {}",
            self.unavailable, self.missing_skill, self.workday, self.week_rule
        )
    }
}

impl Eligibility {
    /// Whether a session survived preprocessing.
    pub fn is_feasible(&self, session: usize) -> bool {
        !self.eligible[session].is_empty()
    }

    /// Whether any session is structurally infeasible.
    pub fn has_infeasible(&self) -> bool {
        !self.infeasible.is_empty()
    }
}

/// Computes per-session eligibility over the assembled input.
pub fn compute_eligibility(input: &PlanningInput) -> Eligibility {
    let mut eligible = Vec::with_capacity(input.session_count());
    let mut infeasible = Vec::new();

    for (session_idx, session) in input.sessions.iter().enumerate() {
        let location = input.session_location[session_idx];
        let weekday = session.weekday();
        let week = session.week_of_month();

        let mut candidates = Vec::new();
        let mut removed = RemovalHistogram::default();

        for (physician_idx, physician) in input.physicians.iter().enumerate() {
            if physician.is_unavailable_on(session.date) {
                removed.unavailable += 1;
                continue;
            }
            if let Some(skill) = &session.required_skill {
                if !physician.has_skill(skill) {
                    removed.missing_skill += 1;
                    continue;
                }
            }
            if let Some(workdays) = &input.workdays[physician_idx] {
                if !workdays.contains(&weekday) {
                    removed.workday += 1;
                    continue;
                }
            }
            if let Some(&required_location) =
                input.week_rules.get(&(physician_idx, week, weekday))
            {
                if required_location != location {
                    removed.week_rule += 1;
                    continue;
                }
            }
            candidates.push(physician_idx);
        }

        if candidates.is_empty() {
            infeasible.push(SessionDiagnostic {
                session_id: session.id.clone(),
                session_idx,
                removed,
            });
        }
        eligible.push(candidates);
    }

    Eligibility {
        eligible,
        infeasible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::PlanningInput;
    use crate::models::{
        Location, Physician, PreferenceTable, Session, TravelTimes, WeekRule, WorkdayRules,
    };
    use chrono::{NaiveDate, NaiveTime};

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn assemble(
        physicians: Vec<Physician>,
        locations: Vec<Location>,
        sessions: Vec<Session>,
        workdays: WorkdayRules,
        week_rules: Vec<WeekRule>,
    ) -> PlanningInput {
        PlanningInput::assemble(
            physicians,
            locations,
            Vec::new(),
            sessions,
            PreferenceTable::new(),
            TravelTimes::new(),
            workdays,
            week_rules,
        )
        .unwrap()
    }

    // 2025-06-10 is the second Tuesday of June 2025.
    fn second_tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    #[test]
    fn test_all_rules_filter() {
        let date = second_tuesday();
        let physicians = vec![
            Physician::new("blocked").with_max_sessions(5).with_unavailable(date),
            Physician::new("unskilled").with_max_sessions(5),
            Physician::new("wrong-day").with_max_sessions(5).with_skill("cardio"),
            Physician::new("pinned").with_max_sessions(5).with_skill("cardio"),
            Physician::new("free").with_max_sessions(5).with_skill("cardio"),
        ];
        let locations = vec![Location::new("L1"), Location::new("L2")];
        let sessions = vec![
            Session::new("S1", date, "L2", t(9), t(12)).with_required_skill("cardio"),
        ];
        let mut workdays = WorkdayRules::new();
        workdays.add("wrong-day", 1); // Mondays only; session is a Tuesday
        let week_rules = vec![WeekRule::new("pinned", 2, 2, "L1")]; // pinned to L1 that day

        let input = assemble(physicians, locations, sessions, workdays, week_rules);
        let eligibility = compute_eligibility(&input);

        assert_eq!(eligibility.eligible[0], vec![4]);
        assert!(eligibility.infeasible.is_empty());
    }

    #[test]
    fn test_week_rule_matching_location_allows() {
        let date = second_tuesday();
        let physicians = vec![Physician::new("pinned").with_max_sessions(5)];
        let locations = vec![Location::new("L1")];
        let sessions = vec![Session::new("S1", date, "L1", t(9), t(12))];
        let week_rules = vec![WeekRule::new("pinned", 2, 2, "L1")];

        let input = assemble(physicians, locations, sessions, WorkdayRules::new(), week_rules);
        let eligibility = compute_eligibility(&input);
        assert_eq!(eligibility.eligible[0], vec![0]);
    }

    #[test]
    fn test_week_rule_non_matching_day_imposes_nothing() {
        // Rule is for week 2 Tuesday; session on week 1 Tuesday at L2.
        let physicians = vec![Physician::new("D1").with_max_sessions(5)];
        let locations = vec![Location::new("L1"), Location::new("L2")];
        let sessions = vec![Session::new(
            "S1",
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            "L2",
            t(9),
            t(12),
        )];
        let week_rules = vec![WeekRule::new("D1", 2, 2, "L1")];

        let input = assemble(physicians, locations, sessions, WorkdayRules::new(), week_rules);
        let eligibility = compute_eligibility(&input);
        assert_eq!(eligibility.eligible[0], vec![0]);
    }

    #[test]
    fn test_structurally_infeasible_histogram() {
        let date = second_tuesday();
        let physicians = vec![
            Physician::new("blocked").with_max_sessions(5).with_unavailable(date),
            Physician::new("unskilled").with_max_sessions(5),
            Physician::new("wrong-day").with_max_sessions(5).with_skill("cardio"),
        ];
        let locations = vec![Location::new("L1")];
        let sessions = vec![
            Session::new("S1", date, "L1", t(9), t(12)).with_required_skill("cardio"),
        ];
        let mut workdays = WorkdayRules::new();
        workdays.add("wrong-day", 1);

        let input = assemble(physicians, locations, sessions, workdays, Vec::new());
        let eligibility = compute_eligibility(&input);

        assert!(!eligibility.is_feasible(0));
        assert_eq!(eligibility.infeasible.len(), 1);
        let diagnostic = &eligibility.infeasible[0];
        assert_eq!(diagnostic.session_id, "S1");
        assert_eq!(
            diagnostic.removed,
            RemovalHistogram {
                unavailable: 1,
                missing_skill: 1,
                workday: 1,
                week_rule: 0,
            }
        );
        assert_eq!(diagnostic.removed.total(), 3);
    }

    #[test]
    fn test_eligibility_monotone_under_rule_removal() {
        let date = second_tuesday();
        let physicians = vec![
            Physician::new("D1").with_max_sessions(5),
            Physician::new("D2").with_max_sessions(5),
        ];
        let locations = vec![Location::new("L1"), Location::new("L2")];
        let sessions = vec![Session::new("S1", date, "L2", t(9), t(12))];
        let mut workdays = WorkdayRules::new();
        workdays.add("D1", 1);
        let week_rules = vec![WeekRule::new("D2", 2, 2, "L1")];

        let constrained = assemble(
            physicians.clone(),
            locations.clone(),
            sessions.clone(),
            workdays,
            week_rules,
        );
        let relaxed = assemble(
            physicians,
            locations,
            sessions,
            WorkdayRules::new(),
            Vec::new(),
        );

        let tight = compute_eligibility(&constrained);
        let loose = compute_eligibility(&relaxed);
        for p in &tight.eligible[0] {
            assert!(loose.eligible[0].contains(p));
        }
        assert!(loose.eligible[0].len() >= tight.eligible[0].len());
    }
}
