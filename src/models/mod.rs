//! Roster planning domain models.
//!
//! Core data types for representing a monthly duty-roster problem and its
//! solution: physicians, locations and rooms, sessions, the preference
//! and cadence rule tables, and the materialized schedule.
//!
//! String ids are the exchange format at the boundary. Hot-path planning
//! code works with arena indices built during input assembly
//! (see [`crate::io::PlanningInput`]).

pub mod calendar;
mod location;
mod physician;
mod rules;
mod schedule;
mod session;

pub use calendar::{week_of_month, weekday_of, Weekday, WeekOfMonth};
pub use location::{Location, Room};
pub use physician::Physician;
pub use rules::{PreferenceTable, TravelTimes, WeekRule, WorkdayRules};
pub use schedule::{Schedule, ScheduleRow};
pub use session::Session;
