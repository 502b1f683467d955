//! Data models for vaultsync
//!
//! Every model is rebuilt from freshly fetched records on each run and is
//! read-only afterwards.

pub mod habit;
pub mod memo;
pub mod project;
pub mod task;

pub use habit::{CheckinMap, Habit, HabitCheckin};
pub use memo::{Memo, MemoResource};
pub use project::{Column, Project, ProjectKind};
pub use task::{Priority, PriorityLevel, Task, TaskItem, TaskKind, TaskStatus};
