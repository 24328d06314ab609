//! Raffle Core: the trivia state engine
//!
//! Teams answer multiple-choice questions grouped into categories. Categories
//! start locked and open up as the team progresses; every correct answer
//! earns a raffle ticket. This crate holds the state machine, question
//! selection, ticket accounting, and the plain-text save format. It performs
//! no I/O of its own: saves and question banks come through the
//! [`store::SaveStore`] and [`store::BankSource`] collaborators.

pub mod category;
pub mod engine;
pub mod error;
pub mod format;
pub mod kiosk;
pub mod question;
pub mod store;
pub mod team;

pub use category::Category;
pub use engine::{ALL_UNLOCKED, CategoryScore, Engine, QuestionId, STARTER_CATEGORY, UnlockResult};
pub use error::{KioskError, RowError, StorageError};
pub use kiosk::{Kiosk, Redemption, SubmitOutcome};
pub use question::Question;
pub use store::{BankSource, MemoryBanks, MemoryStore, SaveStore};
pub use team::{SessionType, Team, TeamDirectory};
