//! Session controller driven by a presentation layer.
//!
//! A [`Kiosk`] holds the roster, the storage collaborators, and at most one
//! active team session. It decides which question is on screen, when
//! categories unlock during play, and when the session is saved.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::engine::{CategoryScore, Engine, QuestionId, STARTER_CATEGORY, UnlockResult};
use crate::error::{KioskError, StorageError};
use crate::question::Question;
use crate::store::{BankSource, SaveStore};
use crate::team::{Team, TeamDirectory};

/// What happened when an answer was submitted.
#[derive(Debug)]
pub struct SubmitOutcome {
    /// Whether the submitted answer was correct
    pub correct: bool,
    /// The correct answer, for feedback
    pub correct_answer: String,
    /// Categories unlocked as a result, in unlock order
    pub unlocked: Vec<String>,
    /// Set if saving the session afterwards failed
    pub save_error: Option<StorageError>,
}

/// Result of a ticket redemption.
#[derive(Debug)]
pub struct Redemption {
    /// Tickets handed out by this redemption
    pub tickets: i64,
    /// Set if saving the session afterwards failed
    pub save_error: Option<StorageError>,
}

#[derive(Debug)]
struct Session {
    team: Team,
    engine: Engine,
    current: Option<QuestionId>,
    choices: Option<[String; 4]>,
}

impl Session {
    fn new(team: Team, engine: Engine) -> Self {
        Self {
            team,
            engine,
            current: None,
            choices: None,
        }
    }

    // Moves to a new question. When the unlocked categories are exhausted,
    // locked ones are opened in scan order until a question turns up.
    fn advance(&mut self, rng: &mut StdRng, avoid: Option<&str>, unlocked: &mut Vec<String>) {
        loop {
            if let Some(id) = self.engine.random_question_id(avoid) {
                self.current = Some(id);
                self.choices = self.engine.question(id).map(|q| q.choices_shuffled(rng));
                return;
            }

            match self.engine.unlock_next_locked_category() {
                UnlockResult::Unlocked(name) => unlocked.push(name),
                UnlockResult::AllUnlocked => {
                    info!(team = %self.team.name, "no questions left");
                    self.current = None;
                    self.choices = None;
                    return;
                }
            }
        }
    }

    fn current_prompt(&self) -> Option<String> {
        self.current
            .and_then(|id| self.engine.question(id))
            .map(|q| q.prompt().to_string())
    }
}

/// Drives one team session at a time.
#[derive(Debug)]
pub struct Kiosk<S, B> {
    directory: TeamDirectory,
    saves: S,
    banks: B,
    admin_codes: Vec<String>,
    session: Option<Session>,
    rng: StdRng,
}

impl<S: SaveStore, B: BankSource> Kiosk<S, B> {
    /// Creates a kiosk with no active session.
    pub fn new(directory: TeamDirectory, saves: S, banks: B, admin_codes: Vec<String>) -> Self {
        Self {
            directory,
            saves,
            banks,
            admin_codes,
            session: None,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replaces the random source. Sessions opened afterwards draw their
    /// engine's generator from it.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Starts a session for `code`, ending any active session first.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::UnknownTeam`] if the code is not on the roster,
    /// or [`KioskError::Storage`] if the team's save exists but cannot be
    /// read.
    pub fn log_in(&mut self, code: &str) -> Result<&Team, KioskError> {
        let team = self
            .directory
            .lookup(code)
            .ok_or_else(|| KioskError::UnknownTeam(code.to_string()))?;

        self.end_active_session();

        let engine = Engine::open(code, team.session, &self.saves, &self.banks)?
            .with_rng(StdRng::from_rng(&mut self.rng));
        info!(team = %team.name, session = %team.session, "logged in");

        Ok(self.begin(team, engine))
    }

    /// Replaces the active session with one decoded from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::UnknownTeam`] if the snapshot's team code is
    /// not on the roster.
    pub fn restore(&mut self, snapshot: &str) -> Result<&Team, KioskError> {
        let engine = Engine::decode(snapshot).with_rng(StdRng::from_rng(&mut self.rng));
        let code = engine.team_code().to_string();
        let team = self
            .directory
            .lookup(&code)
            .ok_or(KioskError::UnknownTeam(code))?;

        self.end_active_session();
        info!(team = %team.name, "session restored from snapshot");

        Ok(self.begin(team, engine))
    }

    fn begin(&mut self, team: Team, engine: Engine) -> &Team {
        let mut session = Session::new(team, engine);
        let mut unlocked = Vec::new();
        session.advance(&mut self.rng, None, &mut unlocked);
        if !unlocked.is_empty() {
            debug!(?unlocked, "unlocked categories at login");
        }
        &self.session.insert(session).team
    }

    fn end_active_session(&mut self) {
        if self.session.is_some() {
            debug!("replacing active session");
            if let Err(err) = self.log_out() {
                warn!(%err, "previous session was not saved");
            }
        }
    }

    /// Saves and ends the active session.
    ///
    /// The session is discarded even if the save fails.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::NotLoggedIn`] without an active session, or
    /// [`KioskError::Storage`] if the final save failed.
    pub fn log_out(&mut self) -> Result<(), KioskError> {
        let session = self.session.take().ok_or(KioskError::NotLoggedIn)?;
        info!(team = %session.team.name, "logged out");
        session.engine.save(&mut self.saves)?;
        Ok(())
    }

    /// Saves the active session without ending it.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::NotLoggedIn`] or [`KioskError::Storage`].
    pub fn save(&mut self) -> Result<(), KioskError> {
        let session = self.session.as_ref().ok_or(KioskError::NotLoggedIn)?;
        session.engine.save(&mut self.saves)?;
        Ok(())
    }

    /// Scores `answer` against the question on screen and moves on.
    ///
    /// A correct Starter answer unlocks the next locked category. The
    /// session is saved afterwards; a failed save is reported in the outcome
    /// and does not undo the answer.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::NotLoggedIn`] or [`KioskError::NoQuestion`].
    pub fn submit_answer(&mut self, answer: &str) -> Result<SubmitOutcome, KioskError> {
        let session = self.session.as_mut().ok_or(KioskError::NotLoggedIn)?;
        let id = session.current.ok_or(KioskError::NoQuestion)?;
        let question = session.engine.question(id).ok_or(KioskError::NoQuestion)?;
        let prompt = question.prompt().to_string();
        let correct_answer = question.answer().to_string();
        let from_starter = session
            .engine
            .category_of(id)
            .is_some_and(|c| c.name() == STARTER_CATEGORY);

        let correct = session.engine.submit_answer(id, answer).unwrap_or(false);

        let mut unlocked = Vec::new();
        if correct && from_starter && session.engine.count_locked_categories() > 0 {
            if let UnlockResult::Unlocked(name) = session.engine.unlock_next_locked_category() {
                unlocked.push(name);
            }
        }

        session.advance(&mut self.rng, Some(&prompt), &mut unlocked);
        let save_error = session.engine.save(&mut self.saves).err();

        Ok(SubmitOutcome {
            correct,
            correct_answer,
            unlocked,
            save_error,
        })
    }

    /// Moves to another question without answering the current one.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::NotLoggedIn`] without an active session.
    pub fn skip(&mut self) -> Result<Option<&Question>, KioskError> {
        let session = self.session.as_mut().ok_or(KioskError::NotLoggedIn)?;
        let current = session.current_prompt();
        let mut unlocked = Vec::new();
        session.advance(&mut self.rng, current.as_deref(), &mut unlocked);
        Ok(self.current_question())
    }

    /// Redeems every unredeemed ticket after checking an admin code.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::NotLoggedIn`] without an active session, or
    /// [`KioskError::InvalidAdminCode`] if `admin_code` is not recognised.
    pub fn redeem(&mut self, admin_code: &str) -> Result<Redemption, KioskError> {
        let session = self.session.as_mut().ok_or(KioskError::NotLoggedIn)?;
        if admin_code.is_empty() || !self.admin_codes.iter().any(|c| c == admin_code) {
            warn!(team = %session.team.name, "redemption refused");
            return Err(KioskError::InvalidAdminCode);
        }

        let tickets = session.engine.redeem_tickets();
        let save_error = session.engine.save(&mut self.saves).err();
        Ok(Redemption {
            tickets,
            save_error,
        })
    }

    /// The question on screen.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        let session = self.session.as_ref()?;
        session.engine.question(session.current?)
    }

    /// The on-screen question's choices in display order.
    #[must_use]
    pub fn current_choices(&self) -> Option<&[String; 4]> {
        self.session.as_ref()?.choices.as_ref()
    }

    /// Name of the category the on-screen question belongs to.
    #[must_use]
    pub fn current_category(&self) -> Option<&str> {
        let session = self.session.as_ref()?;
        session
            .engine
            .category_of(session.current?)
            .map(Category::name)
    }

    /// Per-category scores for the active session.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::NotLoggedIn`] without an active session.
    pub fn session_summary(&self) -> Result<Vec<CategoryScore>, KioskError> {
        Ok(self.engine()?.session_summary())
    }

    /// Tickets the active team can redeem.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::NotLoggedIn`] without an active session.
    pub fn redeemable_tickets(&self) -> Result<i64, KioskError> {
        Ok(self.engine()?.redeemable_tickets())
    }

    /// The logged-in team.
    #[must_use]
    pub fn team(&self) -> Option<&Team> {
        self.session.as_ref().map(|s| &s.team)
    }

    /// The active session's engine.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::NotLoggedIn`] without an active session.
    pub fn engine(&self) -> Result<&Engine, KioskError> {
        self.session
            .as_ref()
            .map(|s| &s.engine)
            .ok_or(KioskError::NotLoggedIn)
    }

    /// Returns `true` while a team is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// The save store.
    pub const fn saves(&self) -> &S {
        &self.saves
    }
}
