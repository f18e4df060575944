//! New-visit form: field state, validation gating, submission, redirect.
//!
//! ```text
//! Editing ──submit──▶ Submitting ──ok──▶ Redirecting ──delay──▶ Route::Home
//!    ▲                    │
//!    └──────── err ───────┘
//! ```

use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::display;
use crate::gateway::{GatewayError, GatewayResult, PatientBackend, RecordGateway};
use crate::models::{Navigator, Notice, Notifier, PatientRecord, Route};
use crate::validate::{is_valid_name, PhoneField, PhoneStatus, ValidationError};

/// Default pause between the success notice and the redirect.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(500);

/// Where the form sends the user after a successful save.
pub const AFTER_SAVE: Route = Route::Home;

/// Editor capabilities and timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    /// Whether the follow-up date control is offered on the form.
    pub supports_follow_up: bool,
    pub redirect_delay: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            supports_follow_up: false,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Editing,
    Submitting,
    Redirecting,
}

/// Why a submission never reached the gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("A submission is already in progress")]
    Busy,

    #[error("No submission is in progress")]
    NotSubmitting,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Result of one submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Refused locally; no gateway call was made.
    Refused(EditorError),
    /// Stored; the editor is redirecting.
    Saved,
    /// The gateway call failed; fields are untouched.
    Failed(GatewayError),
}

/// The create-new-record workflow.
#[derive(Debug, Clone)]
pub struct RecordEditor {
    name: String,
    phone: PhoneField,
    address: String,
    visit_date: DateTime<Utc>,
    reason: String,
    clinical_notes: String,
    follow_up_date: Option<DateTime<Utc>>,
    settings: EditorSettings,
    state: EditorState,
}

impl Default for RecordEditor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl RecordEditor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            name: String::new(),
            phone: PhoneField::default(),
            address: String::new(),
            visit_date: Utc::now(),
            reason: String::new(),
            clinical_notes: String::new(),
            follow_up_date: None,
            settings,
            state: EditorState::Editing,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &PhoneField {
        &self.phone
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn visit_date(&self) -> DateTime<Utc> {
        self.visit_date
    }

    /// Visit date as the picker shows it, `dd/mm/yyyy, HH:MM` in `tz`.
    pub fn visit_date_display<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        display::date_time(&self.visit_date, tz)
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn clinical_notes(&self) -> &str {
        &self.clinical_notes
    }

    pub fn follow_up_date(&self) -> Option<DateTime<Utc>> {
        self.follow_up_date
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Keystroke into the phone field; invalid candidates are ignored.
    pub fn set_phone(&mut self, candidate: &str) -> PhoneStatus {
        self.phone.input(candidate)
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    pub fn set_clinical_notes(&mut self, notes: impl Into<String>) {
        self.clinical_notes = notes.into();
    }

    pub fn set_visit_date(&mut self, at: DateTime<Utc>) {
        self.visit_date = at;
    }

    /// The picker's reset affordance: back to the current moment.
    pub fn reset_visit_date(&mut self) {
        self.visit_date = Utc::now();
    }

    /// Pick or clear the follow-up date. Refused while the capability is off.
    pub fn set_follow_up_date(
        &mut self,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), ValidationError> {
        if !self.settings.supports_follow_up {
            return Err(ValidationError::FollowUpDisabled);
        }
        self.follow_up_date = at;
        Ok(())
    }

    /// Submission guard.
    pub fn check(&self) -> Result<(), ValidationError> {
        if !is_valid_name(&self.name) {
            return Err(ValidationError::NameRequired);
        }
        if self.phone.value().is_empty() {
            return Err(ValidationError::PhoneRequired);
        }
        if !self.phone.is_valid() {
            return Err(ValidationError::PhoneInvalid);
        }
        Ok(())
    }

    /// The transient record the form currently describes.
    pub fn to_record(&self) -> PatientRecord {
        PatientRecord {
            id: None,
            name: self.name.clone(),
            phone: self.phone.value().to_string(),
            address: non_blank(&self.address),
            visit_date: self.visit_date,
            reason: non_blank(&self.reason),
            clinical_notes: non_blank(&self.clinical_notes),
            follow_up_date: if self.settings.supports_follow_up {
                self.follow_up_date
            } else {
                None
            },
        }
    }

    /// Guard and enter `Submitting`. On refusal a notice is raised and nothing changes.
    pub fn begin_submit<N>(&mut self, notifier: &N) -> Result<PatientRecord, EditorError>
    where
        N: Notifier + ?Sized,
    {
        if self.state != EditorState::Editing {
            return Err(EditorError::Busy);
        }
        if let Err(e) = self.check() {
            tracing::warn!(error = %e, "new visit refused");
            notifier.notify(Notice::error(refusal_message(&e)));
            return Err(e.into());
        }

        self.state = EditorState::Submitting;
        Ok(self.to_record())
    }

    /// Feed back the gateway's answer for the record returned by [`begin_submit`].
    ///
    /// [`begin_submit`]: RecordEditor::begin_submit
    pub fn finish_submit<N>(&mut self, result: GatewayResult<()>, notifier: &N) -> SubmitOutcome
    where
        N: Notifier + ?Sized,
    {
        if self.state != EditorState::Submitting {
            tracing::warn!(state = ?self.state, "gateway answer with no submission in flight");
            return SubmitOutcome::Refused(EditorError::NotSubmitting);
        }
        match result {
            Ok(()) => {
                tracing::info!(name = %self.name, "new visit saved");
                notifier.notify(Notice::success("Patient details saved successfully"));
                self.state = EditorState::Redirecting;
                SubmitOutcome::Saved
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save new visit");
                notifier.notify(Notice::error("Failed to save patient details"));
                self.state = EditorState::Editing;
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Validate, create, and on success redirect home after the configured delay.
    pub async fn submit<B, N, V>(
        &mut self,
        gateway: &RecordGateway<B>,
        notifier: &N,
        navigator: &V,
    ) -> SubmitOutcome
    where
        B: PatientBackend,
        N: Notifier + ?Sized,
        V: Navigator + ?Sized,
    {
        let record = match self.begin_submit(notifier) {
            Ok(record) => record,
            Err(e) => return SubmitOutcome::Refused(e),
        };

        let result = gateway.create(&record).await;
        let outcome = self.finish_submit(result, notifier);

        if outcome == SubmitOutcome::Saved {
            if !self.settings.redirect_delay.is_zero() {
                tokio::time::sleep(self.settings.redirect_delay).await;
            }
            navigator.navigate(AFTER_SAVE);
        }
        outcome
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn refusal_message(e: &ValidationError) -> &'static str {
    match e {
        ValidationError::NameRequired => "Please enter patient name",
        _ => "Please enter valid phone number",
    }
}
