//! The interpreter session: access level, paper, camera, appearance and the
//! statement history, behind a transactional execute contract.
//!
//! A statement is appended to the history before it is dispatched. If any of
//! its keywords fails, everything the statement changed is rolled back and
//! the entry is removed again, so the history always replays to the state
//! the session is in.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::access::{AccessLevel, PromptCounter};
use crate::dsl::canonical::{argument_text, is_bracket_fragment, SENTINEL};
use crate::dsl::{canonicalize, Canonical};
use crate::error::ScriptError;
use crate::model::{Backend, Camera, CameraBasis, FoldingModel, PaperColor};
use crate::prompt::Prompter;
use crate::registry::{self, CommandKeyword, Keyword};
use crate::settings::ScriptSettings;
use crate::stage::ParameterStage;
use crate::supervisor::{self, Budget};

/// Presentation locale recorded by `locale [language country]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub language: String,
    pub country: String,
}

/// Overrides in force while a nested body (a loaded file, a replay) is
/// dispatched. Nested bodies are never recorded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope {
    access: AccessLevel,
    cancellable: bool,
}

impl Scope {
    pub(crate) fn nested(access: AccessLevel) -> Self {
        Self {
            access,
            cancellable: true,
        }
    }

    fn replay() -> Self {
        Self {
            access: AccessLevel::Dev,
            cancellable: false,
        }
    }
}

/// State captured before a recorded statement runs. Model and history are
/// only copied when a command is about to replace them.
struct Transaction {
    history_len: usize,
    displaced_history: Option<Vec<String>>,
    displaced_model: Option<Option<Box<dyn FoldingModel>>>,
    native_depth: Option<usize>,
    stage: ParameterStage,
    color: PaperColor,
    texture: Option<Arc<RgbImage>>,
    filename: Option<PathBuf>,
    locale: Option<Locale>,
    camera: CameraBasis,
    access: AccessLevel,
}

pub struct Session {
    pub(crate) access: AccessLevel,
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) prompter: Arc<dyn Prompter>,
    pub(crate) settings: ScriptSettings,
    pub(crate) prompts: PromptCounter,
    pub(crate) stage: ParameterStage,
    pub(crate) camera: Box<dyn Camera>,
    pub(crate) color: PaperColor,
    pub(crate) texture: Option<Arc<RgbImage>>,
    pub(crate) filename: Option<PathBuf>,
    pub(crate) locale: Option<Locale>,
    pub(crate) transcript: Vec<String>,
    model: Option<Box<dyn FoldingModel>>,
    history: Vec<String>,
    cancel: CancellationToken,
    cancellable: bool,
    recording: bool,
    transaction: Option<Transaction>,
    /// The last history entry belongs to the statement being executed.
    in_flight: bool,
    /// The statement in flight has run a command other than `undo`.
    applied: bool,
    /// Appearance parameters set earlier in the statement in flight.
    lead: Vec<String>,
    /// Canonical tokens after the command being dispatched.
    tail: String,
}

impl Session {
    pub fn new(backend: Arc<dyn Backend>, prompter: Arc<dyn Prompter>) -> Self {
        Self::with_settings(backend, prompter, ScriptSettings::default())
    }

    pub fn with_settings(
        backend: Arc<dyn Backend>,
        prompter: Arc<dyn Prompter>,
        settings: ScriptSettings,
    ) -> Self {
        let camera = backend.new_camera();
        Self {
            access: settings.default_access,
            color: settings.initial_paper_color,
            backend,
            prompter,
            settings,
            prompts: PromptCounter::default(),
            stage: ParameterStage::default(),
            camera,
            texture: None,
            filename: None,
            locale: None,
            transcript: Vec::new(),
            model: None,
            history: Vec::new(),
            cancel: CancellationToken::new(),
            cancellable: true,
            recording: false,
            transaction: None,
            in_flight: false,
            applied: false,
            lead: Vec::new(),
            tail: String::new(),
        }
    }

    // ── Read access ─────────────────────────────────────────────

    pub fn access(&self) -> AccessLevel {
        self.access
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn model(&self) -> Option<&dyn FoldingModel> {
        self.model.as_deref()
    }

    pub fn camera_basis(&self) -> CameraBasis {
        self.camera.basis()
    }

    pub fn color(&self) -> PaperColor {
        self.color
    }

    pub fn texture(&self) -> Option<&RgbImage> {
        self.texture.as_deref()
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn stage(&self) -> &ParameterStage {
        &self.stage
    }

    pub fn settings(&self) -> &ScriptSettings {
        &self.settings
    }

    /// Open confirmation prompts, shared with the supervisor.
    pub fn prompts(&self) -> &PromptCounter {
        &self.prompts
    }

    /// Take the diagnostic lines emitted since the last call.
    pub fn drain_transcript(&mut self) -> Vec<String> {
        std::mem::take(&mut self.transcript)
    }

    // ── History ─────────────────────────────────────────────────

    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Write the history one statement per line, so the file can be fed back
    /// through `load`.
    pub fn save_history(&self, path: &Path) -> Result<(), ScriptError> {
        let mut text = self.history.join("\n");
        text.push('\n');
        crate::settings::atomic_write(path, text.as_bytes())?;
        log::info!("saved {} statements to {}", self.history.len(), path.display());
        Ok(())
    }

    // ── Execution ───────────────────────────────────────────────

    /// Run one statement. On failure nothing it did is kept and the history
    /// is as long as before; on success it is one entry longer, unless a
    /// command rebased or truncated it.
    pub fn execute(&mut self, statement: &str) -> Result<(), ScriptError> {
        let canonical = canonicalize(statement);
        self.transaction = Some(self.begin());
        self.history.push(statement.to_string());
        self.in_flight = true;
        self.applied = false;
        self.lead.clear();

        let was_recording = std::mem::replace(&mut self.recording, true);
        let result = self.dispatch(&canonical);
        self.recording = was_recording;
        self.in_flight = false;

        let transaction = self.transaction.take();
        if let (Err(e), Some(transaction)) = (&result, transaction) {
            self.rollback(transaction, e);
        }
        result
    }

    /// Run one statement at `access`, restoring the previous level afterwards.
    pub fn execute_as(&mut self, statement: &str, access: AccessLevel) -> Result<(), ScriptError> {
        let previous = std::mem::replace(&mut self.access, access);
        let result = self.execute(statement);
        self.access = previous;
        result
    }

    /// Run one statement on a worker thread under the wait budget from the
    /// settings. If the operator stops it, the call returns `Ok` and the
    /// statement is rolled back as far as cancellation reached it.
    pub fn execute_supervised(&mut self, statement: &str) -> Result<(), ScriptError> {
        let budget = Budget::from_settings(&self.settings);
        self.execute_supervised_with(statement, budget)
    }

    pub fn execute_supervised_as(
        &mut self,
        statement: &str,
        access: AccessLevel,
    ) -> Result<(), ScriptError> {
        let previous = std::mem::replace(&mut self.access, access);
        let result = self.execute_supervised(statement);
        self.access = previous;
        result
    }

    pub(crate) fn execute_supervised_with(
        &mut self,
        statement: &str,
        budget: Budget,
    ) -> Result<(), ScriptError> {
        let prompter = Arc::clone(&self.prompter);
        let prompts = self.prompts.clone();
        let cancel = CancellationToken::new();
        self.cancel = cancel.clone();

        let result = supervisor::supervise(budget, prompter.as_ref(), &prompts, &cancel, || {
            self.execute(statement)
        });

        self.cancel = CancellationToken::new();
        result
    }

    /// The dispatch loop. Commands fire as soon as they are read; parameters
    /// take every following token up to the next keyword.
    pub(crate) fn dispatch(&mut self, canonical: &Canonical) -> Result<(), ScriptError> {
        let tokens: Vec<&str> = canonical.tokens().collect();
        for (i, word) in tokens.iter().copied().enumerate() {
            if is_bracket_fragment(word) {
                continue;
            }
            if self.cancellable && self.cancel.is_cancelled() {
                return Err(ScriptError::Cancelled);
            }
            let rest = tokens.get(i + 1..).unwrap_or_default();
            match registry::lookup(word) {
                Some(Keyword::Command(command)) => {
                    log::debug!("command `{word}`");
                    self.tail = tail_text(rest);
                    command.dispatch(self)?;
                    if self.recording && command != CommandKeyword::Undo {
                        self.applied = true;
                    }
                }
                Some(Keyword::Param(param)) => {
                    let args: Vec<String> = rest
                        .iter()
                        .copied()
                        .take_while(|t| registry::lookup(t).is_none())
                        .map(argument_text)
                        .collect();
                    log::debug!("parameter `{word}` {args:?}");
                    param.dispatch(self, &args)?;
                    if self.recording && param.is_appearance() {
                        let raw = rest.get(..args.len()).unwrap_or_default();
                        let entry = format!("{word} {}", tail_text(raw));
                        self.lead.push(entry.trim_end().to_string());
                    }
                }
                None => log::debug!("ignoring unknown word `{word}`"),
            }
        }
        Ok(())
    }

    /// Run `body` with `scope` in force, restoring the outer access level,
    /// cancellation and recording state on every exit path.
    pub(crate) fn scoped<T>(
        &mut self,
        scope: Scope,
        body: impl FnOnce(&mut Self) -> Result<T, ScriptError>,
    ) -> Result<T, ScriptError> {
        let access = std::mem::replace(&mut self.access, scope.access);
        let cancellable = self.cancellable;
        self.cancellable = cancellable && scope.cancellable;
        let recording = std::mem::replace(&mut self.recording, false);
        let tail = std::mem::take(&mut self.tail);

        let result = body(self);

        self.access = access;
        self.cancellable = cancellable;
        self.recording = recording;
        self.tail = tail;
        result
    }

    /// A USER session on the same backend, sharing prompts and cancellation.
    pub(crate) fn sandbox(&self) -> Session {
        let mut sandbox = Session::with_settings(
            Arc::clone(&self.backend),
            Arc::clone(&self.prompter),
            self.settings.clone(),
        );
        sandbox.access = AccessLevel::User;
        sandbox.filename = self.filename.clone();
        sandbox.prompts = self.prompts.clone();
        sandbox.cancel = self.cancel.clone();
        sandbox.cancellable = self.cancellable;
        sandbox
    }

    // ── Helpers for command handlers ────────────────────────────

    pub(crate) fn require(&self, level: AccessLevel) -> Result<(), ScriptError> {
        if self.access < level {
            return Err(ScriptError::InsufficientAccess {
                required: level,
                current: self.access,
            });
        }
        Ok(())
    }

    pub(crate) fn model_mut(&mut self) -> Result<&mut Box<dyn FoldingModel>, ScriptError> {
        self.model
            .as_mut()
            .ok_or_else(|| ScriptError::missing("no paper; create it with `new` first"))
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.recording
    }

    pub(crate) fn replace_model(&mut self, model: Option<Box<dyn FoldingModel>>) {
        let displaced = std::mem::replace(&mut self.model, model);
        if let Some(transaction) = self.transaction.as_mut() {
            if transaction.displaced_model.is_none() {
                transaction.displaced_model = Some(displaced);
            }
        }
    }

    /// Replace the whole history with `construction` followed by the rest of
    /// the statement being dispatched. Appearance parameters given earlier in
    /// the statement go in front. Nested bodies leave history alone.
    pub(crate) fn rebase_history(&mut self, construction: &str) {
        if !self.recording {
            return;
        }
        self.preserve_history();
        let mut parts: Vec<&str> = self
            .lead
            .iter()
            .map(String::as_str)
            .filter(|l| !construction.contains(l))
            .collect();
        parts.push(construction);
        if !self.tail.is_empty() {
            parts.push(&self.tail);
        }
        self.history = vec![parts.join(" ")];
        self.in_flight = true;
    }

    /// Undo `steps` effective statements by replaying the history without
    /// them. A statement in flight is dropped first; if it already folded
    /// something, dropping it counts as one step. Entries consisting only of
    /// `undo` already reverted earlier entries, so dropping one means one
    /// more entry before it has to go as well. Whatever follows `undo` in the
    /// statement in flight becomes the new last entry.
    pub(crate) fn replay_undo(&mut self, steps: usize) -> Result<(), ScriptError> {
        self.preserve_history();
        let mut owed = steps;
        let recording = self.recording;
        if recording && self.in_flight {
            self.history.pop();
            self.in_flight = false;
            if self.applied {
                owed = owed.saturating_sub(1);
            }
        }
        while owed > 0 {
            let Some(entry) = self.history.pop() else {
                break;
            };
            match undo_only(&entry) {
                Some(n) => owed += n,
                None => owed -= 1,
            }
        }
        log::info!("replaying {} statements", self.history.len());

        if let Some(model) = self.model.as_mut() {
            rewind(&mut **model, 0);
        }
        self.stage.clear();
        self.camera = self.backend.new_camera();

        let statements = self.history.clone();
        self.scoped(Scope::replay(), |s| {
            for statement in &statements {
                s.dispatch(&canonicalize(statement))?;
            }
            Ok(())
        })?;

        if recording && !self.tail.is_empty() {
            self.history.push(self.tail.clone());
            self.in_flight = true;
            self.applied = false;
            self.lead.clear();
        }
        Ok(())
    }

    // ── Transactions ────────────────────────────────────────────

    fn begin(&self) -> Transaction {
        Transaction {
            history_len: self.history.len(),
            displaced_history: None,
            displaced_model: None,
            native_depth: self.model.as_ref().map(|m| m.undo_depth()),
            stage: self.stage.clone(),
            color: self.color,
            texture: self.texture.clone(),
            filename: self.filename.clone(),
            locale: self.locale.clone(),
            camera: self.camera.basis(),
            access: self.access,
        }
    }

    fn preserve_history(&mut self) {
        if let Some(transaction) = self.transaction.as_mut() {
            if transaction.displaced_history.is_none() {
                transaction.displaced_history = Some(self.history.clone());
            }
        }
    }

    fn rollback(&mut self, transaction: Transaction, cause: &ScriptError) {
        log::warn!("rolling back statement: {cause}");
        if let Some(history) = transaction.displaced_history {
            self.history = history;
        }
        self.history.truncate(transaction.history_len);

        if let Some(model) = transaction.displaced_model {
            self.model = model;
        }
        if let (Some(model), Some(depth)) = (self.model.as_mut(), transaction.native_depth) {
            rewind(&mut **model, depth);
        }

        self.stage = transaction.stage;
        self.color = transaction.color;
        self.texture = transaction.texture;
        self.filename = transaction.filename;
        self.locale = transaction.locale;
        self.access = transaction.access;
        self.camera.set_direction(transaction.camera.direction);
        self.camera.set_x_axis(transaction.camera.x_axis);
        self.camera.set_y_axis(transaction.camera.y_axis);
    }
}

/// Bring the native undo stack to `depth`, undoing or redoing as needed.
fn rewind(model: &mut dyn FoldingModel, depth: usize) {
    let current = model.undo_depth();
    for _ in depth..current {
        if let Err(e) = model.undo() {
            log::warn!("rewind stopped: {e}");
            return;
        }
    }
    for _ in current..depth {
        if let Err(e) = model.redo() {
            log::warn!("rewind stopped: {e}");
            return;
        }
    }
}

/// Remaining tokens in readable form, used when a command rebases history.
fn tail_text(rest: &[&str]) -> String {
    rest.iter()
        .map(|t| t.replace(SENTINEL, " "))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of `undo` commands if the entry consists of nothing else.
fn undo_only(entry: &str) -> Option<usize> {
    let canonical = canonicalize(entry);
    let mut count = 0;
    for token in canonical.tokens() {
        if token != "undo" {
            return None;
        }
        count += 1;
    }
    (count > 0).then_some(count)
}
