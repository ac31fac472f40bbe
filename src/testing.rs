//! Test doubles for the collaborator traits.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glam::{DVec2, DVec3};
use parking_lot::Mutex;

use crate::error::ScriptError;
use crate::model::{
    Backend, ExportFormat, ExportJob, FoldingModel, NativeDocument, PaperColor, PaperPreset,
    RegionId,
};
use crate::prompt::{Confirmation, Prompter, TimeoutChoice};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Build(Option<PaperPreset>, Vec<DVec2>),
    Crease(DVec3, DVec3),
    Rotate(DVec3, DVec3, i32, Option<RegionId>),
    Reflect(DVec3, DVec3, Option<RegionId>),
    Cut(DVec3, DVec3, Option<RegionId>),
    Region(DVec2),
    Undo,
    Redo,
    Export(ExportFormat, PathBuf, Option<PaperColor>, Option<String>, bool),
}

/// Shared log of every call made on models built by a [`RecordingBackend`].
#[derive(Debug, Clone, Default)]
pub struct Probe(Arc<Mutex<Vec<Call>>>);

impl Probe {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    fn push(&self, call: Call) {
        self.0.lock().push(call);
    }
}

/// Model that logs calls and keeps only undo/redo depth. Cuts with a
/// negative x point are refused, and every fold sleeps for `delay`. With
/// `hide_native_undo` it reports an empty native stack, which forces undo
/// through history replay.
pub struct RecordingModel {
    probe: Probe,
    delay: Duration,
    hide_native_undo: bool,
    depth: usize,
    redo: usize,
}

impl RecordingModel {
    fn mutate(&mut self, call: Call) -> Result<(), ScriptError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.probe.push(call);
        self.depth += 1;
        self.redo = 0;
        Ok(())
    }
}

impl FoldingModel for RecordingModel {
    fn crease(&mut self, point: DVec3, normal: DVec3) -> Result<(), ScriptError> {
        self.mutate(Call::Crease(point, normal))
    }

    fn rotation_fold(
        &mut self,
        point: DVec3,
        normal: DVec3,
        angle: i32,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError> {
        self.mutate(Call::Rotate(point, normal, angle, region))
    }

    fn reflection_fold(
        &mut self,
        point: DVec3,
        normal: DVec3,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError> {
        self.mutate(Call::Reflect(point, normal, region))
    }

    fn cut(
        &mut self,
        point: DVec3,
        normal: DVec3,
        region: Option<RegionId>,
    ) -> Result<(), ScriptError> {
        if point.x < 0.0 {
            return Err(ScriptError::model("cut refused"));
        }
        self.mutate(Call::Cut(point, normal, region))
    }

    fn region_containing(&self, point: DVec2) -> Result<RegionId, ScriptError> {
        self.probe.push(Call::Region(point));
        Ok(7)
    }

    fn map_planar_point(&self, point: DVec2) -> DVec3 {
        DVec3::new(point.x, point.y, 5.0)
    }

    fn undo(&mut self) -> Result<(), ScriptError> {
        if self.depth == 0 {
            return Err(ScriptError::model("nothing to undo"));
        }
        self.probe.push(Call::Undo);
        self.depth -= 1;
        self.redo += 1;
        Ok(())
    }

    fn redo(&mut self) -> Result<(), ScriptError> {
        if self.redo == 0 {
            return Err(ScriptError::model("nothing to redo"));
        }
        self.probe.push(Call::Redo);
        self.redo -= 1;
        self.depth += 1;
        Ok(())
    }

    fn undo_depth(&self) -> usize {
        if self.hide_native_undo {
            0
        } else {
            self.depth
        }
    }

    fn planar_vertices(&self) -> Vec<DVec2> {
        vec![DVec2::ZERO, DVec2::X, DVec2::Y]
    }

    fn regions(&self) -> Vec<Vec<usize>> {
        vec![vec![0, 1, 2]]
    }

    fn corners(&self) -> Vec<DVec2> {
        vec![DVec2::ZERO, DVec2::X, DVec2::Y]
    }
}

#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub probe: Probe,
    pub delay: Duration,
    pub hide_native_undo: bool,
}

impl RecordingBackend {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn without_native_undo() -> Self {
        Self {
            hide_native_undo: true,
            ..Self::default()
        }
    }

    fn build(&self) -> RecordingModel {
        RecordingModel {
            probe: self.probe.clone(),
            delay: self.delay,
            hide_native_undo: self.hide_native_undo,
            depth: 0,
            redo: 0,
        }
    }
}

impl Backend for RecordingBackend {
    fn model_from_corners(&self, corners: &[DVec2]) -> Result<Box<dyn FoldingModel>, ScriptError> {
        if corners.len() < 3 {
            return Err(ScriptError::model("too few corners"));
        }
        self.probe.push(Call::Build(None, corners.to_vec()));
        Ok(Box::new(self.build()))
    }

    fn model_from_preset(&self, preset: PaperPreset) -> Box<dyn FoldingModel> {
        self.probe.push(Call::Build(Some(preset), Vec::new()));
        Box::new(self.build())
    }

    fn open_native(&self, path: &Path) -> Result<NativeDocument, ScriptError> {
        std::fs::metadata(path)?;
        Ok(NativeDocument {
            model: Box::new(self.build()),
            color: Some(PaperColor::rgb(9, 9, 9)),
        })
    }

    fn export(&self, job: &ExportJob<'_>) -> Result<(), ScriptError> {
        self.probe.push(Call::Export(
            job.format,
            job.path.to_path_buf(),
            job.color,
            job.title.map(str::to_string),
            job.texture.is_some(),
        ));
        std::fs::write(job.path, b"exported")?;
        Ok(())
    }
}

/// Prompter answering from queues; an empty queue declines / waits.
#[derive(Default)]
pub struct ScriptedPrompter {
    confirms: Mutex<VecDeque<bool>>,
    timeouts: Mutex<VecDeque<TimeoutChoice>>,
    pub timeout_prompts: AtomicUsize,
}

impl ScriptedPrompter {
    pub fn confirming(answers: &[bool]) -> Self {
        let p = Self::default();
        p.confirms.lock().extend(answers.iter().copied());
        p
    }

    pub fn on_timeouts(answers: &[TimeoutChoice]) -> Self {
        let p = Self::default();
        p.timeouts.lock().extend(answers.iter().copied());
        p
    }

    pub fn timeout_count(&self) -> usize {
        self.timeout_prompts.load(Ordering::SeqCst)
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, _request: Confirmation) -> bool {
        self.confirms.lock().pop_front().unwrap_or(false)
    }

    fn on_timeout(&self, _waited: Duration, _extended: bool) -> TimeoutChoice {
        self.timeout_prompts.fetch_add(1, Ordering::SeqCst);
        self.timeouts
            .lock()
            .pop_front()
            .unwrap_or(TimeoutChoice::Wait)
    }
}
