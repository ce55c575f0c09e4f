//! Single-draft course editor. All slide operations act on the draft; the
//! persisted collection changes only on [`EditingModel::commit`].

use shared::{
    domain::{current_date_label, Course, CourseId, Role, Slide, SlideId},
    error::LearnError,
};
use storage::{CourseStore, KeyValueStore, UpsertOutcome};
use tracing::{debug, info, warn};

use crate::{
    media::{ingest_image, MediaFile},
    session::{authorize, AccessGate},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Draft {
    #[default]
    Closed,
    Editing(Course),
}

#[derive(Debug, Default)]
pub struct EditingModel {
    draft: Draft,
}

impl EditingModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn course(&self) -> Option<&Course> {
        match &self.draft {
            Draft::Closed => None,
            Draft::Editing(course) => Some(course),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.draft, Draft::Editing(_))
    }

    /// Opens `course` as the draft, silently dropping any unsaved draft.
    pub fn begin_edit(&mut self, gate: &dyn AccessGate, course: Course) -> Result<(), LearnError> {
        authorize(gate, Role::Admin)?;
        if let Draft::Editing(previous) = &self.draft {
            if previous.id != course.id {
                debug!(dropped = %previous.id, "replacing unsaved draft");
            }
        }
        info!(course = %course.id, slides = course.slides.len(), "editing course");
        self.draft = Draft::Editing(course);
        Ok(())
    }

    /// Appends one slide built from an uploaded image.
    pub fn add_slide(
        &mut self,
        gate: &dyn AccessGate,
        upload: &MediaFile,
    ) -> Result<SlideId, LearnError> {
        let course = self.guarded_draft(gate)?;
        let image_path = ingest_image(upload)?;
        let slide = Slide::new(image_path);
        let id = slide.id.clone();
        course.slides.push(slide);
        debug!(course = %course.id, slide = %id, file = %upload.name, "slide added");
        Ok(id)
    }

    /// Returns false when `index` is out of range.
    pub fn update_description(
        &mut self,
        gate: &dyn AccessGate,
        index: usize,
        text: impl Into<String>,
    ) -> Result<bool, LearnError> {
        let course = self.guarded_draft(gate)?;
        let Some(slide) = course.slides.get_mut(index) else {
            return Ok(false);
        };
        slide.description = text.into();
        Ok(true)
    }

    /// Swaps with the previous slide; false at index 0 or out of range.
    pub fn move_up(&mut self, gate: &dyn AccessGate, index: usize) -> Result<bool, LearnError> {
        let course = self.guarded_draft(gate)?;
        if index == 0 || index >= course.slides.len() {
            return Ok(false);
        }
        course.slides.swap(index - 1, index);
        Ok(true)
    }

    /// Swaps with the next slide; false at the last index or out of range.
    pub fn move_down(&mut self, gate: &dyn AccessGate, index: usize) -> Result<bool, LearnError> {
        let course = self.guarded_draft(gate)?;
        if index >= course.slides.len().saturating_sub(1) {
            return Ok(false);
        }
        course.slides.swap(index, index + 1);
        Ok(true)
    }

    /// Unconditional removal; confirmation belongs to the caller.
    pub fn remove_slide(
        &mut self,
        gate: &dyn AccessGate,
        index: usize,
    ) -> Result<Option<Slide>, LearnError> {
        let course = self.guarded_draft(gate)?;
        if index >= course.slides.len() {
            return Ok(None);
        }
        let removed = course.slides.remove(index);
        debug!(course = %course.id, slide = %removed.id, "slide removed");
        Ok(Some(removed))
    }

    /// Stamps the draft, upserts it into the collection and closes it.
    ///
    /// A draft whose id is not stored yet is appended as a new course. On a
    /// storage failure the draft stays open.
    pub async fn commit<S: KeyValueStore>(
        &mut self,
        gate: &dyn AccessGate,
        store: &CourseStore<S>,
    ) -> Result<(CourseId, UpsertOutcome), LearnError> {
        let course = self.guarded_draft(gate)?;
        let mut committed = course.clone();
        committed.last_updated = current_date_label();
        let id = committed.id.clone();

        let outcome = store
            .upsert(committed)
            .await
            .map_err(LearnError::storage)?;
        match outcome {
            UpsertOutcome::Replaced => info!(course = %id, "draft committed"),
            UpsertOutcome::Inserted => {
                warn!(course = %id, "committed draft was not in the collection; inserted as new")
            }
        }
        self.draft = Draft::Closed;
        Ok((id, outcome))
    }

    /// Drops the draft without persisting anything.
    pub fn discard(&mut self) -> Option<Course> {
        match std::mem::take(&mut self.draft) {
            Draft::Closed => None,
            Draft::Editing(course) => {
                debug!(course = %course.id, "draft discarded");
                Some(course)
            }
        }
    }

    fn guarded_draft(&mut self, gate: &dyn AccessGate) -> Result<&mut Course, LearnError> {
        authorize(gate, Role::Admin)?;
        match &mut self.draft {
            Draft::Closed => Err(LearnError::NoActiveDraft),
            Draft::Editing(course) => Ok(course),
        }
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
