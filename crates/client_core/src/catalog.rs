//! Role-gated operations over the whole course collection.

use shared::{
    domain::{Course, CourseId, Role},
    error::LearnError,
};
use storage::{CourseStore, KeyValueStore};
use tracing::info;

use crate::session::{authorize, AccessGate};

#[derive(Clone)]
pub struct CourseCatalog<S> {
    store: CourseStore<S>,
}

impl<S: KeyValueStore> CourseCatalog<S> {
    pub fn new(store: CourseStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CourseStore<S> {
        &self.store
    }

    pub async fn list_for_admin(&self, gate: &dyn AccessGate) -> Result<Vec<Course>, LearnError> {
        authorize(gate, Role::Admin)?;
        self.store.list().await.map_err(LearnError::storage)
    }

    /// Courses a student can open: those with at least one slide.
    pub async fn list_for_student(&self, gate: &dyn AccessGate) -> Result<Vec<Course>, LearnError> {
        authorize(gate, Role::Student)?;
        let courses = self.store.list().await.map_err(LearnError::storage)?;
        Ok(courses.into_iter().filter(Course::is_playable).collect())
    }

    pub async fn create_course(
        &self,
        gate: &dyn AccessGate,
        title: &str,
    ) -> Result<Course, LearnError> {
        authorize(gate, Role::Admin)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(LearnError::Validation(
                "course title must not be empty".to_string(),
            ));
        }
        let course = Course::new(title);
        self.store
            .insert(course.clone())
            .await
            .map_err(LearnError::storage)?;
        info!(course = %course.id, title = %course.title, "course created");
        Ok(course)
    }

    /// Irreversible; callers confirm with the user first.
    pub async fn delete_course(
        &self,
        gate: &dyn AccessGate,
        id: &CourseId,
    ) -> Result<Course, LearnError> {
        authorize(gate, Role::Admin)?;
        let course = self.find(id).await?;
        self.store.delete(id).await.map_err(LearnError::storage)?;
        info!(course = %id, title = %course.title, "course deleted");
        Ok(course)
    }

    pub async fn open_for_edit(
        &self,
        gate: &dyn AccessGate,
        id: &CourseId,
    ) -> Result<Course, LearnError> {
        authorize(gate, Role::Admin)?;
        self.find(id).await
    }

    pub async fn open_for_playback(
        &self,
        gate: &dyn AccessGate,
        id: &CourseId,
    ) -> Result<Course, LearnError> {
        authorize(gate, Role::Student)?;
        let course = self.find(id).await?;
        if !course.is_playable() {
            return Err(LearnError::EmptyCourse {
                course_id: id.to_string(),
            });
        }
        Ok(course)
    }

    async fn find(&self, id: &CourseId) -> Result<Course, LearnError> {
        self.store
            .get_by_id(id)
            .await
            .map_err(LearnError::storage)?
            .ok_or_else(|| LearnError::course_not_found(id.as_str()))
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
