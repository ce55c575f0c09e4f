use anyhow::{Context, Result};
use shared::{
    domain::{Course, CourseId},
    protocol::COURSES_KEY,
};

use crate::{sample, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Replaced,
    Inserted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStatus {
    pub course_count: usize,
    /// `(title, slide count)` in stored order.
    pub slide_counts: Vec<(String, usize)>,
    pub storage_chars: usize,
}

/// The persisted course collection. Every read and write moves the whole
/// collection under [`COURSES_KEY`].
#[derive(Clone)]
pub struct CourseStore<S> {
    kv: S,
}

impl<S: KeyValueStore> CourseStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn backend(&self) -> &S {
        &self.kv
    }

    pub async fn list(&self) -> Result<Vec<Course>> {
        let Some(raw) = self.kv.get(COURSES_KEY).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).context("stored course collection is not valid JSON")
    }

    pub async fn get_by_id(&self, id: &CourseId) -> Result<Option<Course>> {
        Ok(self.list().await?.into_iter().find(|c| &c.id == id))
    }

    /// Overwrites the whole collection.
    pub async fn save(&self, courses: &[Course]) -> Result<()> {
        let raw = serde_json::to_string(courses).context("failed to serialize courses")?;
        self.kv.set(COURSES_KEY, &raw).await
    }

    /// Removes the matching course; returns whether one was removed.
    pub async fn delete(&self, id: &CourseId) -> Result<bool> {
        let mut courses = self.list().await?;
        let before = courses.len();
        courses.retain(|c| &c.id != id);
        let removed = courses.len() != before;
        self.save(&courses).await?;
        Ok(removed)
    }

    pub async fn insert(&self, course: Course) -> Result<()> {
        let mut courses = self.list().await?;
        courses.push(course);
        self.save(&courses).await
    }

    /// Replaces the course stored under `id`; false if there is none.
    pub async fn update(&self, id: &CourseId, course: Course) -> Result<bool> {
        let mut courses = self.list().await?;
        let Some(slot) = courses.iter_mut().find(|c| &c.id == id) else {
            return Ok(false);
        };
        *slot = course;
        self.save(&courses).await?;
        Ok(true)
    }

    /// Replaces by id, or appends when the id is not stored yet.
    pub async fn upsert(&self, course: Course) -> Result<UpsertOutcome> {
        let mut courses = self.list().await?;
        let outcome = match courses.iter_mut().find(|c| c.id == course.id) {
            Some(slot) => {
                *slot = course;
                UpsertOutcome::Replaced
            }
            None => {
                courses.push(course);
                UpsertOutcome::Inserted
            }
        };
        self.save(&courses).await?;
        Ok(outcome)
    }

    /// Writes the demo courses if the collection is empty.
    pub async fn seed_sample_data(&self) -> Result<bool> {
        if !self.list().await?.is_empty() {
            return Ok(false);
        }
        self.save(&sample::sample_courses()).await?;
        Ok(true)
    }

    /// Overwrites the collection in a single write.
    pub async fn reset_sample_data(&self) -> Result<()> {
        self.save(&sample::sample_courses()).await
    }

    pub async fn status(&self) -> Result<CollectionStatus> {
        let courses = self.list().await?;
        Ok(CollectionStatus {
            course_count: courses.len(),
            slide_counts: courses
                .iter()
                .map(|c| (c.title.clone(), c.slide_count()))
                .collect(),
            storage_chars: self.kv.usage_chars().await?,
        })
    }

    /// Raw stored blob, as persisted.
    pub async fn raw(&self) -> Result<Option<String>> {
        self.kv.get(COURSES_KEY).await
    }
}
