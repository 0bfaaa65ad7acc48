//! Teacher → class → student traversal and bucket classification.
//!
//! The walk is strictly ordered: teachers in the order the source returned
//! them, and within a teacher each class fully resolved before the next is
//! fetched. With a concurrency above one, several teachers are walked at once
//! but results are still collected in teacher order, so the report is the
//! same as a sequential run. The first failed request aborts the whole run.

use futures_util::{StreamExt as _, TryStreamExt as _, stream};
use tracing::{debug, info};

use crate::{
  entity::User,
  query::Query,
  report::{ClassificationReport, ClassifiedClass, ClassifiedTeacher},
  source::RosterSource,
};

/// Drives a [`RosterSource`] and assembles a [`ClassificationReport`].
pub struct Classifier<S> {
  source:        S,
  teacher_query: Query,
  class_query:   Query,
  student_query: Query,
  concurrency:   usize,
}

impl<S: RosterSource> Classifier<S> {
  /// A sequential classifier with no query parameters.
  pub fn new(source: S) -> Self {
    Self {
      source,
      teacher_query: Query::default(),
      class_query: Query::default(),
      student_query: Query::default(),
      concurrency: 1,
    }
  }

  /// Parameters for the teacher listing, e.g. a filter and page size.
  pub fn with_teacher_query(mut self, query: Query) -> Self {
    self.teacher_query = query;
    self
  }

  pub fn with_class_query(mut self, query: Query) -> Self {
    self.class_query = query;
    self
  }

  pub fn with_student_query(mut self, query: Query) -> Self {
    self.student_query = query;
    self
  }

  /// Number of teachers walked at once. Zero is treated as one.
  pub fn with_concurrency(mut self, concurrency: usize) -> Self {
    self.concurrency = concurrency.max(1);
    self
  }

  pub fn source(&self) -> &S { &self.source }

  /// Fetch every teacher, walk their classes and students, and classify.
  pub async fn run(&self) -> Result<ClassificationReport, S::Error> {
    let teachers = self.source.get_all_teachers(&self.teacher_query).await?;
    info!(teachers = teachers.len(), "fetched teachers");

    let classified: Vec<ClassifiedTeacher> = stream::iter(teachers)
      .map(|teacher| self.walk_teacher(teacher))
      .buffered(self.concurrency)
      .try_collect()
      .await?;

    let report = ClassificationReport::from_teachers(classified);
    info!(
      no_classes = report.teachers_with_no_classes.len(),
      classes_but_no_students = report.teachers_with_classes_but_no_students.len(),
      classes_and_students = report.teachers_with_classes_and_students.len(),
      "classified teachers"
    );
    Ok(report)
  }

  async fn walk_teacher(&self, teacher: User) -> Result<ClassifiedTeacher, S::Error> {
    let classes = self
      .source
      .get_classes_for_teacher(&teacher.base.sourced_id, &self.class_query)
      .await?;

    let mut walked = Vec::with_capacity(classes.len());
    for class in classes {
      let students = self
        .source
        .get_students_for_class(&class.base.sourced_id, &self.student_query)
        .await?;
      walked.push(ClassifiedClass { class, students });
    }

    let teacher = ClassifiedTeacher { teacher, classes: walked };
    debug!(
      teacher = %teacher.teacher.base.sourced_id,
      classes = teacher.classes.len(),
      bucket = %teacher.bucket(),
      "walked teacher"
    );
    Ok(teacher)
  }
}
