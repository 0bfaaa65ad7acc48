//! Classified teachers, the three output buckets, and the persistence seam.

use std::fmt;

use serde_json::Value;

use crate::entity::{ClassRecord, Entity, User, WireObject};

// ─── Buckets ─────────────────────────────────────────────────────────────────

/// The three mutually exclusive categories a teacher lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
  NoClasses,
  ClassesButNoStudents,
  ClassesAndStudents,
}

impl Bucket {
  pub const ALL: [Bucket; 3] = [
    Bucket::NoClasses,
    Bucket::ClassesButNoStudents,
    Bucket::ClassesAndStudents,
  ];

  /// Stable snake_case name, also used as the output document stem.
  pub fn name(self) -> &'static str {
    match self {
      Self::NoClasses => "teachers_with_no_classes",
      Self::ClassesButNoStudents => "teachers_with_classes_but_no_students",
      Self::ClassesAndStudents => "teachers_with_classes_and_students",
    }
  }
}

impl fmt::Display for Bucket {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Enriched records ────────────────────────────────────────────────────────

/// A class together with the students enrolled in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedClass {
  pub class:    ClassRecord,
  pub students: Vec<User>,
}

impl ClassifiedClass {
  pub fn has_students(&self) -> bool { !self.students.is_empty() }

  /// The class wire object; a `students` array is attached only when the
  /// class has at least one student.
  pub fn encode(&self) -> WireObject {
    let mut wire = self.class.encode();
    if self.has_students() {
      wire.insert(
        "students".into(),
        self
          .students
          .iter()
          .map(|student| Value::Object(student.encode()))
          .collect(),
      );
    }
    wire
  }
}

/// A teacher together with their classes, in the order the API returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTeacher {
  pub teacher: User,
  pub classes: Vec<ClassifiedClass>,
}

impl ClassifiedTeacher {
  /// Placement depends on cardinalities alone: no classes, classes without a
  /// single student, or at least one student in any class.
  pub fn bucket(&self) -> Bucket {
    if self.classes.is_empty() {
      Bucket::NoClasses
    } else if self.classes.iter().any(ClassifiedClass::has_students) {
      Bucket::ClassesAndStudents
    } else {
      Bucket::ClassesButNoStudents
    }
  }

  /// The teacher wire object; a `classes` array is attached only when the
  /// teacher has at least one class.
  pub fn encode(&self) -> WireObject {
    let mut wire = self.teacher.encode();
    if !self.classes.is_empty() {
      wire.insert(
        "classes".into(),
        self
          .classes
          .iter()
          .map(|class| Value::Object(class.encode()))
          .collect(),
      );
    }
    wire
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// The partition of every fetched teacher into the three buckets. Each bucket
/// keeps the relative order in which teachers were fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationReport {
  pub teachers_with_no_classes:              Vec<ClassifiedTeacher>,
  pub teachers_with_classes_but_no_students: Vec<ClassifiedTeacher>,
  pub teachers_with_classes_and_students:    Vec<ClassifiedTeacher>,
}

impl ClassificationReport {
  pub fn from_teachers(
    teachers: impl IntoIterator<Item = ClassifiedTeacher>,
  ) -> Self {
    let mut report = Self::default();
    for teacher in teachers {
      report.bucket_mut(teacher.bucket()).push(teacher);
    }
    report
  }

  pub fn bucket(&self, bucket: Bucket) -> &[ClassifiedTeacher] {
    match bucket {
      Bucket::NoClasses => &self.teachers_with_no_classes,
      Bucket::ClassesButNoStudents => &self.teachers_with_classes_but_no_students,
      Bucket::ClassesAndStudents => &self.teachers_with_classes_and_students,
    }
  }

  fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<ClassifiedTeacher> {
    match bucket {
      Bucket::NoClasses => &mut self.teachers_with_no_classes,
      Bucket::ClassesButNoStudents => {
        &mut self.teachers_with_classes_but_no_students
      }
      Bucket::ClassesAndStudents => &mut self.teachers_with_classes_and_students,
    }
  }

  /// Number of teachers across all buckets.
  pub fn total(&self) -> usize {
    Bucket::ALL.iter().map(|&b| self.bucket(b).len()).sum()
  }

  /// Each bucket paired with its encoded JSON array, in [`Bucket::ALL`] order.
  pub fn documents(&self) -> Vec<(Bucket, Value)> {
    Bucket::ALL
      .iter()
      .map(|&bucket| {
        let document: Value = self
          .bucket(bucket)
          .iter()
          .map(|teacher| Value::Object(teacher.encode()))
          .collect();
        (bucket, document)
      })
      .collect()
  }

  /// Hand all three documents to `writer`, then commit them. A failed write
  /// stops before [`ReportWriter::commit`], so nothing is published.
  pub fn persist<W: ReportWriter>(&self, writer: &mut W) -> Result<(), W::Error> {
    for (bucket, document) in self.documents() {
      writer.write(bucket, &document)?;
    }
    writer.commit()
  }
}

// ─── Persistence seam ────────────────────────────────────────────────────────

/// Destination for the encoded bucket documents.
///
/// [`write`](Self::write) is called once per bucket and may only stage the
/// document; [`commit`](Self::commit) runs after every bucket was staged and
/// makes them visible together.
pub trait ReportWriter {
  type Error: std::error::Error + Send + Sync + 'static;

  fn write(&mut self, bucket: Bucket, document: &Value) -> Result<(), Self::Error>;

  fn commit(&mut self) -> Result<(), Self::Error> { Ok(()) }
}
