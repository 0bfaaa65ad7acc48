//! The [`RosterSource`] trait — where the engine meets the remote API.
//!
//! Implemented by `roster-client` over HTTP, and by in-memory fakes in tests.

use std::future::Future;

use crate::{
  entity::{ClassRecord, User},
  query::Query,
};

/// Read-only access to the teacher → class → student hierarchy.
///
/// All methods return `Send` futures so the engine can drive several
/// teachers at once on a multi-threaded runtime.
pub trait RosterSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `GET {base}/teachers`
  fn get_all_teachers<'a>(
    &'a self,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  /// `GET {base}/teachers/{teacher_id}/classes`
  fn get_classes_for_teacher<'a>(
    &'a self,
    teacher_id: &'a str,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<ClassRecord>, Self::Error>> + Send + 'a;

  /// `GET {base}/classes/{class_id}/students`
  fn get_students_for_class<'a>(
    &'a self,
    class_id: &'a str,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;
}
