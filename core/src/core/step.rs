// operon/src/core/step.rs

//! Step and catch descriptors, declared once at definition time.

use std::sync::Arc;

/// Predicate deciding whether a declared catch handles a raised error.
///
/// This is the engine's rendition of exception-type filtering: instead
/// of comparing type tags, a catch supplies a predicate over the
/// pipeline's error type at registration. Matching "by ancestor"
/// becomes matching on whatever structure of the error the predicate
/// inspects. Uses Arc to be easily cloneable and shareable.
pub type CatchFilter<Err> = Arc<dyn Fn(&Err) -> bool + Send + Sync + 'static>;

/// One named, ordered unit of work in the pipeline.
#[derive(Debug, Clone)]
pub struct Step {
  pub name: String,
  /// Non-required steps are skipped unless a drift lands on them.
  pub required: bool,
  /// Pipeline that conceptually owns the implementation. The engine
  /// never dispatches through this; it is diagnostic context for
  /// structural errors and documentation when several pipelines'
  /// steps are interleaved by hand.
  pub receiver: String,
}

/// A named, ordered compensating handler with its error filter.
pub struct Catch<Err> {
  pub name: String,
  pub filter: CatchFilter<Err>,
  pub receiver: String,
}

impl<Err> Clone for Catch<Err> {
  fn clone(&self) -> Self {
    Catch {
      name: self.name.clone(),
      filter: Arc::clone(&self.filter),
      receiver: self.receiver.clone(),
    }
  }
}

// CatchFilter (Arc<dyn Fn...>) doesn't implement Debug; provide a
// placeholder output.
impl<Err> std::fmt::Debug for Catch<Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Catch")
      .field("name", &self.name)
      .field("receiver", &self.receiver)
      .field("filter", &"<predicate>")
      .finish()
  }
}

/// The default catch filter: matches every error.
pub fn match_any<Err>() -> CatchFilter<Err> {
  Arc::new(|_| true)
}
