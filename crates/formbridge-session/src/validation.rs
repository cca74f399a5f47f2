use crate::field::FieldStore;

/// Outcome of one validator evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorOutcome {
  Pass,
  Fail { message: Option<String> },
  /// The validator cannot currently produce a definitive outcome, e.g. it is
  /// waiting on an async lookup. Strict mode counts this as failing,
  /// lenient mode skips it.
  Pending,
}

impl ValidatorOutcome {
  pub fn fail(message: impl Into<String>) -> Self {
    ValidatorOutcome::Fail {
      message: Some(message.into()),
    }
  }
}

/// A re-evaluable validity check over the session's current field values.
pub trait Validator: Send + Sync {
  fn id(&self) -> &str;

  /// Evaluate against current (not committed) field values.
  fn evaluate(&self, fields: &FieldStore) -> ValidatorOutcome;
}

/// A validator built from a closure, for hosts that register checks inline.
pub struct FnValidator<F> {
  id: String,
  check: F,
}

impl<F> FnValidator<F>
where
  F: Fn(&FieldStore) -> ValidatorOutcome + Send + Sync,
{
  pub fn new(id: impl Into<String>, check: F) -> Self {
    Self {
      id: id.into(),
      check,
    }
  }
}

impl<F> Validator for FnValidator<F>
where
  F: Fn(&FieldStore) -> ValidatorOutcome + Send + Sync,
{
  fn id(&self) -> &str {
    &self.id
  }

  fn evaluate(&self, fields: &FieldStore) -> ValidatorOutcome {
    (self.check)(fields)
  }
}

/// Aggregates validator outcomes into a single validity flag.
///
/// Validity is pull-based: every call re-evaluates all validators against
/// the live field store, since validators may depend on current field
/// values. Nothing is cached.
#[derive(Default)]
pub struct ValidationState {
  validators: Vec<Box<dyn Validator>>,
}

impl ValidationState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a validator. A validator with the same id replaces the
  /// previous registration.
  pub fn register(&mut self, validator: Box<dyn Validator>) {
    if let Some(existing) = self
      .validators
      .iter_mut()
      .find(|v| v.id() == validator.id())
    {
      *existing = validator;
    } else {
      self.validators.push(validator);
    }
  }

  pub fn get(&self, id: &str) -> Option<&dyn Validator> {
    self.validators.iter().find(|v| v.id() == id).map(|v| &**v)
  }

  pub fn validator_ids(&self) -> impl Iterator<Item = &str> {
    self.validators.iter().map(|v| v.id())
  }

  /// Evaluate every validator and return the per-validator outcomes.
  pub fn outcomes(&self, fields: &FieldStore) -> Vec<(String, ValidatorOutcome)> {
    self
      .validators
      .iter()
      .map(|v| (v.id().to_string(), v.evaluate(fields)))
      .collect()
  }

  /// AND-reduction over all validators.
  ///
  /// Strict mode treats `Pending` as failing; lenient mode treats it as
  /// passing. An empty validator set is valid under both policies.
  pub fn is_valid(&self, fields: &FieldStore, strict: bool) -> bool {
    self.validators.iter().all(|v| match v.evaluate(fields) {
      ValidatorOutcome::Pass => true,
      ValidatorOutcome::Fail { .. } => false,
      ValidatorOutcome::Pending => !strict,
    })
  }

  pub fn len(&self) -> usize {
    self.validators.len()
  }

  pub fn is_empty(&self) -> bool {
    self.validators.is_empty()
  }
}
