//! Validation rules run against located data cells (field validators) and assembled
//! records (record validators). A validator returns one message per violation; the
//! assembler turns them into prefixed parse errors.
use crate::matcher::Matcher;
use crate::matcher::Predicate;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use std::sync::Arc;

pub trait Validator<T: ?Sized>: Send + Sync {
    /// Returns false to skip the value entirely.
    fn needs_validate(&self, _value: &T) -> bool {
        true
    }

    fn validate(&self, value: &T) -> Vec<String>;
}

/// A validator backed by a closure returning the violation messages.
pub struct FnValidator<T: ?Sized> {
    validate: Arc<dyn Fn(&T) -> Vec<String> + Send + Sync>,
    condition: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T: ?Sized> FnValidator<T> {
    pub fn new<F>(validate: F) -> Self
    where
        F: Fn(&T) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            validate: Arc::new(validate),
            condition: None,
        }
    }

    /// Builds a validator reporting `message` whenever `rule` does not hold.
    pub fn rule<F>(rule: F, message: &str) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let message = message.to_owned();
        Self::new(move |value| if rule(value) { Vec::new() } else { vec![message.clone()] })
    }

    /// Only validates values for which `condition` holds.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }
}

impl<T: ?Sized> Validator<T> for FnValidator<T> {
    fn needs_validate(&self, value: &T) -> bool {
        self.condition.as_ref().map(|condition| condition(value)).unwrap_or(true)
    }

    fn validate(&self, value: &T) -> Vec<String> {
        (self.validate)(value)
    }
}

/// A validator backed by a matcher. A mismatch reports the message of the failing node.
pub struct MatcherValidator<T> {
    matcher: Matcher<T>,
    condition: Option<Predicate<T>>,
}

impl<T: 'static> MatcherValidator<T> {
    pub fn new(matcher: Matcher<T>) -> Self {
        Self { matcher, condition: None }
    }

    /// Only validates values for which `condition` holds.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    fn messages(&self, value: &T) -> Vec<String> {
        match self.matcher.check(value) {
            Ok(()) => Vec::new(),
            Err(mismatch) => vec![mismatch.to_string()],
        }
    }
}

impl<T: 'static> Validator<T> for MatcherValidator<T> {
    fn needs_validate(&self, value: &T) -> bool {
        self.condition.as_ref().map(|condition| condition(value)).unwrap_or(true)
    }

    fn validate(&self, value: &T) -> Vec<String> {
        self.messages(value)
    }
}

/// Value matchers validate cells through their value.
impl Validator<Cell> for MatcherValidator<CellValue> {
    fn needs_validate(&self, cell: &Cell) -> bool {
        self.condition.as_ref().map(|condition| condition(&cell.value)).unwrap_or(true)
    }

    fn validate(&self, cell: &Cell) -> Vec<String> {
        self.messages(&cell.value)
    }
}
