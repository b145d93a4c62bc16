//! # Matcher Engine
//!
//! Composable boolean predicates over a typed subject. A [`Matcher`] is an immutable tree of
//! leaves and AND/OR junctions stored in an arena; nodes refer to their parent by index so
//! failure messages can be inherited from enclosing junctions.
//!
//! ```text
//! Matcher::builder()                 // implicit root AND
//!     .add(|v| ...)
//!     .or()                          // opens a nested OR
//!         .add(|v| ...)
//!         .add(|v| ...)
//!         .message("neither")
//!     .end_or()                      // closes it (a no-op if the open junction is an AND)
//!     .build()?
//! ```
use crate::matcher::operator::ComparableOperator;
use crate::matcher::operator::StringOperator;
use crate::matcher::script::bindings_of;
use crate::matcher::script::ScriptBinding;
use crate::matcher::script::ScriptEvaluator;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use std::fmt::Debug;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

pub mod cell;
pub mod operator;
pub mod script;

pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub type MessageFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Errors raised while building a matcher.
#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("{kind} junction has no condition")]
    EmptyJunction { kind: Junction },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: regex::Error },

    #[error("Compile script '{script}' failed: {message}")]
    ScriptCompile { script: String, message: String },
}

/// Index of a node inside its matcher.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Junction {
    And,
    Or,
}

impl Display for Junction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Junction::And => write!(f, "AND"),
            Junction::Or => write!(f, "OR"),
        }
    }
}

enum NodeKind<T> {
    Leaf(Predicate<T>),
    Junction(Junction, Vec<NodeId>),
}

struct Node<T> {
    kind: NodeKind<T>,
    parent: Option<NodeId>,
    message: Option<MessageFn<T>>,
}

/// Subjects with a notion of "no value".
pub trait Nullable {
    fn is_null(&self) -> bool;
}

impl Nullable for CellValue {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl Nullable for Cell {
    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl<U> Nullable for Option<U> {
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

/// A failed match: the node that failed and the message inherited by it, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch {
    pub node: NodeId,
    pub message: Option<String>,
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}", message),
            None => write!(f, "condition not satisfied"),
        }
    }
}

/// An immutable predicate tree.
pub struct Matcher<T> {
    nodes: Vec<Node<T>>,
    /// For each node, the nearest node (itself or an ancestor) carrying a message
    message_sources: Vec<Option<NodeId>>,
}

impl<T: 'static> Matcher<T> {
    /// Starts a builder whose root junction is an AND.
    pub fn builder() -> MatcherBuilder<T> {
        MatcherBuilder::new(Junction::And)
    }

    /// Returns true if the subject satisfies the tree.
    pub fn test(&self, value: &T) -> bool {
        self.evaluate(NodeId::ROOT, value).is_ok()
    }

    /// Like [`Matcher::test`], reporting which node failed and its message.
    ///
    /// The failing node of an AND is its first failing child; of an OR, its last failing
    /// child. Both descend to a leaf.
    pub fn check(&self, value: &T) -> Result<(), Mismatch> {
        self.evaluate(NodeId::ROOT, value).map_err(|node| Mismatch {
            node,
            message: self.message_source(node).and_then(|source| {
                self.nodes[source.0].message.as_ref().map(|message| message(value))
            }),
        })
    }

    /// The node whose message applies when `node` fails: itself, else the nearest ancestor
    /// with a message.
    pub fn message_source(&self, node: NodeId) -> Option<NodeId> {
        self.message_sources.get(node.0).copied().flatten()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|node| node.parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn evaluate(&self, id: NodeId, value: &T) -> Result<(), NodeId> {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(predicate) => {
                if predicate(value) {
                    Ok(())
                } else {
                    Err(id)
                }
            }
            NodeKind::Junction(Junction::And, children) => {
                for child in children {
                    self.evaluate(*child, value)?;
                }
                Ok(())
            }
            NodeKind::Junction(Junction::Or, children) => {
                let mut failure = id;
                for child in children {
                    match self.evaluate(*child, value) {
                        Ok(()) => return Ok(()),
                        Err(node) => failure = node,
                    }
                }
                Err(failure)
            }
        }
    }
}

impl<T> Debug for Matcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher").field("nodes", &self.nodes.len()).finish()
    }
}

/// Builds a [`Matcher`]. Methods apply to the currently open junction.
pub struct MatcherBuilder<T> {
    nodes: Vec<Node<T>>,
    current: NodeId,
    errors: Vec<MatcherError>,
}

impl<T: 'static> MatcherBuilder<T> {
    pub fn new(root: Junction) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Junction(root, Vec::new()),
                parent: None,
                message: None,
            }],
            current: NodeId::ROOT,
            errors: Vec::new(),
        }
    }

    /// The currently open junction.
    pub fn current(&self) -> NodeId {
        self.current
    }

    fn push(&mut self, kind: NodeKind<T>, message: Option<MessageFn<T>>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(self.current),
            message,
        });
        if let NodeKind::Junction(_, children) = &mut self.nodes[self.current.0].kind {
            children.push(id);
        }
        id
    }

    /// Adds a leaf predicate.
    pub fn add<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.push(NodeKind::Leaf(Arc::new(predicate)), None);
        self
    }

    /// Adds a leaf predicate with its own failure message.
    pub fn add_with_message<F, M>(mut self, predicate: F, message: M) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        M: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.push(NodeKind::Leaf(Arc::new(predicate)), Some(Arc::new(message)));
        self
    }

    /// Adds a leaf testing a projection of the subject.
    pub fn map<R, F, P>(self, transform: F, predicate: P) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        P: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.add(move |value| predicate(&transform(value)))
    }

    /// Adds a leaf comparing a projection of the subject with `expected`.
    /// A projection yielding None never matches.
    pub fn compare<R, F>(self, operator: ComparableOperator, expected: R, transform: F) -> Self
    where
        R: PartialOrd + Send + Sync + 'static,
        F: Fn(&T) -> Option<R> + Send + Sync + 'static,
    {
        self.add(move |value| {
            transform(value)
                .map(|value| operator.apply(&value, &expected))
                .unwrap_or(false)
        })
    }

    /// Adds a leaf applying a string operator to a projection of the subject.
    /// An invalid pattern is reported by [`MatcherBuilder::build`].
    pub fn text<F>(mut self, operator: StringOperator, expected: &str, transform: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        match operator.condition(expected) {
            Ok(condition) => self.add(move |value| condition.test(transform(value).as_deref())),
            Err(error) => {
                self.errors.push(error);
                self
            }
        }
    }

    /// Adds a scripted leaf. The script is compiled now; a compile failure is reported by
    /// [`MatcherBuilder::build`]. An evaluation failure counts as a mismatch.
    pub fn script<E>(mut self, evaluator: &E, source: &str) -> Self
    where
        E: ScriptEvaluator + ?Sized,
        T: ScriptBinding,
    {
        match evaluator.compile(source) {
            Ok(compiled) => {
                let script = source.to_owned();
                self.add(move |value| match compiled.evaluate(&bindings_of(value)) {
                    Ok(result) => result,
                    Err(error) => {
                        warn!("Evaluate script '{}' failed: {:#}", script, error);
                        false
                    }
                })
            }
            Err(error) => {
                self.errors.push(MatcherError::ScriptCompile {
                    script: source.to_owned(),
                    message: format!("{:#}", error),
                });
                self
            }
        }
    }

    fn open(mut self, kind: Junction) -> Self {
        self.current = self.push(NodeKind::Junction(kind, Vec::new()), None);
        self
    }

    /// Opens a nested AND junction.
    pub fn and(self) -> Self {
        self.open(Junction::And)
    }

    /// Opens a nested OR junction.
    pub fn or(self) -> Self {
        self.open(Junction::Or)
    }

    /// Closes the open junction only if it has the given kind; otherwise nothing changes.
    pub fn end(mut self, kind: Junction) -> Self {
        let node = &self.nodes[self.current.0];
        if let NodeKind::Junction(open, _) = &node.kind {
            if *open == kind {
                self.current = node.parent.unwrap_or(self.current);
            }
        }
        self
    }

    pub fn end_and(self) -> Self {
        self.end(Junction::And)
    }

    pub fn end_or(self) -> Self {
        self.end(Junction::Or)
    }

    /// Sets a fixed failure message on the open junction.
    pub fn message(self, message: &str) -> Self {
        let message = message.to_owned();
        self.message_fn(move |_| message.clone())
    }

    /// Sets a failure message producer on the open junction.
    pub fn message_fn<M>(mut self, message: M) -> Self
    where
        M: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.nodes[self.current.0].message = Some(Arc::new(message));
        self
    }

    /// Finalizes the tree. Fails on the first recorded error or on any empty junction.
    pub fn build(self) -> Result<Matcher<T>, MatcherError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        for node in &self.nodes {
            if let NodeKind::Junction(kind, children) = &node.kind {
                if children.is_empty() {
                    return Err(MatcherError::EmptyJunction { kind: *kind });
                }
            }
        }
        // Parents are always created before their children.
        let mut message_sources: Vec<Option<NodeId>> = Vec::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            let source = if node.message.is_some() {
                Some(NodeId(index))
            } else {
                node.parent.and_then(|parent| message_sources[parent.0])
            };
            message_sources.push(source);
        }
        Ok(Matcher {
            nodes: self.nodes,
            message_sources,
        })
    }
}

impl<T: Nullable + 'static> MatcherBuilder<T> {
    pub fn is_null(self) -> Self {
        self.add(|value: &T| value.is_null())
    }

    pub fn non_null(self) -> Self {
        self.add(|value: &T| !value.is_null())
    }
}

impl<T: PartialOrd + Send + Sync + 'static> MatcherBuilder<T> {
    fn compare_self(self, operator: ComparableOperator, expected: T) -> Self {
        self.add(move |value: &T| operator.apply(value, &expected))
    }

    pub fn lt(self, expected: T) -> Self {
        self.compare_self(ComparableOperator::Lt, expected)
    }

    pub fn le(self, expected: T) -> Self {
        self.compare_self(ComparableOperator::Le, expected)
    }

    pub fn gt(self, expected: T) -> Self {
        self.compare_self(ComparableOperator::Gt, expected)
    }

    pub fn ge(self, expected: T) -> Self {
        self.compare_self(ComparableOperator::Ge, expected)
    }

    pub fn eq(self, expected: T) -> Self {
        self.compare_self(ComparableOperator::Eq, expected)
    }

    pub fn ne(self, expected: T) -> Self {
        self.compare_self(ComparableOperator::Ne, expected)
    }

    /// Inclusive on both ends.
    pub fn between(self, low: T, high: T) -> Self {
        self.add(move |value: &T| {
            ComparableOperator::Ge.apply(value, &low) && ComparableOperator::Le.apply(value, &high)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::script::Bindings;
    use crate::matcher::script::CompiledScript;
    use crate::matcher::script::SCRIPT_VALUE_KEY;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[test]
    fn and_is_ordered_conjunction_with_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (first, second) = (calls.clone(), calls.clone());
        let matcher = Matcher::<i64>::builder()
            .add(move |value| {
                first.fetch_add(1, Ordering::SeqCst);
                *value > 0
            })
            .add(move |value| {
                second.fetch_add(1, Ordering::SeqCst);
                *value < 10
            })
            .build()
            .unwrap();

        assert!(!matcher.test(&-1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matcher.test(&5));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!matcher.test(&20));
    }

    #[test]
    fn or_is_ordered_disjunction_with_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let matcher = Matcher::<i64>::builder()
            .or()
            .add(|value| *value < 0)
            .add(move |value| {
                counter.fetch_add(1, Ordering::SeqCst);
                *value > 100
            })
            .end_or()
            .build()
            .unwrap();

        assert!(matcher.test(&-5));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matcher.test(&500));
        assert!(!matcher.test(&50));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn closing_the_wrong_junction_is_a_no_op() {
        let builder = Matcher::<i64>::builder().or();
        let open = builder.current();
        let builder = builder.end_and();
        assert_eq!(builder.current(), open);

        let builder = builder.add(|value| *value == 1).add(|value| *value == 2).end_or();
        assert_eq!(builder.current(), NodeId::ROOT);

        // Closing the root keeps the root open.
        let builder = builder.end_and();
        assert_eq!(builder.current(), NodeId::ROOT);

        let matcher = builder.add(|value| *value != 2).build().unwrap();
        assert!(matcher.test(&1));
        assert!(!matcher.test(&2));
        assert!(!matcher.test(&3));
    }

    #[test]
    fn message_is_inherited_from_enclosing_junctions() {
        let matcher = Matcher::<i64>::builder()
            .or()
            .message("must be positive and even")
            .and()
            .add(|value| *value > 0)
            .add(|value| value % 2 == 0)
            .end_and()
            .end_or()
            .build()
            .unwrap();

        let mismatch = matcher.check(&3).unwrap_err();
        assert_eq!(mismatch.message.as_deref(), Some("must be positive and even"));
        // The failing leaf carries no message; its AND parent neither; the OR does.
        let leaf = mismatch.node;
        let and = matcher.parent(leaf).unwrap();
        let or = matcher.parent(and).unwrap();
        assert_eq!(matcher.message_source(leaf), Some(or));
        assert_eq!(matcher.message_source(and), Some(or));
        assert_eq!(matcher.message_source(NodeId::ROOT), None);
        assert!(matcher.check(&4).is_ok());
    }

    #[test]
    fn own_message_wins_over_inherited() {
        let matcher = Matcher::<i64>::builder()
            .message("root")
            .add_with_message(|value| *value > 0, |value| format!("{} is not positive", value))
            .add(|value| *value < 10)
            .build()
            .unwrap();

        assert_eq!(matcher.check(&-1).unwrap_err().message.as_deref(), Some("-1 is not positive"));
        assert_eq!(matcher.check(&11).unwrap_err().message.as_deref(), Some("root"));
    }

    #[test]
    fn no_message_anywhere() {
        let matcher = Matcher::<i64>::builder().add(|value| *value > 0).build().unwrap();
        let mismatch = matcher.check(&0).unwrap_err();
        assert_eq!(mismatch.message, None);
        assert_eq!(mismatch.to_string(), "condition not satisfied");
    }

    #[test]
    fn empty_junction_fails_to_build() {
        let error = Matcher::<i64>::builder().build().unwrap_err();
        assert!(matches!(error, MatcherError::EmptyJunction { kind: Junction::And }));

        let error = Matcher::<i64>::builder()
            .add(|_| true)
            .or()
            .end_or()
            .build()
            .unwrap_err();
        assert!(matches!(error, MatcherError::EmptyJunction { kind: Junction::Or }));
    }

    #[test]
    fn typed_comparisons() {
        let matcher = Matcher::<i64>::builder().between(1, 3).ne(2).build().unwrap();
        assert!(matcher.test(&1));
        assert!(!matcher.test(&2));
        assert!(matcher.test(&3));
        assert!(!matcher.test(&4));

        let matcher = Matcher::<CellValue>::builder().ge(CellValue::Number(0.0)).build().unwrap();
        assert!(matcher.test(&CellValue::from("0")));
        assert!(!matcher.test(&CellValue::from("-5")));
        assert!(!matcher.test(&CellValue::Empty));
    }

    #[test]
    fn projections() {
        let matcher = Matcher::<String>::builder()
            .map(|value: &String| value.len(), |length| *length > 2)
            .compare(ComparableOperator::Le, 5, |value: &String| Some(value.len()))
            .text(StringOperator::StartsWith, "ab", |value: &String| Some(value.clone()))
            .build()
            .unwrap();
        assert!(matcher.test(&"abc".to_owned()));
        assert!(!matcher.test(&"ab".to_owned()));
        assert!(!matcher.test(&"abcdef".to_owned()));
        assert!(!matcher.test(&"xyz".to_owned()));
    }

    #[test]
    fn invalid_regex_fails_to_build() {
        let error = Matcher::<String>::builder()
            .text(StringOperator::Matches, "[", |value: &String| Some(value.clone()))
            .build()
            .unwrap_err();
        assert!(matches!(error, MatcherError::InvalidPattern { .. }));
    }

    #[test]
    fn null_checks() {
        let matcher = Matcher::<CellValue>::builder().non_null().build().unwrap();
        assert!(matcher.test(&CellValue::from("x")));
        assert!(!matcher.test(&CellValue::Empty));

        let matcher = Matcher::<Option<i64>>::builder().is_null().build().unwrap();
        assert!(matcher.test(&None));
        assert!(!matcher.test(&Some(1)));
    }

    /// Understands "value > N" and "fail".
    struct GreaterThan;

    struct CompiledGreaterThan(Option<f64>);

    impl ScriptEvaluator for GreaterThan {
        fn compile(&self, source: &str) -> anyhow::Result<Box<dyn CompiledScript>> {
            if source == "fail" {
                return Ok(Box::new(CompiledGreaterThan(None)));
            }
            let bound = source
                .strip_prefix("value > ")
                .ok_or_else(|| anyhow!("unsupported script"))?
                .parse::<f64>()?;
            Ok(Box::new(CompiledGreaterThan(Some(bound))))
        }
    }

    impl CompiledScript for CompiledGreaterThan {
        fn evaluate(&self, bindings: &Bindings) -> anyhow::Result<bool> {
            let bound = self.0.ok_or_else(|| anyhow!("runtime failure"))?;
            let value = bindings
                .get(SCRIPT_VALUE_KEY)
                .and_then(CellValue::as_number)
                .ok_or_else(|| anyhow!("not a number"))?;
            Ok(value > bound)
        }
    }

    #[test]
    fn scripted_leaf() {
        let matcher = Matcher::<CellValue>::builder().script(&GreaterThan, "value > 1").build().unwrap();
        assert!(matcher.test(&CellValue::Number(4.0)));
        assert!(!matcher.test(&CellValue::Number(1.0)));
        // Evaluation errors count as a mismatch.
        assert!(!matcher.test(&CellValue::from("four")));

        let matcher = Matcher::<CellValue>::builder().script(&GreaterThan, "fail").build().unwrap();
        assert!(!matcher.test(&CellValue::Number(4.0)));
    }

    #[test]
    fn script_compile_error_fails_to_build() {
        let error = Matcher::<CellValue>::builder().script(&GreaterThan, "value < 1").build().unwrap_err();
        assert!(matches!(error, MatcherError::ScriptCompile { .. }));
    }

    #[test]
    fn matcher_is_shareable() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Matcher<Cell>>();
    }
}
