use crate::config::Necessity;
use crate::config::Role;
use crate::geometry::Direction;
use crate::matcher::Matcher;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::validator::Validator;
use std::fmt::Debug;
use std::sync::Arc;

/// Index of a field inside its table configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub(crate) usize);

/// How far the data run of a leaf extends from its origin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataLayout {
    /// Exactly n cells, whatever the sheet holds
    Fixed(usize),
    /// Until the next header of the table or the sheet border
    Unfixed,
    /// As unfixed, also stopping before a cell matched by the boundary matcher
    Mixed,
}

/// The data region of a leaf field and the rules its values must satisfy.
#[derive(Clone)]
pub struct DataConfig {
    pub(crate) layout: DataLayout,
    pub(crate) matcher: Option<Arc<Matcher<CellValue>>>,
    pub(crate) boundary: Option<Arc<Matcher<Cell>>>,
    pub(crate) validators: Vec<Arc<dyn Validator<Cell>>>,
}

impl DataConfig {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            matcher: None,
            boundary: None,
            validators: Vec::new(),
        }
    }

    pub fn fixed(count: usize) -> Self {
        Self::new(DataLayout::Fixed(count))
    }

    pub fn unfixed() -> Self {
        Self::new(DataLayout::Unfixed)
    }

    pub fn mixed() -> Self {
        Self::new(DataLayout::Mixed)
    }

    /// Every data value is checked against this matcher. Failures are reported per record
    /// and never stop extraction.
    pub fn matcher(mut self, matcher: Matcher<CellValue>) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Extra stop condition of a mixed run: the run ends before the first matching cell.
    pub fn boundary(mut self, boundary: Matcher<Cell>) -> Self {
        self.boundary = Some(Arc::new(boundary));
        self
    }

    pub fn validator<V: Validator<Cell> + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn layout(&self) -> DataLayout {
        self.layout
    }

    pub fn value_matcher(&self) -> Option<&Matcher<CellValue>> {
        self.matcher.as_deref()
    }

    pub fn boundary_matcher(&self) -> Option<&Matcher<Cell>> {
        self.boundary.as_deref()
    }

    pub fn validators(&self) -> &[Arc<dyn Validator<Cell>>] {
        &self.validators
    }
}

impl Debug for DataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataConfig")
            .field("layout", &self.layout)
            .field("matcher", &self.matcher.is_some())
            .field("boundary", &self.boundary.is_some())
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Describes one header field before it is frozen into a table configuration.
pub struct FieldBuilder {
    pub(crate) name: String,
    pub(crate) matcher: Matcher<Cell>,
    pub(crate) necessity: Necessity,
    pub(crate) role: Role,
    pub(crate) direction: Option<Direction>,
    pub(crate) distance: usize,
    pub(crate) children: Vec<FieldBuilder>,
    pub(crate) data: Option<DataConfig>,
}

impl FieldBuilder {
    fn new(name: &str, matcher: Matcher<Cell>, role: Role) -> Self {
        Self {
            name: name.to_owned(),
            matcher,
            necessity: Necessity::Required,
            role,
            direction: None,
            distance: 1,
            children: Vec::new(),
            data: None,
        }
    }

    /// A field whose header sits above (or beside) a run of data cells.
    pub fn leaf(name: &str, matcher: Matcher<Cell>) -> Self {
        Self::new(name, matcher, Role::Leaf)
    }

    /// A field whose header spans child headers.
    pub fn group(name: &str, matcher: Matcher<Cell>) -> Self {
        Self::new(name, matcher, Role::Group)
    }

    /// Where the data (leaf) or the children (group) lie relative to the header.
    /// Children inherit it unless they set their own.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Steps from the header to the first data cell or child header (default: 1).
    pub fn distance(mut self, distance: usize) -> Self {
        self.distance = distance;
        self
    }

    pub fn necessity(mut self, necessity: Necessity) -> Self {
        self.necessity = necessity;
        self
    }

    pub fn optional(self) -> Self {
        self.necessity(Necessity::Optional)
    }

    pub fn child(mut self, child: FieldBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn data(mut self, data: DataConfig) -> Self {
        self.data = Some(data);
        self
    }
}

/// A frozen field: one node of a table configuration.
#[derive(Debug)]
pub struct FieldConfig {
    pub(crate) id: FieldId,
    pub(crate) name: String,
    /// Dot separated names from the root field
    pub(crate) path: String,
    pub(crate) matcher: Matcher<Cell>,
    pub(crate) necessity: Necessity,
    pub(crate) role: Role,
    /// Resolved direction, inherited from the parent when not set
    pub(crate) direction: Direction,
    pub(crate) distance: usize,
    pub(crate) parent: Option<FieldId>,
    pub(crate) children: Vec<FieldId>,
    pub(crate) data: Option<DataConfig>,
}

impl FieldConfig {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn matcher(&self) -> &Matcher<Cell> {
        &self.matcher
    }

    pub fn necessity(&self) -> Necessity {
        self.necessity
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    pub fn parent(&self) -> Option<FieldId> {
        self.parent
    }

    pub fn children(&self) -> &[FieldId] {
        &self.children
    }

    pub fn data(&self) -> Option<&DataConfig> {
        self.data.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.role == Role::Leaf
    }
}
