use crate::config::field::DataLayout;
use crate::config::field::FieldBuilder;
use crate::config::field::FieldConfig;
use crate::config::field::FieldId;
use crate::config::ConfigError;
use crate::config::Necessity;
use crate::config::Role;
use crate::error::ResultMessage;
use crate::error::RustyTableError;
use crate::geometry::Direction;
use crate::parse::record::Record;
use crate::validator::Validator;
use glob::Pattern;
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

/// A table layout: root fields (the first one anchors each occurrence) and the rules
/// applied to every assembled record.
pub struct TableConfig {
    pub(crate) name: String,
    pub(crate) necessity: Necessity,
    /// Every field of the table, in pre-order
    pub(crate) fields: Vec<FieldConfig>,
    pub(crate) roots: Vec<FieldId>,
    pub(crate) validators: Vec<Arc<dyn Validator<Record>>>,
}

impl TableConfig {
    pub fn builder(name: &str) -> TableConfigBuilder {
        TableConfigBuilder {
            name: name.to_owned(),
            necessity: Necessity::Required,
            fields: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn necessity(&self) -> Necessity {
        self.necessity
    }

    pub fn roots(&self) -> &[FieldId] {
        &self.roots
    }

    /// The root field whose occurrences delimit tables.
    pub fn anchor(&self) -> &FieldConfig {
        self.field(self.roots[0])
    }

    pub fn field(&self, id: FieldId) -> &FieldConfig {
        &self.fields[id.0]
    }

    /// All fields in pre-order.
    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    /// Looks a field up by its dot separated path, e.g. "Person.Name".
    pub fn find(&self, path: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|field| field.path == path)
    }

    /// Leaf fields in pre-order.
    pub fn leaves(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter().filter(|field| field.is_leaf())
    }

    pub fn validators(&self) -> &[Arc<dyn Validator<Record>>] {
        &self.validators
    }
}

impl Debug for TableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableConfig")
            .field("name", &self.name)
            .field("necessity", &self.necessity)
            .field("fields", &self.fields)
            .field("validators", &self.validators.len())
            .finish()
    }
}

pub struct TableConfigBuilder {
    name: String,
    necessity: Necessity,
    fields: Vec<FieldBuilder>,
    validators: Vec<Arc<dyn Validator<Record>>>,
}

impl TableConfigBuilder {
    pub fn necessity(mut self, necessity: Necessity) -> Self {
        self.necessity = necessity;
        self
    }

    pub fn optional(self) -> Self {
        self.necessity(Necessity::Optional)
    }

    /// Adds a root field. The first root anchors the table.
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a cross-field rule run against every record.
    pub fn validator<V: Validator<Record> + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn build(self) -> Result<TableConfig, RustyTableError> {
        let mut table = TableConfig {
            name: self.name,
            necessity: self.necessity,
            fields: Vec::new(),
            roots: Vec::new(),
            validators: self.validators,
        };
        if self.fields.is_empty() {
            return Err(ConfigError::EmptyTable).map_err(RustyTableError::from).with_prefix(&table.name);
        }
        let mut names = HashSet::new();
        for field in self.fields {
            if !names.insert(field.name.clone()) {
                return Err(ConfigError::DuplicateField(field.name)).map_err(RustyTableError::from).with_prefix(&table.name);
            }
            let id = freeze(&mut table.fields, field, None).with_prefix(&table.name)?;
            table.roots.push(id);
        }
        Ok(table)
    }
}

/// Moves a field tree into the arena in pre-order and checks its invariants.
fn freeze(fields: &mut Vec<FieldConfig>, field: FieldBuilder, parent: Option<FieldId>) -> Result<FieldId, RustyTableError> {
    let path = match parent {
        Some(parent) => format!("{}.{}", fields[parent.0].path, field.name),
        None => field.name.clone(),
    };
    check(&field, parent.map(|parent| fields[parent.0].direction)).map_err(RustyTableError::from).with_prefix(&path)?;
    let direction = field
        .direction
        .or(parent.map(|parent| fields[parent.0].direction))
        .ok_or(ConfigError::MissingDirection)?;

    let id = FieldId(fields.len());
    fields.push(FieldConfig {
        id,
        name: field.name,
        path: path.clone(),
        matcher: field.matcher,
        necessity: field.necessity,
        role: field.role,
        direction,
        distance: field.distance,
        parent,
        children: Vec::new(),
        data: field.data,
    });

    let mut names = HashSet::new();
    for child in field.children {
        if !names.insert(child.name.clone()) {
            return Err(ConfigError::DuplicateField(child.name)).map_err(RustyTableError::from).with_prefix(&path);
        }
        let child = freeze(fields, child, Some(id))?;
        fields[id.0].children.push(child);
    }
    Ok(id)
}

fn check(field: &FieldBuilder, inherited: Option<Direction>) -> Result<(), ConfigError> {
    if field.direction.or(inherited).is_none() {
        return Err(ConfigError::MissingDirection);
    }
    if field.distance == 0 {
        return Err(ConfigError::ZeroDistance);
    }
    match field.role {
        Role::Group if field.children.is_empty() => Err(ConfigError::EmptyGroup),
        Role::Group if field.data.is_some() => Err(ConfigError::DataOnGroup),
        Role::Group => Ok(()),
        Role::Leaf if !field.children.is_empty() => Err(ConfigError::ChildrenOnLeaf),
        Role::Leaf => match &field.data {
            None => Err(ConfigError::MissingData),
            Some(data) if data.layout == DataLayout::Fixed(0) => Err(ConfigError::EmptyFixedLayout),
            Some(data) if data.boundary.is_some() && data.layout != DataLayout::Mixed => Err(ConfigError::BoundaryWithoutMixed),
            Some(_) => Ok(()),
        },
    }
}

/// Which sheets to read and which tables to look for in them.
#[derive(Debug)]
pub struct SheetConfig {
    pub(crate) name: String,
    /// Sheet name patterns; every sheet is accepted when absent.
    pub(crate) sheet_name_patterns: Option<Vec<Pattern>>,
    pub(crate) necessity: Necessity,
    pub(crate) tables: Vec<TableConfig>,
}

impl SheetConfig {
    pub fn builder(name: &str) -> SheetConfigBuilder {
        SheetConfigBuilder {
            name: name.to_owned(),
            sheet_name_patterns: Vec::new(),
            necessity: Necessity::Required,
            tables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn necessity(&self) -> Necessity {
        self.necessity
    }

    pub fn tables(&self) -> &[TableConfig] {
        &self.tables
    }

    /// Returns true if no patterns are specified or if the name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }
}

pub struct SheetConfigBuilder {
    name: String,
    sheet_name_patterns: Vec<String>,
    necessity: Necessity,
    tables: Vec<TableConfig>,
}

impl SheetConfigBuilder {
    /// Restricts the config to sheets whose name matches the glob pattern.
    pub fn sheet_name(mut self, pattern: &str) -> Self {
        self.sheet_name_patterns.push(pattern.to_owned());
        self
    }

    pub fn necessity(mut self, necessity: Necessity) -> Self {
        self.necessity = necessity;
        self
    }

    pub fn optional(self) -> Self {
        self.necessity(Necessity::Optional)
    }

    pub fn table(mut self, table: TableConfig) -> Self {
        self.tables.push(table);
        self
    }

    pub fn build(self) -> Result<SheetConfig, RustyTableError> {
        if self.tables.is_empty() {
            return Err(ConfigError::EmptySheet).map_err(RustyTableError::from).with_prefix(&self.name);
        }
        let sheet_name_patterns = if self.sheet_name_patterns.is_empty() {
            None
        } else {
            let patterns = self
                .sheet_name_patterns
                .iter()
                .map(|pattern| Pattern::new(pattern))
                .collect::<Result<Vec<_>, _>>()
                .map_err(RustyTableError::from)
                .with_prefix(&self.name)?;
            Some(patterns)
        };
        Ok(SheetConfig {
            name: self.name,
            sheet_name_patterns,
            necessity: self.necessity,
            tables: self.tables,
        })
    }
}

/// The sheet configs applied to a whole document, in order.
#[derive(Debug, Default)]
pub struct WorkbookConfig {
    pub(crate) sheets: Vec<SheetConfig>,
}

impl WorkbookConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, sheet: SheetConfig) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn sheets(&self) -> &[SheetConfig] {
        &self.sheets
    }
}
