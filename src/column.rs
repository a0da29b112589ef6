use derive_setters::Setters;
use tracing::warn;

use crate::record::Field;

/// Categories offered by the category select filter.
pub const CATEGORY_OPTIONS: [&str; 4] = ["beauty", "fragrances", "furniture", "groceries"];

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    NoFilter,
    FreeText,
    /// Exact match against one of `options`. The empty value means "All".
    SingleSelect { options: Vec<String> },
}

/// Describes how a record field is presented as a table column.
///
/// Widths are given in terminal cells.
#[derive(Debug, Clone, PartialEq, Setters)]
pub struct ColumnDescriptor {
    #[setters(skip)]
    pub field: Field,
    #[setters(skip)]
    pub label: String,
    #[setters(strip_option)]
    pub width: Option<u16>,
    pub filter: FilterKind,
    pub sortable: bool,
}

impl ColumnDescriptor {
    pub fn new(field: Field, label: impl Into<String>) -> Self {
        ColumnDescriptor {
            field,
            label: label.into(),
            width: None,
            filter: FilterKind::NoFilter,
            sortable: true,
        }
    }

    pub fn is_filterable(&self) -> bool {
        self.filter != FilterKind::NoFilter
    }
}

/// The registered columns of a table. Each field appears at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    pub fn new(columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        let mut registered: Vec<ColumnDescriptor> = Vec::new();
        for column in columns {
            if registered.iter().any(|c| c.field == column.field) {
                warn!("Column {} registered twice, keeping the first one", column.field);
                continue;
            }
            registered.push(column);
        }
        ColumnSet {
            columns: registered,
        }
    }

    /// Column layout of the product table.
    pub fn products() -> Self {
        let categories = CATEGORY_OPTIONS.iter().map(|c| c.to_string()).collect();
        ColumnSet::new([
            ColumnDescriptor::new(Field::Id, "Id").width(5),
            ColumnDescriptor::new(Field::Brand, "Brand")
                .width(15)
                .filter(FilterKind::FreeText),
            ColumnDescriptor::new(Field::Title, "Title")
                .width(20)
                .filter(FilterKind::FreeText),
            ColumnDescriptor::new(Field::Category, "Category")
                .width(10)
                .filter(FilterKind::SingleSelect {
                    options: categories,
                }),
            ColumnDescriptor::new(Field::Rating, "Rating").width(10),
            ColumnDescriptor::new(Field::Price, "Price").width(10),
        ])
    }

    pub fn get(&self, field: Field) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn at(&self, idx: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(idx)
    }

    pub fn filter_kind(&self, field: Field) -> Option<&FilterKind> {
        self.get(field).map(|c| &c.filter)
    }

    pub fn fields(&self) -> Vec<Field> {
        self.columns.iter().map(|c| c.field).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
