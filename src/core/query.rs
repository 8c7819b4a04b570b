use crate::domain::model::{Filter, FilterOperator, SortOrder, Sorter};
use crate::firebase::value::to_firestore_value;
use serde_json::{json, Value};

/// Native where-clause operator of the document database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereOp {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    NotIn,
    In,
}

impl WhereOp {
    pub fn native(self) -> &'static str {
        match self {
            WhereOp::LessThan => "LESS_THAN",
            WhereOp::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            WhereOp::GreaterThan => "GREATER_THAN",
            WhereOp::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            WhereOp::Equal => "EQUAL",
            WhereOp::NotEqual => "NOT_EQUAL",
            WhereOp::NotIn => "NOT_IN",
            WhereOp::In => "IN",
        }
    }
}

impl From<FilterOperator> for WhereOp {
    fn from(operator: FilterOperator) -> Self {
        match operator {
            FilterOperator::Lt => WhereOp::LessThan,
            FilterOperator::Lte => WhereOp::LessThanOrEqual,
            FilterOperator::Gt => WhereOp::GreaterThan,
            FilterOperator::Gte => WhereOp::GreaterThanOrEqual,
            FilterOperator::Eq => WhereOp::Equal,
            FilterOperator::Ne => WhereOp::NotEqual,
            FilterOperator::Nin => WhereOp::NotIn,
            FilterOperator::In => WhereOp::In,
        }
    }
}

fn direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASCENDING",
        SortOrder::Desc => "DESCENDING",
    }
}

/// One query over a named collection, built fresh per list call from the
/// generic filter/sort descriptors.
#[derive(Debug, Clone, Default)]
pub struct StructuredQuery {
    collection: String,
    filters: Vec<Filter>,
    sorters: Vec<Sorter>,
}

impl StructuredQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            sorters: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: &[Filter]) -> Self {
        self.filters = filters.to_vec();
        self
    }

    pub fn with_sorters(mut self, sorters: &[Sorter]) -> Self {
        self.sorters = sorters.to_vec();
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Renders the native request body. A single filter becomes a bare
    /// fieldFilter; several are AND-ed under a compositeFilter. Order-by
    /// clauses keep descriptor order, conflicting fields and all.
    pub fn to_body(&self) -> Value {
        let mut query = serde_json::Map::new();
        query.insert(
            "from".to_string(),
            json!([{ "collectionId": self.collection }]),
        );

        if !self.filters.is_empty() {
            let mut clauses: Vec<Value> = self.filters.iter().map(field_filter).collect();
            let where_clause = if clauses.len() == 1 {
                clauses.remove(0)
            } else {
                json!({ "compositeFilter": { "op": "AND", "filters": clauses } })
            };
            query.insert("where".to_string(), where_clause);
        }

        if !self.sorters.is_empty() {
            let order_by: Vec<Value> = self
                .sorters
                .iter()
                .map(|sorter| {
                    json!({
                        "field": { "fieldPath": sorter.field },
                        "direction": direction(sorter.order)
                    })
                })
                .collect();
            query.insert("orderBy".to_string(), json!(order_by));
        }

        json!({ "structuredQuery": query })
    }
}

fn field_filter(filter: &Filter) -> Value {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": filter.field },
            "op": WhereOp::from(filter.operator).native(),
            "value": to_firestore_value(&filter.value)
        }
    })
}
