//! Query-shape selection.
//!
//! A request's parameters pick exactly one [`QueryPlan`]: a partition key,
//! an optional sort-key prefix, and an optional filter predicate. The plan
//! renders to a DynamoDB key condition / filter expression pair and can also
//! be evaluated directly against an item.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::contract::Item;
use crate::params::{CastQueryParams, MovieId, ReviewQueryParams, TokenKind};
use crate::tables::{
    TableLayout, ACTOR_NAME, MOVIE_ID, RATING, REVIEWER_NAME, REVIEW_DATE, ROLE_NAME,
};

const PARTITION_NAME: &str = "#pk";
const PARTITION_VALUE: &str = ":pk";
const SORT_NAME: &str = "#sk";
const SORT_VALUE: &str = ":sk";
const FILTER_NAME: &str = "#f";
const FILTER_VALUE: &str = ":f";

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Numeric `attribute >= threshold`.
    AtLeast { attribute: String, threshold: f64 },
    BeginsWith { attribute: String, prefix: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortPrefix {
    pub attribute: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub index_name: Option<String>,
    pub partition_attribute: String,
    pub partition_value: Value,
    pub sort_prefix: Option<SortPrefix>,
    pub filter: Option<Filter>,
}

/// Expression strings and placeholder bindings ready for a Query request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub key_condition_expression: String,
    pub filter_expression: Option<String>,
    pub attribute_names: BTreeMap<String, String>,
    pub attribute_values: BTreeMap<String, Value>,
}

impl QueryPlan {
    pub fn partition(attribute: &str, value: impl Into<Value>) -> Self {
        Self {
            index_name: None,
            partition_attribute: attribute.to_string(),
            partition_value: value.into(),
            sort_prefix: None,
            filter: None,
        }
    }

    pub fn on_index(mut self, index_name: &str) -> Self {
        self.index_name = Some(index_name.to_string());
        self
    }

    pub fn with_sort_prefix(mut self, attribute: &str, prefix: &str) -> Self {
        self.sort_prefix = Some(SortPrefix {
            attribute: attribute.to_string(),
            prefix: prefix.to_string(),
        });
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn render(&self) -> RenderedQuery {
        let mut attribute_names = BTreeMap::new();
        let mut attribute_values = BTreeMap::new();

        attribute_names.insert(PARTITION_NAME.to_string(), self.partition_attribute.clone());
        attribute_values.insert(PARTITION_VALUE.to_string(), self.partition_value.clone());
        let mut key_condition_expression = format!("{PARTITION_NAME} = {PARTITION_VALUE}");

        if let Some(sort) = &self.sort_prefix {
            attribute_names.insert(SORT_NAME.to_string(), sort.attribute.clone());
            attribute_values.insert(SORT_VALUE.to_string(), Value::from(sort.prefix.clone()));
            key_condition_expression
                .push_str(&format!(" AND begins_with({SORT_NAME}, {SORT_VALUE})"));
        }

        let filter_expression = self.filter.as_ref().map(|filter| match filter {
            Filter::AtLeast {
                attribute,
                threshold,
            } => {
                attribute_names.insert(FILTER_NAME.to_string(), attribute.clone());
                attribute_values.insert(FILTER_VALUE.to_string(), number_value(*threshold));
                format!("{FILTER_NAME} >= {FILTER_VALUE}")
            }
            Filter::BeginsWith { attribute, prefix } => {
                attribute_names.insert(FILTER_NAME.to_string(), attribute.clone());
                attribute_values.insert(FILTER_VALUE.to_string(), Value::from(prefix.clone()));
                format!("begins_with({FILTER_NAME}, {FILTER_VALUE})")
            }
        });

        RenderedQuery {
            key_condition_expression,
            filter_expression,
            attribute_names,
            attribute_values,
        }
    }

    /// Evaluates key condition and filter against a single item.
    pub fn matches(&self, item: &Item) -> bool {
        let partition_matches = item
            .get(&self.partition_attribute)
            .is_some_and(|value| values_equal(value, &self.partition_value));
        if !partition_matches {
            return false;
        }

        if let Some(sort) = &self.sort_prefix {
            if !begins_with(item, &sort.attribute, &sort.prefix) {
                return false;
            }
        }

        match &self.filter {
            None => true,
            Some(Filter::AtLeast {
                attribute,
                threshold,
            }) => item
                .get(attribute)
                .and_then(Value::as_f64)
                .is_some_and(|value| value >= *threshold),
            Some(Filter::BeginsWith { attribute, prefix }) => begins_with(item, attribute, prefix),
        }
    }
}

/// The single lookup chosen for a movie's reviews.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewSelector {
    MinRating(f64),
    YearPrefix(String),
    ReviewerPrefix(String),
    DatePrefix(String),
    All,
}

impl ReviewSelector {
    /// Precedence: rating threshold, then the reviewer/year token, then an
    /// explicit date, then the whole partition.
    pub fn select(params: &ReviewQueryParams) -> Self {
        if let Some(threshold) = params.min_rating {
            return Self::MinRating(threshold);
        }
        if let Some(token) = &params.token {
            let kind = params.token_kind.unwrap_or_else(|| TokenKind::infer(token));
            return match kind {
                TokenKind::Year => Self::YearPrefix(token.clone()),
                TokenKind::Reviewer => Self::ReviewerPrefix(token.clone()),
            };
        }
        if let Some(date) = &params.date {
            return Self::DatePrefix(date.clone());
        }
        Self::All
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MinRating(_) => "min_rating",
            Self::YearPrefix(_) => "year_prefix",
            Self::ReviewerPrefix(_) => "reviewer_prefix",
            Self::DatePrefix(_) => "date_prefix",
            Self::All => "all",
        }
    }

    pub fn to_plan(&self, movie_id: MovieId) -> QueryPlan {
        let plan = QueryPlan::partition(MOVIE_ID, movie_id.get());
        match self {
            Self::MinRating(threshold) => plan.with_filter(Filter::AtLeast {
                attribute: RATING.to_string(),
                threshold: *threshold,
            }),
            Self::YearPrefix(prefix) | Self::DatePrefix(prefix) => {
                plan.with_filter(Filter::BeginsWith {
                    attribute: REVIEW_DATE.to_string(),
                    prefix: prefix.clone(),
                })
            }
            Self::ReviewerPrefix(prefix) => plan.with_sort_prefix(REVIEWER_NAME, prefix),
            Self::All => plan,
        }
    }
}

pub fn plan_review_query(params: &ReviewQueryParams) -> (ReviewSelector, QueryPlan) {
    let selector = ReviewSelector::select(params);
    let plan = selector.to_plan(params.movie_id);
    (selector, plan)
}

/// Role name wins over actor name; the role lookup goes through the local
/// secondary index sorted by `roleName`.
pub fn plan_cast_query(params: &CastQueryParams, layout: &TableLayout) -> QueryPlan {
    let plan = QueryPlan::partition(MOVIE_ID, params.movie_id.get());
    if let Some(role) = &params.role_name {
        plan.on_index(&layout.role_index)
            .with_sort_prefix(ROLE_NAME, role)
    } else if let Some(actor) = &params.actor_name {
        plan.with_sort_prefix(ACTOR_NAME, actor)
    } else {
        plan
    }
}

pub fn plan_reviewer_query(reviewer_name: &str, layout: &TableLayout) -> QueryPlan {
    QueryPlan::partition(REVIEWER_NAME, reviewer_name).on_index(&layout.reviewer_index)
}

/// Orders items the way a range query returns them: ascending by sort key,
/// numbers numerically and strings byte-wise.
pub fn compare_by_attribute(left: &Item, right: &Item, attribute: &str) -> Ordering {
    match (left.get(attribute), right.get(attribute)) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.as_bytes().cmp(b.as_bytes()),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn begins_with(item: &Item, attribute: &str, prefix: &str) -> bool {
    item.get(attribute)
        .and_then(Value::as_str)
        .is_some_and(|value| value.starts_with(prefix))
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}
