use crate::aggregate::Aggregation;
use crate::data::DataKind;
use serde::Serialize;

/// Default aggregator per value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregationDefault {
    pub number: Aggregation,
    pub string: Aggregation,
    pub date: Aggregation,
}

impl AggregationDefault {
    pub fn for_kind(&self, kind: DataKind) -> Aggregation {
        match kind {
            DataKind::Number => self.number,
            DataKind::String => self.string,
            DataKind::Date => self.date,
        }
    }
}

/// A role source columns can be mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub id: &'static str,
    pub name: &'static str,
    pub valid_types: &'static [DataKind],
    pub required: bool,
    pub multiple: bool,
    pub aggregation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_default: Option<AggregationDefault>,
}

pub const STACKS: Dimension = Dimension {
    id: "stacks",
    name: "X Axis",
    valid_types: &[DataKind::Number, DataKind::String, DataKind::Date],
    required: true,
    multiple: false,
    aggregation: false,
    aggregation_default: None,
};

pub const BARS: Dimension = Dimension {
    id: "bars",
    name: "Size",
    valid_types: &[DataKind::Number],
    required: true,
    multiple: true,
    aggregation: true,
    aggregation_default: Some(AggregationDefault {
        number: Aggregation::Sum,
        string: Aggregation::CsvDistinct,
        date: Aggregation::CsvDistinct,
    }),
};

pub const SERIES: Dimension = Dimension {
    id: "series",
    name: "Series",
    valid_types: &[DataKind::Number, DataKind::String, DataKind::Date],
    required: false,
    multiple: false,
    aggregation: false,
    aggregation_default: None,
};

/// All dimensions of the chart, in declaration order.
pub fn dimensions() -> Vec<Dimension> {
    vec![STACKS, BARS, SERIES]
}

pub fn find<'a>(dimensions: &'a [Dimension], id: &str) -> Option<&'a Dimension> {
    dimensions.iter().find(|d| d.id == id)
}
