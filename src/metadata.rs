use serde::Serialize;

/// Descriptive information a host shows in its chart picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartMetadata {
    pub name: &'static str,
    pub id: &'static str,
    pub categories: &'static [&'static str],
    pub description: &'static str,
    pub code: &'static str,
}

pub const METADATA: ChartMetadata = ChartMetadata {
    name: "Radial column chart",
    id: "rawgraphs.radial-columnchart",
    categories: &["correlations", "proportions"],
    description: "It displays multiple quantitative dimensions related to categories in a circle. \
                  Variant of a stacked bar chart",
    code: "https://github.com/allardw/rawgraphs-radial-columnchart",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_serializes() {
        let json = serde_json::to_value(METADATA).unwrap();
        assert_eq!(json["id"], "rawgraphs.radial-columnchart");
        assert_eq!(json["categories"][1], "proportions");
        assert!(json["description"].as_str().unwrap().ends_with("stacked bar chart"));
    }
}
