use thiserror::Error;

/// Failures that abort a render. The drawing surface is unusable afterwards.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(
        "Values cannot be negative: `{bars}` is {size} for category `{stacks}`{}",
        .series.as_deref().map(|s| format!(" in series `{}`", s)).unwrap_or_default()
    )]
    NegativeValue {
        series: Option<String>,
        stacks: String,
        bars: String,
        size: f64,
    },

    #[error(
        "Padding is too high, decrease it in the panel \"chart\" > \"Padding\" \
         ({padding}px x {categories} categories exceeds the {available}px available)"
    )]
    PaddingTooLarge {
        padding: f64,
        categories: usize,
        available: f64,
    },

    #[error("Drawing backend error: {0}")]
    Drawing(String),

    #[error("Failed to encode PNG: {0}")]
    Encoding(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_value_message_names_series() {
        let err = RenderError::NegativeValue {
            series: Some("x".to_string()),
            stacks: "A".to_string(),
            bars: "v".to_string(),
            size: -2.0,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Values cannot be negative"));
        assert!(msg.contains("series `x`"));
    }

    #[test]
    fn test_negative_value_message_without_series() {
        let err = RenderError::NegativeValue {
            series: None,
            stacks: "A".to_string(),
            bars: "v".to_string(),
            size: -1.0,
        };
        assert!(!err.to_string().contains("series"));
    }

    #[test]
    fn test_padding_message() {
        let err = RenderError::PaddingTooLarge {
            padding: 10.0,
            categories: 40,
            available: 300.0,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Padding is too high"));
        assert!(msg.contains("40 categories"));
    }
}
