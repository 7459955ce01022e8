//! Response-shape normalization for inference endpoints.
//!
//! Hosted models answer the same task in several JSON shapes depending on
//! the provider and model revision. Each known shape is a named extractor;
//! they are tried in order and the first that yields a value wins.

use serde_json::Value;

use super::LabelScore;

/// A named response shape and how to read it
pub struct Shape<T> {
    pub name: &'static str,
    pub extract: fn(&Value) -> Option<T>,
}

/// Zero-shot classification shapes, most specific first
pub static CLASSIFICATION_SHAPES: [Shape<Vec<LabelScore>>; 5] = [
    Shape {
        name: "labels/scores object",
        extract: labels_scores_object,
    },
    Shape {
        name: "list of labels/scores objects",
        extract: list_of_labels_scores,
    },
    Shape {
        name: "list of label/score pairs",
        extract: label_score_pairs,
    },
    Shape {
        name: "nested list of label/score pairs",
        extract: nested_label_score_pairs,
    },
    Shape {
        name: "single label/score",
        extract: single_label_score,
    },
];

/// Summarization shapes
pub static SUMMARY_SHAPES: [Shape<String>; 3] = [
    Shape {
        name: "summary object",
        extract: summary_object,
    },
    Shape {
        name: "list of summary objects",
        extract: list_of_summary_objects,
    },
    Shape {
        name: "bare string",
        extract: bare_string,
    },
];

/// Try each shape in order; returns the shape name with the value
pub fn first_match<T>(shapes: &[Shape<T>], value: &Value) -> Option<(&'static str, T)> {
    shapes
        .iter()
        .find_map(|shape| (shape.extract)(value).map(|v| (shape.name, v)))
}

/// Ranked labels from a classification response, best first.
///
/// Unknown shapes yield an empty list.
pub fn parse_classification(value: &Value) -> Vec<LabelScore> {
    let mut ranked = first_match(&CLASSIFICATION_SHAPES, value)
        .map(|(_, labels)| labels)
        .unwrap_or_default();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Summary text from a summarization response; unknown shapes yield `None`
pub fn parse_summary(value: &Value) -> Option<String> {
    first_match(&SUMMARY_SHAPES, value)
        .map(|(_, text)| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn labels_scores_object(value: &Value) -> Option<Vec<LabelScore>> {
    let labels = value.get("labels")?.as_array()?;
    let scores = value.get("scores")?.as_array()?;
    let pairs: Vec<LabelScore> = labels
        .iter()
        .zip(scores)
        .filter_map(|(label, score)| Some(LabelScore::new(label.as_str()?, score.as_f64()?)))
        .collect();
    non_empty(pairs)
}

fn list_of_labels_scores(value: &Value) -> Option<Vec<LabelScore>> {
    labels_scores_object(value.as_array()?.first()?)
}

fn label_score_pairs(value: &Value) -> Option<Vec<LabelScore>> {
    let pairs: Vec<LabelScore> = value
        .as_array()?
        .iter()
        .filter_map(single_pair)
        .collect();
    non_empty(pairs)
}

fn nested_label_score_pairs(value: &Value) -> Option<Vec<LabelScore>> {
    label_score_pairs(value.as_array()?.first()?)
}

fn single_label_score(value: &Value) -> Option<Vec<LabelScore>> {
    single_pair(value).map(|pair| vec![pair])
}

fn single_pair(value: &Value) -> Option<LabelScore> {
    Some(LabelScore::new(
        value.get("label")?.as_str()?,
        value.get("score")?.as_f64()?,
    ))
}

fn summary_object(value: &Value) -> Option<String> {
    value.get("summary_text")?.as_str().map(str::to_string)
}

fn list_of_summary_objects(value: &Value) -> Option<String> {
    summary_object(value.as_array()?.first()?)
}

fn bare_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labels_scores_object() {
        let value = json!({"sequence": "x", "labels": ["Payment", "Liability"], "scores": [0.2, 0.7]});
        let ranked = parse_classification(&value);
        assert_eq!(ranked[0], LabelScore::new("Liability", 0.7));
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_each_classification_shape() {
        let cases = [
            (json!([{"labels": ["Notice"], "scores": [0.9]}]), "list of labels/scores objects"),
            (json!([{"label": "Notice", "score": 0.9}]), "list of label/score pairs"),
            (json!([[{"label": "Notice", "score": 0.9}]]), "nested list of label/score pairs"),
            (json!({"label": "Notice", "score": 0.9}), "single label/score"),
        ];

        for (value, expected) in cases {
            let (name, labels) = first_match(&CLASSIFICATION_SHAPES, &value).unwrap();
            assert_eq!(name, expected);
            assert_eq!(labels[0].label, "Notice");
        }
    }

    #[test]
    fn test_unknown_classification_shape_is_empty() {
        assert!(parse_classification(&json!({"error": "loading"})).is_empty());
        assert!(parse_classification(&json!([])).is_empty());
        assert!(parse_classification(&json!({"labels": [], "scores": []})).is_empty());
    }

    #[test]
    fn test_summary_shapes() {
        assert_eq!(
            parse_summary(&json!({"summary_text": " Short. "})),
            Some("Short.".to_string())
        );
        assert_eq!(
            parse_summary(&json!([{"summary_text": "Listed."}])),
            Some("Listed.".to_string())
        );
        assert_eq!(parse_summary(&json!("Bare.")), Some("Bare.".to_string()));
        assert_eq!(parse_summary(&json!({"generated": 1})), None);
        assert_eq!(parse_summary(&json!({"summary_text": "  "})), None);
    }
}
