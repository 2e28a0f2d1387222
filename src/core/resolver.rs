// src/core/resolver.rs
use serde::Serialize;
use thiserror::Error;

use crate::core::presenter::field_label;

/// Marker a description uses to request a numeric control.
pub const NUMERIC_MARKER: &str = "(number)";

const DEFAULT_STEP: f64 = 0.1;

/// A fixed option list keyed by field identifier.
struct FixedField {
    field: &'static str,
    prompt: Option<&'static str>,
    options: &'static [&'static str],
}

const YES_NO: &[&str] = &["Yes", "No"];
// Receptor statuses list "No" first.
const RECEPTOR_STATUS: &[&str] = &["No", "Yes"];

/// Consulted before anything else; a hit ignores the description entirely.
static FIXED_FIELDS: &[FixedField] = &[
    FixedField { field: "fuhrman_grade", prompt: Some("Select Fuhrman Grade"), options: &["1", "2", "3", "4"] },
    FixedField { field: "sex", prompt: Some("Select Sex"), options: &["male", "female"] },
    FixedField { field: "surgical_factors", prompt: Some("Select Surgical Factors"), options: YES_NO },
    FixedField { field: "surgical_grade", prompt: Some("Select Surgical Grade"), options: &["1", "2", "3"] },
    FixedField { field: "tnm_n", prompt: Some("Select TNM N Stage"), options: &["N0", "N1", "N2", "N3"] },
    FixedField { field: "tnm_t", prompt: Some("Select TNM T Stage"), options: &["T0", "T1", "T2", "T3", "T4"] },
    FixedField { field: "er_status", prompt: None, options: RECEPTOR_STATUS },
    FixedField { field: "pr_status", prompt: None, options: RECEPTOR_STATUS },
    FixedField { field: "her2_status", prompt: None, options: RECEPTOR_STATUS },
    FixedField { field: "grade", prompt: Some("Select Grade"), options: &["Grade 1", "Grade 2", "Grade 3", "Grade 4"] },
    FixedField {
        field: "gleason",
        prompt: Some("Select Gleason Score"),
        options: &["Grade group 1", "Grade group 2", "Grade group 3", "Grade group 4", "Grade group 5"],
    },
];

/// Identifiers with a fixed option table, in table order.
pub fn fixed_field_ids() -> impl Iterator<Item = &'static str> {
    FIXED_FIELDS.iter().map(|f| f.field)
}

/// Bounds and granularity of a numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: f64,
}

impl NumericBounds {
    fn for_field(field: &str) -> Self {
        match field {
            "age" => Self { min: Some(0.0), max: Some(120.0), step: DEFAULT_STEP },
            "core_ratio" => Self { min: Some(0.0), max: Some(1.0), step: 0.01 },
            "psa" | "cea" => Self { min: Some(0.0), max: None, step: DEFAULT_STEP },
            _ => Self { min: None, max: None, step: DEFAULT_STEP },
        }
    }
}

/// How one field is rendered and what it accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlSpec {
    FixedEnum {
        field: String,
        prompt: String,
        options: Vec<String>,
    },
    NumericRange {
        field: String,
        bounds: NumericBounds,
    },
    DescribedEnum {
        field: String,
        options: Vec<String>,
    },
    FreeText {
        field: String,
    },
}

/// Why a host would refuse a value for a control.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputRejection {
    #[error("{0} is required")]
    Required(String),
    #[error("'{value}' is not one of: {}", .options.join(", "))]
    NotAnOption { value: String, options: Vec<String> },
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("value must be at least {0}")]
    BelowMin(f64),
    #[error("value must be at most {0}")]
    AboveMax(f64),
}

/// Picks the control for a field. First match wins:
/// fixed table, numeric marker, parenthesized option list, free text.
pub fn resolve(field: &str, description: &str) -> ControlSpec {
    if let Some(fixed) = FIXED_FIELDS.iter().find(|f| f.field == field) {
        let prompt = match fixed.prompt {
            Some(p) => p.to_string(),
            None => format!("Select {}", field_label(field)),
        };
        return ControlSpec::FixedEnum {
            field: field.to_string(),
            prompt,
            options: fixed.options.iter().map(|o| o.to_string()).collect(),
        };
    }

    if description.contains(NUMERIC_MARKER) {
        return ControlSpec::NumericRange {
            field: field.to_string(),
            bounds: NumericBounds::for_field(field),
        };
    }

    if let Some(options) = parse_option_list(description) {
        return ControlSpec::DescribedEnum {
            field: field.to_string(),
            options,
        };
    }

    ControlSpec::FreeText {
        field: field.to_string(),
    }
}

/// Tokens of the first non-empty `( ... )` group, split on commas and trimmed.
/// Empty groups `()` are skipped.
pub fn parse_option_list(description: &str) -> Option<Vec<String>> {
    for (open, _) in description.match_indices('(') {
        let rest = &description[open + 1..];
        let close = rest.find(')')?;
        let inner = &rest[..close];
        if !inner.is_empty() {
            return Some(inner.split(',').map(|t| t.trim().to_string()).collect());
        }
    }
    None
}

impl ControlSpec {
    pub fn field(&self) -> &str {
        match self {
            ControlSpec::FixedEnum { field, .. }
            | ControlSpec::NumericRange { field, .. }
            | ControlSpec::DescribedEnum { field, .. }
            | ControlSpec::FreeText { field } => field,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            ControlSpec::FixedEnum { options, .. } | ControlSpec::DescribedEnum { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }

    /// Prompt shown for select-style controls, placeholder for inputs.
    pub fn prompt(&self) -> String {
        match self {
            ControlSpec::FixedEnum { prompt, .. } => prompt.clone(),
            ControlSpec::DescribedEnum { field, .. } => format!("Select {}", field_label(field)),
            ControlSpec::NumericRange { field, .. } | ControlSpec::FreeText { field } => {
                crate::core::presenter::placeholder(field)
            }
        }
    }

    /// Native constraint check: every control is required, enums take only
    /// their options, numerics must parse and sit inside their bounds.
    pub fn check(&self, value: &str) -> Result<(), InputRejection> {
        let value = value.trim();
        if value.is_empty() {
            return Err(InputRejection::Required(field_label(self.field())));
        }
        match self {
            ControlSpec::FixedEnum { options, .. } | ControlSpec::DescribedEnum { options, .. } => {
                if options.iter().any(|o| o == value) {
                    Ok(())
                } else {
                    Err(InputRejection::NotAnOption {
                        value: value.to_string(),
                        options: options.clone(),
                    })
                }
            }
            ControlSpec::NumericRange { bounds, .. } => {
                let number = value
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| InputRejection::NotANumber(value.to_string()))?;
                if let Some(min) = bounds.min {
                    if number < min {
                        return Err(InputRejection::BelowMin(min));
                    }
                }
                if let Some(max) = bounds.max {
                    if number > max {
                        return Err(InputRejection::AboveMax(max));
                    }
                }
                Ok(())
            }
            ControlSpec::FreeText { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fixed_table_ignores_description() {
        for field in fixed_field_ids() {
            let plain = resolve(field, "");
            for description in ["Age (number)", "(A, B, C)", "anything at all"] {
                assert_eq!(resolve(field, description), plain, "field {field}");
            }
            assert!(matches!(plain, ControlSpec::FixedEnum { .. }));
        }
    }

    #[test]
    fn receptor_status_lists_no_first() {
        let spec = resolve("her2_status", "HER2 (Yes, No)");
        assert_eq!(spec.options().unwrap(), strings(&["No", "Yes"]).as_slice());
        assert_eq!(spec.prompt(), "Select Her2 Status");
    }

    #[test]
    fn fuhrman_grade_beats_number_text() {
        let spec = resolve("fuhrman_grade", "Grade (number 1-4)");
        assert_eq!(
            spec,
            ControlSpec::FixedEnum {
                field: "fuhrman_grade".to_string(),
                prompt: "Select Fuhrman Grade".to_string(),
                options: strings(&["1", "2", "3", "4"]),
            }
        );
    }

    #[test]
    fn numeric_bounds_per_field() {
        let bounds = |field: &str| match resolve(field, "Value (number)") {
            ControlSpec::NumericRange { bounds, .. } => bounds,
            other => panic!("expected numeric, got {other:?}"),
        };
        assert_eq!(bounds("age"), NumericBounds { min: Some(0.0), max: Some(120.0), step: 0.1 });
        assert_eq!(bounds("core_ratio"), NumericBounds { min: Some(0.0), max: Some(1.0), step: 0.01 });
        assert_eq!(bounds("psa"), NumericBounds { min: Some(0.0), max: None, step: 0.1 });
        assert_eq!(bounds("cea"), NumericBounds { min: Some(0.0), max: None, step: 0.1 });
        assert_eq!(bounds("tumor_size"), NumericBounds { min: None, max: None, step: 0.1 });
    }

    #[test]
    fn numeric_marker_wins_over_option_list() {
        let spec = resolve("ki67", "Ki-67 index (number) (low, high)");
        assert!(matches!(spec, ControlSpec::NumericRange { .. }));
    }

    #[test]
    fn described_enum_keeps_order_and_trims() {
        let spec = resolve("smoking", "Smoking status ( Never,Former , Current )");
        assert_eq!(
            spec,
            ControlSpec::DescribedEnum {
                field: "smoking".to_string(),
                options: strings(&["Never", "Former", "Current"]),
            }
        );
        assert_eq!(spec.prompt(), "Select Smoking");
    }

    #[test]
    fn only_first_group_is_used() {
        assert_eq!(
            parse_option_list("Side (left, right) or (both)"),
            Some(strings(&["left", "right"]))
        );
        assert_eq!(parse_option_list("no group here"), None);
        assert_eq!(parse_option_list("unclosed (a, b"), None);
        assert_eq!(parse_option_list("empty ()"), None);
    }

    #[test]
    fn empty_group_is_skipped() {
        assert_eq!(
            parse_option_list("Stage () (I, II)"),
            Some(strings(&["I", "II"]))
        );
        assert_eq!(
            resolve("stage", "Stage () (I, II)"),
            ControlSpec::DescribedEnum {
                field: "stage".to_string(),
                options: strings(&["I", "II"]),
            }
        );
    }

    #[test]
    fn falls_back_to_free_text() {
        assert_eq!(
            resolve("histology", "Histological subtype"),
            ControlSpec::FreeText { field: "histology".to_string() }
        );
        assert_eq!(resolve("histology", "").prompt(), "Enter histology");
    }

    #[test]
    fn check_enforces_native_constraints() {
        let age = resolve("age", "Age (number)");
        assert_eq!(age.check("55"), Ok(()));
        assert_eq!(age.check(""), Err(InputRejection::Required("Age".to_string())));
        assert_eq!(age.check("old"), Err(InputRejection::NotANumber("old".to_string())));
        assert_eq!(age.check("-1"), Err(InputRejection::BelowMin(0.0)));
        assert_eq!(age.check("121"), Err(InputRejection::AboveMax(120.0)));

        let sex = resolve("sex", "Sex");
        assert_eq!(sex.check("female"), Ok(()));
        assert!(matches!(sex.check("Female"), Err(InputRejection::NotAnOption { .. })));

        let free = resolve("notes", "Notes");
        assert_eq!(free.check("anything"), Ok(()));
        assert!(free.check("   ").is_err());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(resolve("psa", "PSA (number)")).unwrap();
        assert_eq!(json["kind"], "numeric_range");
        assert_eq!(json["bounds"]["min"], 0.0);
        assert!(json["bounds"]["max"].is_null());
    }
}
