use super::{age, gender, labelled_number, numeric, yes_no};
use crate::models::field::UnitConversion;
use crate::models::profile::ProfileDef;

const GLUCOSE_UNIT: &str = r"mg/dL|mmol/L";

pub(super) fn definition() -> ProfileDef {
    ProfileDef {
        name: "diabetes".to_string(),
        min_matched_columns: 5,
        fields: vec![
            age(),
            gender(),
            numeric(
                "bmi",
                &["bmi", "body mass index"],
                labelled_number(r"BMI|body\s+mass\s+index", Some(r"kg/m2|kg/m²")),
                10.0,
                50.0,
                22.0,
            ),
            // A `prefix` match belongs to the fasting or post-meal field.
            numeric(
                "glucose",
                &["glucose", "glucose level", "blood glucose", "random glucose"],
                format!(
                    r"\b(?P<prefix>fasting\s+|post[\s-]?meal\s+|post[\s-]?prandial\s+)?(?P<label>(?:random\s+|blood\s+)?glucose(?:\s+level)?)\W*{}\s*(?P<unit>{})?",
                    super::NUMBER,
                    GLUCOSE_UNIT
                ),
                50.0,
                600.0,
                90.0,
            )
            .with_conversion(UnitConversion::glucose()),
            numeric(
                "hba1c",
                &["hba1c", "a1c", "glycated hemoglobin"],
                labelled_number(r"HbA1c|A1c|glycated\s+ha?emoglobin", Some("%")),
                4.0,
                15.0,
                5.0,
            ),
            numeric(
                "fasting",
                &["fasting", "fasting blood sugar", "fasting glucose", "fbs"],
                labelled_number(
                    r"fasting\s+(?:blood\s+)?(?:sugar|glucose)|FBS",
                    Some(GLUCOSE_UNIT),
                ),
                50.0,
                600.0,
                90.0,
            )
            .with_conversion(UnitConversion::glucose()),
            numeric(
                "post_meal",
                &[
                    "post_meal",
                    "post meal",
                    "post-meal blood sugar",
                    "postprandial glucose",
                    "ppbs",
                ],
                labelled_number(
                    r"post[\s-]?meal\s+(?:blood\s+)?(?:sugar|glucose)|post[\s-]?prandial(?:\s+(?:blood\s+)?(?:sugar|glucose))?|PPBS",
                    Some(GLUCOSE_UNIT),
                ),
                50.0,
                600.0,
                120.0,
            )
            .with_conversion(UnitConversion::glucose()),
            yes_no(
                "family_history",
                &["family_history", "family history", "family history of diabetes"],
                r"family\s+history(?:\s+of\s+diabetes)?",
            ),
        ],
        derived: vec![],
    }
}
