use super::{age, gender, labelled_number, numeric};
use crate::models::profile::{DerivedFeature, ProfileDef};

pub(super) fn definition() -> ProfileDef {
    ProfileDef {
        name: "blood_pressure".to_string(),
        min_matched_columns: 5,
        fields: vec![
            age(),
            gender(),
            numeric(
                "weight",
                &["weight", "weight (kg)", "body weight"],
                labelled_number(r"body\s+weight|weight|wt", Some("kg")),
                30.0,
                300.0,
                70.0,
            ),
            numeric(
                "height",
                &["height", "height (cm)"],
                labelled_number(r"height|ht", Some("cm")),
                100.0,
                250.0,
                170.0,
            ),
            numeric(
                "systolic",
                &["systolic", "systolic bp", "systolic blood pressure", "sbp"],
                labelled_number(
                    r"systolic(?:\s+(?:blood\s+pressure|bp))?|sbp",
                    Some(r"mm\s*Hg"),
                ),
                70.0,
                250.0,
                120.0,
            ),
            numeric(
                "diastolic",
                &["diastolic", "diastolic bp", "diastolic blood pressure", "dbp"],
                labelled_number(
                    r"diastolic(?:\s+(?:blood\s+pressure|bp))?|dbp",
                    Some(r"mm\s*Hg"),
                ),
                40.0,
                150.0,
                80.0,
            ),
            numeric(
                "cholesterol",
                &["cholesterol", "total cholesterol"],
                labelled_number(r"(?:total\s+)?cholesterol", Some(r"mg/dL")),
                100.0,
                600.0,
                200.0,
            ),
            numeric(
                "pulse",
                &["pulse", "pulse rate", "heart rate"],
                labelled_number(r"pulse(?:\s+rate)?|heart\s+rate", Some(r"bpm|/min")),
                40.0,
                200.0,
                72.0,
            ),
        ],
        derived: vec![DerivedFeature::Bmi {
            weight: "weight".to_string(),
            height: "height".to_string(),
            after: "height".to_string(),
        }],
    }
}
