use super::{age, gender, labelled_number, level, numeric, yes_no};
use crate::models::profile::ProfileDef;

pub(super) fn definition() -> ProfileDef {
    ProfileDef {
        name: "fever".to_string(),
        min_matched_columns: 6,
        fields: vec![
            age(),
            gender(),
            numeric(
                "temperature",
                &["temperature", "temp", "body temperature"],
                labelled_number(r"(?:body\s+)?temperature|temp", Some(r"°\s*C|C\b")),
                35.0,
                45.0,
                37.0,
            ),
            yes_no("headache", &["headache"], "headache"),
            yes_no("muscle_pain", &["muscle_pain", "muscle pain", "myalgia"], r"muscle\s+pain|myalgia"),
            yes_no("fatigue", &["fatigue"], "fatigue"),
            yes_no("chills", &["chills"], "chills"),
            level("severity", &["severity", "severity level"], r"severity(?:\s+level)?"),
            level("dehydration", &["dehydration", "dehydration level"], r"dehydration(?:\s+level)?"),
            numeric(
                "duration",
                &["duration", "duration (days)", "days"],
                labelled_number(r"duration", Some("days?")),
                1.0,
                14.0,
                3.0,
            ),
            numeric(
                "heart_rate",
                &["heart_rate", "heart rate", "pulse"],
                labelled_number(r"heart\s+rate|pulse(?:\s+rate)?", Some(r"bpm|/min")),
                40.0,
                200.0,
                80.0,
            ),
        ],
        derived: vec![],
    }
}
