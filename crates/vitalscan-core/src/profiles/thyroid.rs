use super::{age, labelled_number, numeric};
use crate::models::profile::ProfileDef;

pub(super) fn definition() -> ProfileDef {
    ProfileDef {
        name: "thyroid".to_string(),
        min_matched_columns: 4,
        fields: vec![
            age(),
            numeric(
                "TSH",
                &["tsh", "thyroid stimulating hormone"],
                labelled_number(
                    r"TSH|thyroid\s+stimulating\s+hormone",
                    Some(r"mIU/L|[uµμ]IU/mL"),
                ),
                0.0,
                100.0,
                2.5,
            ),
            numeric(
                "T3",
                &["t3", "triiodothyronine", "ft3", "free t3"],
                labelled_number(r"(?:F|free\s+)?T3|triiodothyronine", Some(r"pg/mL|ng/dL|nmol/L")),
                0.0,
                20.0,
                3.0,
            ),
            // `\b` after T4 keeps it from claiming T4U.
            numeric(
                "T4",
                &["t4", "thyroxine", "ft4", "free t4"],
                labelled_number(r"(?:F|free\s+)?T4\b|thyroxine", Some(r"[uµμ]g/dL|ng/dL")),
                0.0,
                50.0,
                7.5,
            ),
            numeric(
                "TT4",
                &["tt4", "total t4"],
                labelled_number(r"TT4|total\s+T4", Some(r"[uµμ]g/dL|nmol/L")),
                0.0,
                200.0,
                80.0,
            ),
            numeric(
                "T4U",
                &["t4u", "t4 uptake"],
                labelled_number(r"T4U|T4\s+uptake", Some("%")),
                0.0,
                100.0,
                30.0,
            ),
            numeric(
                "FTI",
                &["fti", "free thyroid index", "free thyroxine index"],
                labelled_number(r"FTI|free\s+thyro(?:id|xine)\s+index", None),
                0.0,
                1000.0,
                300.0,
            ),
        ],
        derived: vec![],
    }
}
