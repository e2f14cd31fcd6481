//! Canned clinical interpretation per predicted label.

use serde::{Deserialize, Serialize};

use crate::models::profile::Domain;

/// How the advice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub level: AdviceLevel,
    pub headline: String,
    pub recommendations: Vec<String>,
}

impl Advice {
    fn new(level: AdviceLevel, headline: &str, recommendations: &[&str]) -> Self {
        Self {
            level,
            headline: headline.to_string(),
            recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Interpretation for a predicted label. Labels a domain does not know get
/// that domain's last-resort branch.
pub fn advice_for(domain: Domain, label: &str) -> Advice {
    use AdviceLevel::*;

    match domain {
        Domain::BloodPressure => match label {
            "Normal" => Advice::new(
                Success,
                "Blood pressure within normal range. Maintain healthy habits!",
                &[],
            ),
            "Prehypertension" => Advice::new(
                Warning,
                "Elevated blood pressure.",
                &["Monitor regularly", "Reduce sodium intake", "Increase physical activity"],
            ),
            l if l.contains("Stage 1") => Advice::new(
                Error,
                "Stage 1 Hypertension.",
                &["Consult doctor", "Lifestyle changes", "Possible medication"],
            ),
            _ => Advice::new(
                Error,
                "Stage 2 Hypertension.",
                &[
                    "Immediate medical consultation",
                    "Regular monitoring",
                    "Medication required",
                ],
            ),
        },
        Domain::Diabetes => match label {
            l if l.contains("Non-Diabetic") => Advice::new(
                Success,
                "Healthy parameters.",
                &["Maintain balanced diet", "Regular exercise", "Annual checkups"],
            ),
            l if l.contains("Pre-Diabetes") => Advice::new(
                Warning,
                "Early warning signs.",
                &["Lifestyle modifications", "Monitor glucose levels", "Consult dietitian"],
            ),
            l if l.contains("Type 1") => Advice::new(
                Error,
                "Insulin-dependent diabetes.",
                &["Insulin therapy", "Frequent monitoring", "Endocrinologist consultation"],
            ),
            l if l.contains("Type 2") => Advice::new(
                Error,
                "Metabolic disorder.",
                &["Oral medications", "Dietary changes", "Regular exercise"],
            ),
            _ => Advice::new(
                Warning,
                "Pregnancy-related.",
                &["Close monitoring", "Specialized diet", "Obstetrician coordination"],
            ),
        },
        Domain::Fever => match label {
            "Viral Fever" => Advice::new(
                Info,
                "Typical viral infection.",
                &["Rest and hydration", "Symptomatic treatment", "Monitor for complications"],
            ),
            "Bacterial Fever" => Advice::new(
                Warning,
                "Possible bacterial infection.",
                &[
                    "Consider antibiotic therapy",
                    "Blood culture recommended",
                    "Monitor WBC count",
                ],
            ),
            "Dengue Fever" => Advice::new(
                Error,
                "Suspected dengue infection.",
                &[
                    "Monitor platelet count",
                    "Watch for hemorrhagic signs",
                    "Hospitalization if severe",
                ],
            ),
            _ => Advice::new(
                Error,
                "Malaria suspected.",
                &[
                    "Blood smear for parasites",
                    "Antimalarial treatment",
                    "Monitor for complications",
                ],
            ),
        },
        Domain::Thyroid => match label {
            "Normal" => Advice::new(
                Success,
                "Thyroid function appears within normal parameters.",
                &[],
            ),
            "Hypothyroidism" => Advice::new(
                Warning,
                "Potential underactive thyroid detected.",
                &[
                    "Confirm with TSH and Free T4 tests",
                    "Consider thyroid antibody tests",
                    "Monitor symptoms",
                ],
            ),
            "Hyperthyroidism" => Advice::new(
                Error,
                "Potential overactive thyroid detected.",
                &[
                    "Thyroid ultrasound recommended",
                    "Check thyroid antibodies",
                    "Monitor heart rate",
                ],
            ),
            _ => Advice::new(
                Info,
                "Borderline thyroid function.",
                &[
                    "Repeat tests in 2-4 weeks",
                    "Monitor for symptom changes",
                    "Consider TSH monitoring",
                ],
            ),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    /// 18.5 to 24.9 inclusive.
    Healthy,
    CheckBmi,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Healthy => "Healthy",
            BmiCategory::CheckBmi => "Check BMI",
        }
    }
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if (18.5..=24.9).contains(&bmi) {
        BmiCategory::Healthy
    } else {
        BmiCategory::CheckBmi
    }
}
