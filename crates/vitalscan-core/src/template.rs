//! Example CSV uploads, one per profile.

use csv::Writer;

use crate::error::Result;
use crate::models::profile::DomainProfile;

/// A CSV with the canonical column headers and one row of defaults.
pub fn csv_template(profile: &DomainProfile) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());

    writer.write_record(profile.fields().iter().map(|f| f.name.as_str()))?;
    writer.write_record(profile.fields().iter().map(|f| f.default.to_string()))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::VitalError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_table, ExtractionStatus};
    use crate::models::profile::Domain;
    use crate::profiles::builtin;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_thyroid_template() {
        let csv = csv_template(builtin(Domain::Thyroid)).unwrap();
        assert_eq!(csv, "age,TSH,T3,T4,TT4,T4U,FTI\n30,2.5,3,7.5,80,30,300\n");
    }

    #[test]
    fn test_templates_extract_every_field() {
        for domain in Domain::ALL {
            let profile = builtin(domain);
            let csv = csv_template(profile).unwrap();
            let report = extract_table(csv.as_bytes(), profile).unwrap();
            assert_eq!(
                report.status,
                ExtractionStatus::Extracted {
                    count: profile.fields().len()
                },
                "{}",
                domain
            );
            for spec in profile.fields() {
                assert_eq!(report.result.get(&spec.name), Some(&spec.default));
            }
        }
    }
}
