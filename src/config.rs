use crate::calc::CalcError;
use crate::grading::GradingScale;
use crate::remarks::{Audience, RemarkTemplates, SubjectRemarkBands};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Aggregates and divisions are defined over exactly this many core subjects.
pub const CORE_SUBJECT_COUNT: usize = 4;

/// Everything a calculation run needs besides the scores themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchConfig {
    /// Subjects summed into the aggregate, in report order.
    #[serde(default = "default_core_subjects")]
    pub core_subjects: Vec<String>,
    /// Every subject graded and averaged; a superset of `core_subjects`.
    #[serde(default = "default_expected_subjects")]
    pub expected_subjects: Vec<String>,
    #[serde(default)]
    pub grading_scale: GradingScale,
    #[serde(default)]
    pub subject_remarks: SubjectRemarkBands,
    #[serde(default = "RemarkTemplates::class_teacher")]
    pub class_teacher_remarks: RemarkTemplates,
    #[serde(default = "RemarkTemplates::head_teacher")]
    pub head_teacher_remarks: RemarkTemplates,
}

fn default_core_subjects() -> Vec<String> {
    ["ENG", "MTC", "SCI", "SST"].map(String::from).to_vec()
}

fn default_expected_subjects() -> Vec<String> {
    ["ENG", "MTC", "SCI", "SST", "RE"].map(String::from).to_vec()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            core_subjects: default_core_subjects(),
            expected_subjects: default_expected_subjects(),
            grading_scale: GradingScale::default(),
            subject_remarks: SubjectRemarkBands::default(),
            class_teacher_remarks: RemarkTemplates::class_teacher(),
            head_teacher_remarks: RemarkTemplates::head_teacher(),
        }
    }
}

impl BatchConfig {
    pub fn remarks(&self, audience: Audience) -> &RemarkTemplates {
        match audience {
            Audience::ClassTeacher => &self.class_teacher_remarks,
            Audience::HeadTeacher => &self.head_teacher_remarks,
        }
    }

    /// Validates the config and swaps in the canonical grading scale when the
    /// caller left it empty.
    pub fn into_effective(self) -> Result<Self, CalcError> {
        self.validate()?;
        Ok(Self {
            grading_scale: self.grading_scale.or_canonical(),
            ..self
        })
    }

    pub fn validate(&self) -> Result<(), CalcError> {
        if self.core_subjects.len() != CORE_SUBJECT_COUNT {
            return Err(bad_config(
                format!(
                    "coreSubjects must list exactly {} subjects",
                    CORE_SUBJECT_COUNT
                ),
                Some(json!({ "coreSubjects": self.core_subjects })),
            ));
        }
        check_keys("coreSubjects", &self.core_subjects)?;
        check_keys("expectedSubjects", &self.expected_subjects)?;

        let missing: Vec<&String> = self
            .core_subjects
            .iter()
            .filter(|k| !self.expected_subjects.contains(k))
            .collect();
        if !missing.is_empty() {
            return Err(bad_config(
                "every core subject must also be an expected subject",
                Some(json!({ "missing": missing })),
            ));
        }

        let bands = self.subject_remarks.bands();
        if bands.is_empty() {
            return Err(bad_config("subjectRemarks must not be empty", None));
        }
        if let Some(b) = bands
            .iter()
            .find(|b| !(0.0..=100.0).contains(&b.min_score))
        {
            return Err(bad_config(
                "subjectRemarks thresholds must be within 0..=100",
                Some(json!({ "minScore": b.min_score, "remark": b.remark })),
            ));
        }
        Ok(())
    }

    /// Applies a partial update. Only the named top-level fields change; the
    /// result must still validate.
    pub fn merge_patch(&self, patch: &Map<String, Value>) -> Result<Self, CalcError> {
        let mut current = serde_json::to_value(self)
            .map_err(|e| CalcError::new("internal", e.to_string()))?;
        let Some(obj) = current.as_object_mut() else {
            return Err(CalcError::new("internal", "config must serialize to an object"));
        };
        for (k, v) in patch {
            if !obj.contains_key(k) {
                return Err(bad_config(format!("unknown config field: {}", k), None));
            }
            obj.insert(k.clone(), v.clone());
        }
        let merged: BatchConfig = serde_json::from_value(current)
            .map_err(|e| bad_config(format!("invalid config: {}", e), None))?;
        merged.validate()?;
        Ok(merged)
    }
}

fn bad_config(message: impl Into<String>, details: Option<Value>) -> CalcError {
    let mut e = CalcError::new("bad_config", message);
    e.details = details;
    e
}

fn check_keys(field: &str, keys: &[String]) -> Result<(), CalcError> {
    let mut seen = HashSet::new();
    for k in keys {
        if k.trim().is_empty() {
            return Err(bad_config(format!("{} contains a blank subject key", field), None));
        }
        if !seen.insert(k.as_str()) {
            return Err(bad_config(
                format!("{} lists {} more than once", field, k),
                Some(json!({ "subject": k })),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Grade;

    #[test]
    fn default_config_is_valid() {
        let cfg = BatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.core_subjects.len(), CORE_SUBJECT_COUNT);
        assert!(cfg.expected_subjects.contains(&"RE".to_string()));
    }

    #[test]
    fn empty_object_deserializes_to_defaults() {
        let cfg: BatchConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg, BatchConfig::default());
    }

    #[test]
    fn core_subject_count_is_enforced() {
        let cfg = BatchConfig {
            core_subjects: vec!["ENG".into(), "MTC".into(), "SCI".into()],
            ..BatchConfig::default()
        };
        let e = cfg.validate().unwrap_err();
        assert_eq!(e.code, "bad_config");
    }

    #[test]
    fn core_subjects_must_be_expected() {
        let cfg = BatchConfig {
            core_subjects: ["ENG", "MTC", "SCI", "LIT"].map(String::from).to_vec(),
            ..BatchConfig::default()
        };
        let e = cfg.validate().unwrap_err();
        assert_eq!(e.details, Some(json!({ "missing": ["LIT"] })));
    }

    #[test]
    fn duplicate_and_blank_keys_are_rejected() {
        let dup = BatchConfig {
            expected_subjects: ["ENG", "MTC", "SCI", "SST", "ENG"].map(String::from).to_vec(),
            ..BatchConfig::default()
        };
        assert!(dup.validate().is_err());

        let blank = BatchConfig {
            core_subjects: ["ENG", " ", "SCI", "SST"].map(String::from).to_vec(),
            ..BatchConfig::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn remark_thresholds_must_be_on_score_scale() {
        let cfg: Result<BatchConfig, _> = serde_json::from_value(json!({
            "subjectRemarks": [{ "minScore": 120, "remark": "Too high" }]
        }));
        let e = cfg.unwrap().validate().unwrap_err();
        assert!(e.message.contains("0..=100"));

        let empty: BatchConfig = serde_json::from_value(json!({ "subjectRemarks": [] })).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn empty_scale_becomes_canonical_when_effective() {
        let cfg: BatchConfig = serde_json::from_value(json!({ "gradingScale": {} })).unwrap();
        assert!(cfg.grading_scale.is_empty());
        let effective = cfg.into_effective().unwrap();
        assert_eq!(effective.grading_scale, GradingScale::default());
    }

    #[test]
    fn merge_patch_replaces_named_fields_only() {
        let base = BatchConfig::default();
        let patch = json!({ "gradingScale": { "D1": 10, "F9": 90 } });
        let merged = base.merge_patch(patch.as_object().unwrap()).unwrap();
        assert_eq!(merged.grading_scale.points(Grade::D1), 10);
        assert_eq!(merged.core_subjects, base.core_subjects);
        assert_eq!(merged.class_teacher_remarks, base.class_teacher_remarks);
    }

    #[test]
    fn merge_patch_rejects_unknown_and_invalid_fields() {
        let base = BatchConfig::default();
        let unknown = json!({ "passMark": 50 });
        let e = base.merge_patch(unknown.as_object().unwrap()).unwrap_err();
        assert!(e.message.contains("passMark"));

        let wrong_type = json!({ "coreSubjects": "ENG" });
        let e = base.merge_patch(wrong_type.as_object().unwrap()).unwrap_err();
        assert_eq!(e.code, "bad_config");
    }

    #[test]
    fn narrative_templates_are_picked_by_audience() {
        let cfg = BatchConfig::default();
        assert_eq!(
            cfg.remarks(Audience::HeadTeacher),
            &RemarkTemplates::head_teacher()
        );
        assert_eq!(
            cfg.remarks(Audience::ClassTeacher),
            &RemarkTemplates::class_teacher()
        );
    }
}
