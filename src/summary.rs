use crate::calc::{round_off_2_decimal, Division, StudentResult};
use crate::grading::Grade;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGradeDistribution {
    pub subject: String,
    pub grades: BTreeMap<Grade, u32>,
}

/// Class-level figures for the summary sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub total_students: u32,
    pub class_average: f64,
    pub divisions: BTreeMap<Division, u32>,
    pub core_grades: Vec<SubjectGradeDistribution>,
}

pub fn summarize_batch(students: &[StudentResult], core_keys: &[String]) -> ClassSummary {
    let mut divisions: BTreeMap<Division, u32> = Division::ALL.iter().map(|d| (*d, 0)).collect();
    for s in students {
        *divisions.entry(s.summary.division).or_insert(0) += 1;
    }

    let core_grades = core_keys
        .iter()
        .map(|key| {
            let mut grades: BTreeMap<Grade, u32> = Grade::ALL.iter().map(|g| (*g, 0)).collect();
            for s in students {
                let grade = s
                    .subjects
                    .iter()
                    .find(|p| &p.subject == key)
                    .map(|p| p.eot_grade)
                    .unwrap_or(Grade::NotAvailable);
                *grades.entry(grade).or_insert(0) += 1;
            }
            SubjectGradeDistribution {
                subject: key.clone(),
                grades,
            }
        })
        .collect();

    let class_average = if students.is_empty() {
        0.0
    } else {
        let total: f64 = students.iter().map(|s| s.summary.average_score).sum();
        round_off_2_decimal(total / students.len() as f64)
    };

    ClassSummary {
        total_students: students.len() as u32,
        class_average,
        divisions,
        core_grades,
    }
}
