use crate::config::BatchConfig;
use crate::grading::{classify_score, Grade, GradingScale, ScoreState};
use crate::ranking::{rank_cohort, RankKey};
use crate::remarks::Audience;
use crate::summary::{summarize_batch, ClassSummary};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Round half away from zero to 2 decimals, the way averages are reported.
/// Negative zero comes back as `0.0`.
pub fn round_off_2_decimal(x: f64) -> f64 {
    (x * 100.0).round() / 100.0 + 0.0
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: &str, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    I,
    II,
    III,
    IV,
    U,
    X,
    Ungraded,
}

/// Inclusive aggregate ranges. A sum outside all of them is Ungraded.
const DIVISION_BANDS: [(u32, u32, Division); 5] = [
    (35, 36, Division::U),
    (30, 34, Division::IV),
    (24, 29, Division::III),
    (13, 23, Division::II),
    (4, 12, Division::I),
];

impl Division {
    pub const ALL: [Division; 7] = [
        Division::I,
        Division::II,
        Division::III,
        Division::IV,
        Division::U,
        Division::X,
        Division::Ungraded,
    ];

    pub fn from_aggregate(points: u32) -> Self {
        DIVISION_BANDS
            .iter()
            .find(|(lo, hi, _)| (*lo..=*hi).contains(&points))
            .map(|(_, _, d)| *d)
            .unwrap_or(Division::Ungraded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
    Bot,
    Mot,
    Eot,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScores {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bot: ScoreState,
    #[serde(default)]
    pub mot: ScoreState,
    #[serde(default)]
    pub eot: ScoreState,
}

impl SubjectScores {
    pub fn get(&self, field: ScoreField) -> ScoreState {
        match field {
            ScoreField::Bot => self.bot,
            ScoreField::Mot => self.mot,
            ScoreField::Eot => self.eot,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub student_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lin_no: Option<String>,
    #[serde(default)]
    pub subjects: HashMap<String, SubjectScores>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchMeta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreAggregate {
    pub aggregate_points: u32,
    pub division: Division,
}

/// Sums core-subject points for one score column and classifies the total.
///
/// A core subject counts when its selected score was entered as a number; a
/// number off the 0..=100 scale still counts and earns the N/A points. When no
/// core subject counts the student sat none of the papers: aggregate 0,
/// division X.
pub fn core_aggregate(
    subjects: &HashMap<String, SubjectScores>,
    core_keys: &[String],
    field: ScoreField,
    scale: &GradingScale,
) -> CoreAggregate {
    let mut aggregate_points = 0_u32;
    let mut missing = 0_usize;

    for key in core_keys {
        let score = subjects
            .get(key)
            .map(|s| s.get(field))
            .unwrap_or(ScoreState::NotAvailable);
        if score.value().is_none() {
            missing += 1;
            continue;
        }
        // Caller scales are unbounded; pin at u32::MAX (Ungraded) instead of wrapping.
        aggregate_points = aggregate_points.saturating_add(scale.points(classify_score(score)));
    }

    if missing == core_keys.len() {
        return CoreAggregate {
            aggregate_points: 0,
            division: Division::X,
        };
    }

    CoreAggregate {
        aggregate_points,
        division: Division::from_aggregate(aggregate_points),
    }
}

/// Mean of the entered EOT scores across the expected subjects.
pub fn average_score(subjects: &HashMap<String, SubjectScores>, expected_keys: &[String]) -> f64 {
    let entered: Vec<f64> = expected_keys
        .iter()
        .filter_map(|k| subjects.get(k).and_then(|s| s.eot.value()))
        .collect();
    if entered.is_empty() {
        return 0.0;
    }
    round_off_2_decimal(entered.iter().sum::<f64>() / entered.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
    pub subject: String,
    pub name: String,
    pub bot_score: ScoreState,
    pub bot_grade: Grade,
    pub mot_score: ScoreState,
    pub mot_grade: Grade,
    pub eot_score: ScoreState,
    pub eot_grade: Grade,
    pub eot_remark: String,
    pub eot_points: u32,
}

pub fn subject_performance(
    key: &str,
    scores: Option<&SubjectScores>,
    config: &BatchConfig,
) -> SubjectPerformance {
    let missing = SubjectScores::default();
    let scores = scores.unwrap_or(&missing);
    let eot_grade = classify_score(scores.eot);
    SubjectPerformance {
        subject: key.to_string(),
        name: scores.name.clone().unwrap_or_else(|| key.to_string()),
        bot_score: scores.bot,
        bot_grade: classify_score(scores.bot),
        mot_score: scores.mot,
        mot_grade: classify_score(scores.mot),
        eot_score: scores.eot,
        eot_grade,
        eot_remark: config.subject_remarks.remark_for(scores.eot).to_string(),
        eot_points: config.grading_scale.points(eot_grade),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBatchSummary {
    pub aggregate_points: u32,
    pub division: Division,
    pub average_score: f64,
    pub position_in_class: u32,
    pub total_students_in_class: u32,
    pub class_teacher_remark: String,
    pub head_teacher_remark: String,
}

/// One student's figures before the class has been ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentCalc {
    pub student_id: String,
    pub name: Option<String>,
    pub lin_no: Option<String>,
    pub subjects: Vec<SubjectPerformance>,
    pub bot: CoreAggregate,
    pub mot: CoreAggregate,
    pub eot: CoreAggregate,
    pub average_score: f64,
    pub class_teacher_remark: String,
    pub head_teacher_remark: String,
}

impl StudentCalc {
    pub fn rank_key(&self) -> RankKey {
        RankKey {
            aggregate_points: Some(self.eot.aggregate_points),
            average_score: self.average_score,
        }
    }

    fn into_result(self, position_in_class: u32, total_students_in_class: u32) -> StudentResult {
        StudentResult {
            student_id: self.student_id,
            name: self.name,
            lin_no: self.lin_no,
            subjects: self.subjects,
            bot: self.bot,
            mot: self.mot,
            summary: StudentBatchSummary {
                aggregate_points: self.eot.aggregate_points,
                division: self.eot.division,
                average_score: self.average_score,
                position_in_class,
                total_students_in_class,
                class_teacher_remark: self.class_teacher_remark,
                head_teacher_remark: self.head_teacher_remark,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lin_no: Option<String>,
    pub subjects: Vec<SubjectPerformance>,
    pub bot: CoreAggregate,
    pub mot: CoreAggregate,
    #[serde(flatten)]
    pub summary: StudentBatchSummary,
}

pub fn calculate_student(student: &StudentInput, config: &BatchConfig) -> StudentCalc {
    let subjects = config
        .expected_subjects
        .iter()
        .map(|key| subject_performance(key, student.subjects.get(key), config))
        .collect();

    let aggregate = |field| {
        core_aggregate(
            &student.subjects,
            &config.core_subjects,
            field,
            &config.grading_scale,
        )
    };
    let eot = aggregate(ScoreField::Eot);

    StudentCalc {
        student_id: student.student_id.clone(),
        name: student.name.clone(),
        lin_no: student.lin_no.clone(),
        subjects,
        bot: aggregate(ScoreField::Bot),
        mot: aggregate(ScoreField::Mot),
        eot,
        average_score: average_score(&student.subjects, &config.expected_subjects),
        class_teacher_remark: config
            .remarks(Audience::ClassTeacher)
            .remark_for(eot.division, eot.aggregate_points)
            .to_string(),
        head_teacher_remark: config
            .remarks(Audience::HeadTeacher)
            .remark_for(eot.division, eot.aggregate_points)
            .to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub batch: BatchMeta,
    pub total_students: u32,
    /// Best position first.
    pub students: Vec<StudentResult>,
    pub summary: ClassSummary,
}

/// Student ids must be present and unique within a batch.
pub fn check_students(students: &[StudentInput]) -> Result<(), CalcError> {
    let mut seen = HashSet::new();
    for (i, s) in students.iter().enumerate() {
        if s.student_id.trim().is_empty() {
            return Err(CalcError::new(
                "bad_params",
                format!("students[{}].studentId must not be blank", i),
            ));
        }
        if !seen.insert(s.student_id.as_str()) {
            return Err(CalcError::with_details(
                "bad_params",
                "duplicate studentId in batch",
                serde_json::json!({ "studentId": s.student_id }),
            ));
        }
    }
    Ok(())
}

/// Calculates every student, then ranks the whole class. `config` must
/// already be effective (validated, scale filled in).
pub fn calculate_batch(
    batch: BatchMeta,
    students: &[StudentInput],
    config: &BatchConfig,
) -> BatchOutcome {
    let calcs: Vec<StudentCalc> = students
        .iter()
        .map(|s| calculate_student(s, config))
        .collect();

    let total = calcs.len() as u32;
    let keys: Vec<RankKey> = calcs.iter().map(StudentCalc::rank_key).collect();
    let placements = rank_cohort(&keys);

    let mut slots: Vec<Option<StudentCalc>> = calcs.into_iter().map(Some).collect();
    let ranked: Vec<StudentResult> = placements
        .iter()
        .filter_map(|p| {
            slots[p.index]
                .take()
                .map(|c| c.into_result(p.position, total))
        })
        .collect();

    let summary = summarize_batch(&ranked, &config.core_subjects);
    BatchOutcome {
        batch,
        total_students: total,
        students: ranked,
        summary,
    }
}
