use crate::calc::Division;
use crate::grading::ScoreState;
use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE_REMARK: &str = "N/A";

/// Division I at or below this aggregate gets the top remark.
pub const DIVISION_ONE_BEST_MAX: u32 = 6;
/// Division II aggregates in this range are one step from Division I.
pub const DIVISION_TWO_NEAR_TOP: std::ops::RangeInclusive<u32> = 13..=15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkBand {
    pub min_score: f64,
    pub remark: String,
}

/// Score bands for the per-subject end-of-term remark.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubjectRemarkBands(Vec<RemarkBand>);

impl SubjectRemarkBands {
    /// Bands are kept highest threshold first so the first match wins.
    pub fn new(mut bands: Vec<RemarkBand>) -> Self {
        bands.sort_by(|a, b| b.min_score.total_cmp(&a.min_score));
        Self(bands)
    }

    pub fn bands(&self) -> &[RemarkBand] {
        &self.0
    }

    pub fn remark_for(&self, score: ScoreState) -> &str {
        let Some(v) = score.gradable() else {
            return NOT_AVAILABLE_REMARK;
        };
        self.0
            .iter()
            .find(|b| v >= b.min_score)
            .map(|b| b.remark.as_str())
            .unwrap_or(NOT_AVAILABLE_REMARK)
    }
}

impl Default for SubjectRemarkBands {
    fn default() -> Self {
        let band = |min_score: f64, remark: &str| RemarkBand {
            min_score,
            remark: remark.to_string(),
        };
        Self::new(vec![
            band(90.0, "Excellent"),
            band(80.0, "Very Good"),
            band(70.0, "Good"),
            band(60.0, "Fair"),
            band(50.0, "Tried"),
            band(0.0, "Improve"),
        ])
    }
}

impl<'de> Deserialize<'de> for SubjectRemarkBands {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<RemarkBand>::deserialize(deserializer).map(Self::new)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    ClassTeacher,
    HeadTeacher,
}

/// Narrative wording for one audience. Which entry applies is fixed by
/// division and aggregate; only the text is configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkTemplates {
    pub division_one_best: String,
    pub division_one: String,
    pub division_two_near_top: String,
    pub division_two: String,
    pub division_three: String,
    pub division_four: String,
    pub division_u: String,
    pub missed_exams: String,
    pub fallback: String,
}

impl RemarkTemplates {
    pub fn class_teacher() -> Self {
        Self {
            division_one_best: "Outstanding work. This is your best effort yet, keep it up.".into(),
            division_one: "Excellent results. You worked hard and it shows.".into(),
            division_two_near_top: "Very good effort. You are close to the top, keep pushing."
                .into(),
            division_two: "Good work. Keep improving and you will do even better.".into(),
            division_three: "Fair results. Focus more in class to improve.".into(),
            division_four: "You need to try harder. Ask for help when you need it.".into(),
            division_u: "Please work much harder and seek help from your teachers.".into(),
            missed_exams: "You missed exams. Sit every paper so we can see your progress."
                .into(),
            fallback: "Keep working on every subject to get better results.".into(),
        }
    }

    pub fn head_teacher() -> Self {
        Self {
            division_one_best: "Superb performance. The whole school is proud of you.".into(),
            division_one: "Congratulations on a First Grade. Your hard work is paying off."
                .into(),
            division_two_near_top: "Great result. First Grade is within reach, aim high.".into(),
            division_two: "A good Second Grade. Listen to your teachers to improve further."
                .into(),
            division_three: "A fair result. The school expects more work for a better grade."
                .into(),
            division_four: "You must work harder. The school wants to see you succeed.".into(),
            division_u: "This must improve a lot. Seek help from teachers and parents.".into(),
            missed_exams: "Examinations matter. Do your best in all school work.".into(),
            fallback: "Work hard in all subjects. The school is here to help you.".into(),
        }
    }

    pub fn remark_for(&self, division: Division, aggregate_points: u32) -> &str {
        match division {
            Division::I if aggregate_points <= DIVISION_ONE_BEST_MAX => &self.division_one_best,
            Division::I => &self.division_one,
            Division::II if DIVISION_TWO_NEAR_TOP.contains(&aggregate_points) => {
                &self.division_two_near_top
            }
            Division::II => &self.division_two,
            Division::III => &self.division_three,
            Division::IV => &self.division_four,
            Division::U => &self.division_u,
            Division::X => &self.missed_exams,
            Division::Ungraded => &self.fallback,
        }
    }
}
