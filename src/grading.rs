use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// A raw score as it arrives from data entry.
///
/// Anything that is not a finite number (or a string holding one) collapses to
/// `NotAvailable`. Numbers outside 0..=100 are kept as entered; grading treats
/// them as N/A. `-0` is stored as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum ScoreState {
    #[default]
    NotAvailable,
    Scored(f64),
}

impl ScoreState {
    pub fn from_json(raw: &serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Number(n) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .map(|v| ScoreState::Scored(v + 0.0))
                .unwrap_or(ScoreState::NotAvailable),
            serde_json::Value::String(s) => Self::parse(s),
            _ => ScoreState::NotAvailable,
        }
    }

    pub fn parse(raw: &str) -> Self {
        let t = raw.trim();
        if t.is_empty() || t.eq_ignore_ascii_case("N/A") {
            return ScoreState::NotAvailable;
        }
        match t.parse::<f64>() {
            Ok(v) if v.is_finite() => ScoreState::Scored(v + 0.0),
            _ => ScoreState::NotAvailable,
        }
    }

    /// The raw value if one was entered, in range or not.
    pub fn value(self) -> Option<f64> {
        match self {
            ScoreState::Scored(v) => Some(v),
            ScoreState::NotAvailable => None,
        }
    }

    /// The value only when it lies on the 0..=100 scale.
    pub fn gradable(self) -> Option<f64> {
        self.value().filter(|v| (0.0..=100.0).contains(v))
    }
}

impl From<serde_json::Value> for ScoreState {
    fn from(raw: serde_json::Value) -> Self {
        Self::from_json(&raw)
    }
}

impl Serialize for ScoreState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScoreState::Scored(v) => serializer.serialize_f64(*v),
            ScoreState::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    D1,
    D2,
    C3,
    C4,
    C5,
    C6,
    P7,
    P8,
    F9,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Grade {
    pub const ALL: [Grade; 10] = [
        Grade::D1,
        Grade::D2,
        Grade::C3,
        Grade::C4,
        Grade::C5,
        Grade::C6,
        Grade::P7,
        Grade::P8,
        Grade::F9,
        Grade::NotAvailable,
    ];
}

/// Inclusive lower bounds, highest first. Anything gradable below the last
/// bound is F9.
const GRADE_THRESHOLDS: [(f64, Grade); 8] = [
    (90.0, Grade::D1),
    (80.0, Grade::D2),
    (70.0, Grade::C3),
    (60.0, Grade::C4),
    (55.0, Grade::C5),
    (50.0, Grade::C6),
    (45.0, Grade::P7),
    (40.0, Grade::P8),
];

pub fn classify_score(score: ScoreState) -> Grade {
    let Some(v) = score.gradable() else {
        return Grade::NotAvailable;
    };
    GRADE_THRESHOLDS
        .iter()
        .find(|(min, _)| v >= *min)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F9)
}

/// Points awarded per grade. Lower totals are better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradingScale(BTreeMap<Grade, u32>);

impl GradingScale {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Grades missing from the scale score 0. This includes N/A when the
    /// scale has no explicit entry for it.
    pub fn points(&self, grade: Grade) -> u32 {
        self.0.get(&grade).copied().unwrap_or(0)
    }

    /// The scale to grade with: this one, or the canonical scale when the
    /// caller supplied nothing.
    pub fn or_canonical(self) -> Self {
        if self.is_empty() {
            Self::default()
        } else {
            self
        }
    }
}

impl Default for GradingScale {
    fn default() -> Self {
        Self(
            Grade::ALL
                .iter()
                .enumerate()
                .map(|(i, g)| match g {
                    Grade::NotAvailable => (*g, 0),
                    _ => (*g, i as u32 + 1),
                })
                .collect(),
        )
    }
}
