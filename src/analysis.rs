use crate::error::AnalysisError;
use opencv::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attributes an analyzer can be asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Age,
    Gender,
    Emotion,
    Race,
}

pub const OVERLAY_ACTIONS: [Action; 3] = [Action::Age, Action::Gender, Action::Emotion];

/// Face bounding box in the coordinates of the analyzed image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceAnalysis {
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub dominant_emotion: Option<String>,
    pub region: Option<Region>,
    pub face_confidence: Option<f64>,
}

impl FaceAnalysis {
    /// The face that gets drawn when several come back.
    pub fn primary(results: &[FaceAnalysis]) -> Option<&FaceAnalysis> {
        results.first()
    }

    pub fn age_label(&self) -> String {
        self.age
            .map(|age| format!("{}", age.round() as i64))
            .unwrap_or_default()
    }

    pub fn gender_label(&self) -> &str {
        self.gender.as_deref().unwrap_or_default()
    }

    pub fn emotion_label(&self) -> &str {
        self.dominant_emotion.as_deref().unwrap_or_default()
    }
}

/// External face attribute inference.
pub trait FaceAnalyzer {
    /// An empty result means no face was found.
    fn analyze(
        &mut self,
        image: &Mat,
        actions: &[Action],
    ) -> Result<Vec<FaceAnalysis>, AnalysisError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenderField {
    Label(String),
    Scores(BTreeMap<String, f64>),
}

impl GenderField {
    fn dominant(self) -> Option<String> {
        match self {
            GenderField::Label(label) => Some(label),
            GenderField::Scores(scores) => scores
                .into_iter()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(label, _)| label),
        }
    }
}

#[derive(Deserialize)]
struct RawRegion {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

#[derive(Deserialize)]
struct RawFace {
    #[serde(default)]
    age: Option<f64>,
    #[serde(default)]
    gender: Option<GenderField>,
    #[serde(default)]
    dominant_gender: Option<String>,
    #[serde(default)]
    dominant_emotion: Option<String>,
    #[serde(default)]
    region: Option<RawRegion>,
    #[serde(default)]
    face_confidence: Option<f64>,
}

impl From<RawFace> for FaceAnalysis {
    fn from(raw: RawFace) -> Self {
        let gender = raw
            .dominant_gender
            .or_else(|| raw.gender.and_then(GenderField::dominant));
        FaceAnalysis {
            age: raw.age,
            gender,
            dominant_emotion: raw.dominant_emotion,
            region: raw.region.map(|r| Region {
                x: r.x as i32,
                y: r.y as i32,
                w: r.w as i32,
                h: r.h as i32,
            }),
            face_confidence: raw.face_confidence,
        }
    }
}

/// Decodes an analyzer response body. Accepts `{"results": ...}`, a bare
/// list and a single record.
pub fn decode_response(body: &str) -> Result<Vec<FaceAnalysis>, AnalysisError> {
    let mut value: Value = serde_json::from_str(body)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(AnalysisError::Other(error.to_owned()));
    }
    if let Some(results) = value.get_mut("results") {
        value = results.take();
    }

    let faces: Vec<RawFace> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        _ => vec![serde_json::from_value(value)?],
    };
    Ok(faces.into_iter().map(FaceAnalysis::from).collect())
}
