//! Client for a DeepFace compatible `/analyze` HTTP endpoint.

use crate::analysis::{decode_response, Action, FaceAnalysis, FaceAnalyzer};
use crate::error::AnalysisError;
use base64::Engine;
use log::{debug, trace};
use opencv::core::Vector;
use opencv::imgcodecs;
use opencv::prelude::*;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct DeepFaceConfig {
    pub url: String,
    pub detector_backend: String,
    pub enforce_detection: bool,
    pub timeout: Duration,
}

impl Default for DeepFaceConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5005".to_owned(),
            detector_backend: "opencv".to_owned(),
            enforce_detection: false,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    img: String,
    actions: &'a [Action],
    enforce_detection: bool,
    detector_backend: &'a str,
}

pub struct DeepFaceClient {
    config: DeepFaceConfig,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl DeepFaceClient {
    pub fn new(config: DeepFaceConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let endpoint = format!("{}/analyze", config.url.trim_end_matches('/'));
        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// JPEG encodes an image as a `data:` URI.
pub fn encode_data_uri(image: &Mat) -> Result<String, AnalysisError> {
    let mut buffer: Vector<u8> = Default::default();
    imgcodecs::imencode_def(".jpg", image, &mut buffer)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(buffer.to_vec());
    Ok(format!("data:image/jpeg;base64,{encoded}"))
}

impl FaceAnalyzer for DeepFaceClient {
    fn analyze(
        &mut self,
        image: &Mat,
        actions: &[Action],
    ) -> Result<Vec<FaceAnalysis>, AnalysisError> {
        let request = AnalyzeRequest {
            img: encode_data_uri(image)?,
            actions,
            enforce_detection: self.config.enforce_detection,
            detector_backend: &self.config.detector_backend,
        };

        let response = self.client.post(&self.endpoint).json(&request).send()?;
        let status = response.status();
        let body = response.text()?;
        let faces = decode_reply(status, body)?;
        debug!("Analyzer found {} face(s)", faces.len());
        Ok(faces)
    }
}

/// Turns an HTTP reply into faces. Any non-2xx status is a failure.
pub fn decode_reply(status: StatusCode, body: String) -> Result<Vec<FaceAnalysis>, AnalysisError> {
    if !status.is_success() {
        return Err(AnalysisError::Status { status, body });
    }
    trace!("Analyzer response {}", body);
    decode_response(&body)
}
