//! Fixture-driven stand-in for the impulse.
//!
//! The replay engine does no signal processing. It checks the signal
//! length, pulls every sample through the view one frame at a time (so an
//! out-of-range accessor, a cancelled run or a missed deadline aborts it the
//! way it would abort the SDK), and then answers with the next response
//! recorded in its fixture.

use super::{ImpulseEngine, ImpulseStatus};
use crate::error::{HarnessError, SignalError};
use crate::signal::SignalView;
use crate::types::{Classification, ClassificationResult, ImpulseParameters, Timing};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

const BUILTIN_FIXTURE: &str = include_str!("../../fixtures/continuous_motion.json");

/// Impulse parameters plus the answers to give, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFixture {
    pub parameters: ImpulseParameters,
    pub responses: Vec<ReplayResponse>,
}

/// One recorded `run_classifier` outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResponse {
    /// Status code to return; `0` is success
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub timing: Timing,
    /// Scores in label order
    #[serde(default)]
    pub classification: Vec<f32>,
    #[serde(default)]
    pub anomaly: Option<f32>,
}

impl ReplayFixture {
    /// Check that every successful response matches the parameters.
    pub fn validate(&self) -> Result<(), HarnessError> {
        let params = &self.parameters;
        if params.input_frame_size == 0 {
            return Err(HarnessError::InvalidInput(
                "fixture input_frame_size must be greater than zero".to_string(),
            ));
        }
        if params.raw_samples_per_frame == 0 {
            return Err(HarnessError::InvalidInput(
                "fixture raw_samples_per_frame must be greater than zero".to_string(),
            ));
        }
        if self.responses.is_empty() {
            return Err(HarnessError::InvalidInput(
                "fixture has no responses".to_string(),
            ));
        }

        for (ix, response) in self.responses.iter().enumerate() {
            if response.status != 0 {
                continue;
            }
            if response.classification.len() != params.label_count() {
                return Err(HarnessError::InvalidInput(format!(
                    "response {ix} has {} scores but the impulse has {} labels",
                    response.classification.len(),
                    params.label_count()
                )));
            }
            if params.has_anomaly && response.anomaly.is_none() {
                return Err(HarnessError::InvalidInput(format!(
                    "response {ix} has no anomaly score but the impulse has an anomaly block"
                )));
            }
        }
        Ok(())
    }
}

/// Stand-in engine answering from a `ReplayFixture`.
#[derive(Debug)]
pub struct ReplayEngine {
    fixture: ReplayFixture,
    cursor: usize,
    invocations: u64,
    samples_pulled: u64,
    frame: Vec<f32>,
}

impl ReplayEngine {
    pub fn new(fixture: ReplayFixture) -> Result<Self, HarnessError> {
        fixture.validate()?;
        let frame = vec![0.0; fixture.parameters.raw_samples_per_frame];
        Ok(Self {
            fixture,
            cursor: 0,
            invocations: 0,
            samples_pulled: 0,
            frame,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        debug!("Loading replay fixture from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        Self::new(serde_json::from_reader(reader)?)
    }

    /// Engine over the fixture shipped with the crate: a 4-label continuous
    /// motion impulse with an anomaly block, 125 x 3-axis frames.
    pub fn builtin() -> Result<Self, HarnessError> {
        Self::from_json(BUILTIN_FIXTURE)
    }

    /// Number of `run_classifier` calls so far.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Total values read through signal views so far.
    pub fn samples_pulled(&self) -> u64 {
        self.samples_pulled
    }

    fn pull(&mut self, signal: &SignalView<'_>) -> Result<(), SignalError> {
        let total = signal.total_length();
        let mut offset = 0;
        while offset < total {
            let len = self.frame.len().min(total - offset);
            signal.get_data(offset, &mut self.frame[..len])?;
            self.samples_pulled += len as u64;
            offset += len;
        }
        Ok(())
    }
}

impl ImpulseEngine for ReplayEngine {
    fn parameters(&self) -> &ImpulseParameters {
        &self.fixture.parameters
    }

    fn run_classifier(
        &mut self,
        signal: &SignalView<'_>,
        result: &mut ClassificationResult,
        debug: bool,
    ) -> ImpulseStatus {
        self.invocations += 1;

        let expected = self.fixture.parameters.input_frame_size;
        if signal.total_length() != expected {
            warn!(
                "Signal has {} values, impulse expects {}",
                signal.total_length(),
                expected
            );
            return ImpulseStatus::ShapesDontMatch;
        }

        if let Err(e) = self.pull(signal) {
            warn!("Reading signal failed: {}", e);
            return match e {
                SignalError::Cancelled | SignalError::DeadlineExceeded => ImpulseStatus::Canceled,
                SignalError::OutOfRange { .. } => ImpulseStatus::DspError,
            };
        }

        let ix = self.cursor % self.fixture.responses.len();
        self.cursor += 1;
        let response = &self.fixture.responses[ix];
        let params = &self.fixture.parameters;

        if debug {
            debug!(
                "Replaying response {} (status {}) for {} values",
                ix,
                response.status,
                signal.total_length()
            );
        }

        let status = ImpulseStatus::from(response.status);
        if !status.is_ok() {
            return status;
        }

        result.timing = response.timing;
        result.classification.extend(
            params
                .labels
                .iter()
                .zip(&response.classification)
                .map(|(label, value)| Classification {
                    label: label.clone(),
                    value: *value,
                }),
        );
        result.anomaly = if params.has_anomaly {
            response.anomaly
        } else {
            None
        };

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::CancelToken;
    use std::io::Write;

    fn fixture(has_anomaly: bool, responses: Vec<ReplayResponse>) -> ReplayFixture {
        ReplayFixture {
            parameters: ImpulseParameters {
                input_frame_size: 6,
                raw_samples_per_frame: 3,
                labels: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                has_anomaly,
                ..Default::default()
            },
            responses,
        }
    }

    fn ok_response(scores: [f32; 3], anomaly: Option<f32>) -> ReplayResponse {
        ReplayResponse {
            status: 0,
            timing: Timing {
                dsp: 3,
                classification: 2,
                anomaly: 1,
            },
            classification: scores.to_vec(),
            anomaly,
        }
    }

    #[test]
    fn test_builtin_fixture_loads() {
        let engine = ReplayEngine::builtin().unwrap();
        let params = engine.parameters();
        assert_eq!(params.input_frame_size, 375);
        assert_eq!(params.raw_samples_per_frame, 3);
        assert_eq!(params.label_count(), 4);
        assert!(params.has_anomaly);
    }

    #[test]
    fn test_fills_result_and_pulls_every_sample() {
        let mut engine =
            ReplayEngine::new(fixture(true, vec![ok_response([0.1, 0.2, 0.7], Some(0.05))]))
                .unwrap();
        let data = vec![0.5f32; 6];
        let mut result = ClassificationResult::new();

        let status = engine.run_classifier(&SignalView::new(&data), &mut result, false);
        assert_eq!(status, ImpulseStatus::Ok);
        assert_eq!(engine.samples_pulled(), 6);
        assert_eq!(result.timing.dsp, 3);
        assert_eq!(
            result
                .classification
                .iter()
                .map(|c| c.label.as_str())
                .collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(result.anomaly, Some(0.05));
    }

    #[test]
    fn test_responses_cycle_in_order() {
        let responses = vec![
            ok_response([1.0, 0.0, 0.0], None),
            ReplayResponse {
                status: -8,
                timing: Timing::default(),
                classification: vec![],
                anomaly: None,
            },
        ];
        let mut engine = ReplayEngine::new(fixture(false, responses)).unwrap();
        let data = vec![0.0f32; 6];
        let mut result = ClassificationResult::new();

        let statuses: Vec<ImpulseStatus> = (0..4)
            .map(|_| {
                result.reset();
                engine.run_classifier(&SignalView::new(&data), &mut result, true)
            })
            .collect();
        assert_eq!(
            statuses,
            vec![
                ImpulseStatus::Ok,
                ImpulseStatus::AllocFailed,
                ImpulseStatus::Ok,
                ImpulseStatus::AllocFailed
            ]
        );
        assert_eq!(engine.invocations(), 4);
        assert!(result.classification.is_empty());
    }

    #[test]
    fn test_wrong_signal_length_is_shape_mismatch() {
        let mut engine =
            ReplayEngine::new(fixture(false, vec![ok_response([0.3, 0.3, 0.4], None)])).unwrap();
        let data = vec![0.0f32; 5];
        let mut result = ClassificationResult::new();
        let status = engine.run_classifier(&SignalView::new(&data), &mut result, false);
        assert_eq!(status, ImpulseStatus::ShapesDontMatch);
        assert_eq!(engine.samples_pulled(), 0);
    }

    #[test]
    fn test_cancelled_signal_aborts_with_canceled() {
        let mut engine =
            ReplayEngine::new(fixture(false, vec![ok_response([0.3, 0.3, 0.4], None)])).unwrap();
        let data = vec![0.0f32; 6];
        let token = CancelToken::new();
        token.cancel();
        let mut result = ClassificationResult::new();

        let status = engine.run_classifier(
            &SignalView::new(&data).with_cancel(&token),
            &mut result,
            false,
        );
        assert_eq!(status, ImpulseStatus::Canceled);
        assert!(result.classification.is_empty());
    }

    #[test]
    fn test_fixture_validation() {
        let too_few = fixture(false, vec![ok_response([0.3, 0.3, 0.4], None)]);
        let mut broken = too_few.clone();
        broken.responses[0].classification.pop();
        assert!(matches!(
            ReplayEngine::new(broken),
            Err(HarnessError::InvalidInput(_))
        ));

        let missing_anomaly = fixture(true, vec![ok_response([0.3, 0.3, 0.4], None)]);
        assert!(ReplayEngine::new(missing_anomaly).is_err());

        let empty = fixture(false, vec![]);
        assert!(ReplayEngine::new(empty).is_err());
    }

    #[test]
    fn test_from_file() {
        let fixture = fixture(false, vec![ok_response([0.3, 0.3, 0.4], None)]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&fixture).unwrap()).unwrap();

        let engine = ReplayEngine::from_file(file.path()).unwrap();
        assert_eq!(engine.parameters(), &fixture.parameters);
    }

    #[test]
    fn test_from_file_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ReplayEngine::from_file(file.path()),
            Err(HarnessError::Json(_))
        ));
    }
}
