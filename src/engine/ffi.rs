//! FFI engine over a C shim around the Edge Impulse C++ SDK.
//!
//! The SDK's `signal_t` holds a `std::function`, which cannot cross a C
//! boundary. The shim (built together with the SDK into
//! `libei_harness.a`) exposes a plain C signal with an explicit context
//! pointer instead, rebuilds a `signal_t` from it and calls
//! `run_classifier`. Every read the SDK makes goes back through
//! `read_signal` into the `SignalView`, so range checks, cancellation and
//! deadlines apply to the real engine too.

use super::{ImpulseEngine, ImpulseStatus};
use crate::error::HarnessError;
use crate::signal::SignalView;
use crate::types::{Classification, ClassificationResult, ImpulseParameters, Timing};
use std::ffi::{c_char, c_int, c_void, CStr};
use tracing::{debug, warn};

type GetDataFn = unsafe extern "C" fn(*mut c_void, usize, usize, *mut f32) -> c_int;

#[repr(C)]
struct RawSignal {
    total_length: usize,
    get_data: GetDataFn,
    ctx: *mut c_void,
}

#[repr(C)]
#[derive(Default)]
struct RawTiming {
    dsp: c_int,
    classification: c_int,
    anomaly: c_int,
}

extern "C" {
    fn ei_harness_input_frame_size() -> usize;
    fn ei_harness_raw_samples_per_frame() -> usize;
    fn ei_harness_interval_ms() -> f32;
    fn ei_harness_frequency() -> f32;
    fn ei_harness_sensor() -> c_int;
    fn ei_harness_has_anomaly() -> c_int;
    fn ei_harness_label_count() -> usize;
    fn ei_harness_label(ix: usize) -> *const c_char;
    fn ei_harness_run_classifier(
        signal: *const RawSignal,
        timing: *mut RawTiming,
        scores: *mut f32,
        score_capacity: usize,
        anomaly: *mut f32,
        debug: c_int,
    ) -> c_int;
}

unsafe extern "C" fn read_signal(
    ctx: *mut c_void,
    offset: usize,
    length: usize,
    out: *mut f32,
) -> c_int {
    if length == 0 {
        return 0;
    }
    if ctx.is_null() || out.is_null() {
        return -1;
    }

    // SAFETY: ctx is the SignalView borrowed by run_classifier for the whole
    // duration of ei_harness_run_classifier, and the SDK guarantees `out`
    // has room for `length` values.
    let view = unsafe { &*(ctx as *const SignalView<'_>) };
    let out = unsafe { std::slice::from_raw_parts_mut(out, length) };

    match view.get_data(offset, out) {
        Ok(()) => 0,
        Err(e) => {
            warn!("Engine read rejected: {}", e);
            -1
        }
    }
}

/// Engine backed by the impulse compiled into the shim library.
pub struct FfiEngine {
    parameters: ImpulseParameters,
    scores: Vec<f32>,
}

impl FfiEngine {
    pub fn new() -> Result<Self, HarnessError> {
        let parameters = Self::read_parameters()?;
        debug!(
            "Linked impulse: {} inputs, {} labels, anomaly={}",
            parameters.input_frame_size,
            parameters.label_count(),
            parameters.has_anomaly
        );
        let scores = vec![0.0; parameters.label_count()];
        Ok(Self { parameters, scores })
    }

    fn read_parameters() -> Result<ImpulseParameters, HarnessError> {
        // SAFETY: the metadata getters only return compile-time constants
        let label_count = unsafe { ei_harness_label_count() };
        let mut labels = Vec::with_capacity(label_count);
        for ix in 0..label_count {
            let ptr = unsafe { ei_harness_label(ix) };
            if ptr.is_null() {
                return Err(HarnessError::InvalidConfig(format!(
                    "impulse label {ix} is null"
                )));
            }
            // SAFETY: labels are static NUL-terminated strings in the SDK
            labels.push(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned());
        }

        unsafe {
            Ok(ImpulseParameters {
                input_frame_size: ei_harness_input_frame_size(),
                raw_samples_per_frame: ei_harness_raw_samples_per_frame(),
                interval_ms: ei_harness_interval_ms(),
                frequency: ei_harness_frequency(),
                labels,
                has_anomaly: ei_harness_has_anomaly() != 0,
                sensor: ei_harness_sensor(),
            })
        }
    }
}

impl ImpulseEngine for FfiEngine {
    fn parameters(&self) -> &ImpulseParameters {
        &self.parameters
    }

    fn run_classifier(
        &mut self,
        signal: &SignalView<'_>,
        result: &mut ClassificationResult,
        debug: bool,
    ) -> ImpulseStatus {
        let raw = RawSignal {
            total_length: signal.total_length(),
            get_data: read_signal,
            ctx: signal as *const SignalView<'_> as *mut c_void,
        };
        let mut timing = RawTiming::default();
        let mut anomaly = 0.0f32;
        self.scores.fill(0.0);

        // SAFETY: every pointer outlives the call and `scores` holds
        // `score_capacity` values
        let code = unsafe {
            ei_harness_run_classifier(
                &raw,
                &mut timing,
                self.scores.as_mut_ptr(),
                self.scores.len(),
                &mut anomaly,
                c_int::from(debug),
            )
        };

        let status = ImpulseStatus::from(code);
        if !status.is_ok() {
            return status;
        }

        result.timing = Timing {
            dsp: timing.dsp,
            classification: timing.classification,
            anomaly: timing.anomaly,
        };
        result.classification.extend(
            self.parameters
                .labels
                .iter()
                .zip(&self.scores)
                .map(|(label, value)| Classification {
                    label: label.clone(),
                    value: *value,
                }),
        );
        result.anomaly = self.parameters.has_anomaly.then_some(anomaly);

        status
    }
}
