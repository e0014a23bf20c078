//! # dtc
//!
//! Active diagnostic trouble codes (J1939 DM01).
//!
//! A DM01 frame carries up to five 32-bit trouble codes (`DTC1`..`DTC5`) next to
//! the four lamp states. [`dtc_lamp_series`] follows one SPN/FMI pair through a
//! trace and samples the lamps on every frame that reports it.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::trace::{KeyResolver, TraceAggregator};
use crate::types::{
    errors::DtcError, message::Message, signal::Signal, trace_data::TraceData,
    trace_data::TraceSelection,
};

/// Name of the active trouble codes message.
pub const DM01: &str = "DM01";

const DTC_SIGNALS: [&str; 5] = ["DTC1", "DTC2", "DTC3", "DTC4", "DTC5"];
const LAMP_SIGNALS: [&str; 4] = ["PLStatus", "AWLStatus", "RSLState", "MILStatus"];

/// One 32-bit trouble code (SPN conversion method 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dtc {
    /// Suspect Parameter Number, 19 bits.
    pub spn: u32,
    /// Failure Mode Identifier, 5 bits.
    pub fmi: u8,
    pub occurrence_count: u8,
    pub conversion_method: bool,
}

impl Dtc {
    pub fn from_raw(raw: u32) -> Self {
        Dtc {
            spn: (raw & 0xFFFF) + ((raw & 0x00E0_0000) >> 5),
            fmi: ((raw & 0x001F_0000) >> 16) as u8,
            occurrence_count: ((raw >> 24) & 0x7F) as u8,
            conversion_method: raw & 0x8000_0000 != 0,
        }
    }
}

/// Lamp states of one DM01 frame reporting the code of interest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LampSample {
    pub timestamp: f64,
    pub protect: f64,
    pub amber_warning: f64,
    pub red_stop: f64,
    pub malfunction: f64,
}

fn lookup<'a, const N: usize>(message: &'a Message, names: [&str; N]) -> Result<[&'a Signal; N], DtcError> {
    let found: Vec<Option<&Signal>> = names.iter().map(|name| message.get_signal(name)).collect();
    let missing: Vec<String> = names
        .iter()
        .zip(&found)
        .filter(|(_, signal)| signal.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DtcError::MissingSignals { missing });
    }
    let signals: Vec<&Signal> = found.into_iter().flatten().collect();
    signals
        .try_into()
        .map_err(|_| DtcError::MissingSignals { missing: Vec::new() })
}

/// Collects the lamp states of every frame of `trace` that reports `spn`/`fmi`.
///
/// Slots hold raw codes; a zero slot is empty. A frame too short for a
/// DTC slot or lamp signal is skipped.
///
/// # Errors
/// [`DtcError::MissingSignals`] when `message` lacks any DTC slot or lamp signal.
pub fn dtc_lamp_series(message: &Message, trace: &TraceData, spn: u32, fmi: u8) -> Result<Vec<LampSample>, DtcError> {
    let slots: [&Signal; 5] = lookup(message, DTC_SIGNALS)?;
    let [pl, awl, rsl, mil]: [&Signal; 4] = lookup(message, LAMP_SIGNALS)?;

    let mut samples: Vec<LampSample> = Vec::new();
    for frame in &trace.frames {
        let mut reported = false;
        for slot in slots {
            match codec::extract_raw(&frame.data, slot) {
                Ok(raw) if raw != 0 => {
                    let dtc: Dtc = Dtc::from_raw(raw as u32);
                    reported |= dtc.spn == spn && dtc.fmi == fmi;
                }
                Ok(_) => {}
                Err(err) => debug!("{DM01} t={:.6}: {err}", frame.timestamp),
            }
        }
        if !reported {
            continue;
        }

        let lamps = (pl.decode(&frame.data), awl.decode(&frame.data), rsl.decode(&frame.data), mil.decode(&frame.data));
        match lamps {
            (Ok(protect), Ok(amber_warning), Ok(red_stop), Ok(malfunction)) => samples.push(LampSample {
                timestamp: frame.timestamp,
                protect,
                amber_warning,
                red_stop,
                malfunction,
            }),
            _ => debug!("{DM01} t={:.6}: lamp signals out of frame", frame.timestamp),
        }
    }
    Ok(samples)
}

impl TraceAggregator {
    /// Lamp series of `spn`/`fmi` from the recorded DM01 frames.
    ///
    /// The DM01 trace is selected like [`TraceAggregator::get_trace`] does.
    pub fn active_dtc_lamps(
        &self,
        spn: u32,
        fmi: u8,
        prior: Option<&TraceSelection>,
        resolver: &mut dyn KeyResolver,
    ) -> Result<(TraceData, Vec<LampSample>), DtcError> {
        let message: &Message = self.get_message(DM01).ok_or_else(|| DtcError::NotFound {
            message: DM01.to_string(),
        })?;
        let mut trace: TraceData = self.get_trace(DM01, prior, resolver)?;
        trace.sort_by_time();
        let samples: Vec<LampSample> = dtc_lamp_series(message, &trace, spn, fmi)?;
        Ok((trace, samples))
    }
}
