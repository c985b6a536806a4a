//! Container header structures and the fixed-width header parser
//!
//! The header is a run of space-padded ASCII fields. The top-level block is
//! followed by the per-signal block, which is laid out by field kind: every
//! signal's label, then every signal's transducer, and so on. The parse
//! below walks that layout one typed step at a time so each byte offset can
//! be checked against the widths listed here.

use crate::error::{DecodeError, DecodeResult};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Read;

/// Byte widths of the top-level header fields
pub mod widths {
    pub const VERSION: usize = 8;
    pub const PATIENT_ID: usize = 80;
    pub const RECORDING_ID: usize = 80;
    pub const START_DATE: usize = 8;
    pub const START_TIME: usize = 8;
    pub const HEADER_BYTES: usize = 8;
    pub const RESERVED: usize = 44;
    pub const DATA_RECORDS: usize = 8;
    pub const RECORD_DURATION: usize = 8;
    pub const NUM_SIGNALS: usize = 4;

    pub const LABEL: usize = 16;
    pub const TRANSDUCER: usize = 80;
    pub const PHYSICAL_DIM: usize = 8;
    pub const PHYSICAL_MIN: usize = 8;
    pub const PHYSICAL_MAX: usize = 8;
    pub const DIGITAL_MIN: usize = 8;
    pub const DIGITAL_MAX: usize = 8;
    pub const PREFILTERING: usize = 80;
    pub const SAMPLES_PER_RECORD: usize = 8;
    pub const SIGNAL_RESERVED: usize = 32;

    /// Size of the top-level block
    pub const FIXED_HEADER: usize = VERSION
        + PATIENT_ID
        + RECORDING_ID
        + START_DATE
        + START_TIME
        + HEADER_BYTES
        + RESERVED
        + DATA_RECORDS
        + RECORD_DURATION
        + NUM_SIGNALS;

    /// Size of one signal's share of the per-signal block
    pub const PER_SIGNAL: usize = LABEL
        + TRANSDUCER
        + PHYSICAL_DIM
        + PHYSICAL_MIN
        + PHYSICAL_MAX
        + DIGITAL_MIN
        + DIGITAL_MAX
        + PREFILTERING
        + SAMPLES_PER_RECORD
        + SIGNAL_RESERVED;
}

/// Bytes per stored sample
pub const BYTES_PER_SAMPLE: usize = 2;

/// Container-level metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdfHeader {
    /// Format version tag
    pub version: String,
    /// Patient identification
    pub patient_id: String,
    /// Recording identification
    pub recording_id: String,
    /// Recording start
    pub start_time: NaiveDateTime,
    /// Declared header length in bytes; the record area starts here
    pub header_bytes: u64,
    pub reserved: String,
    /// Number of data records
    pub data_records: usize,
    /// Duration of one data record in seconds
    pub record_duration: f64,
    /// Per-signal metadata, in file order
    pub signals: Vec<SignalHeader>,
}

/// Metadata for one signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalHeader {
    pub label: String,
    pub transducer: String,
    /// Physical unit, e.g. `uV`
    pub physical_dim: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: f64,
    pub digital_max: f64,
    pub prefiltering: String,
    /// Samples of this signal in every data record
    pub samples_per_record: usize,
    pub reserved: String,
}

/// Summary of one signal for callers probing channel metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInfo {
    pub label: String,
    pub physical_dim: String,
    pub physical_min: f64,
    pub physical_max: f64,
}

impl SignalHeader {
    /// Digital code to physical value using this signal's calibration.
    ///
    /// A zero-width digital range cannot be inverted and maps to `physical_min`.
    pub fn to_physical(&self, digital: i16) -> f64 {
        let digital_span = self.digital_max - self.digital_min;
        if digital_span == 0.0 {
            return self.physical_min;
        }
        let scale = (self.physical_max - self.physical_min) / digital_span;
        self.physical_min + (f64::from(digital) - self.digital_min) * scale
    }

    pub fn info(&self) -> ChannelInfo {
        ChannelInfo {
            label: self.label.clone(),
            physical_dim: self.physical_dim.clone(),
            physical_min: self.physical_min,
            physical_max: self.physical_max,
        }
    }
}

impl EdfHeader {
    pub fn num_signals(&self) -> usize {
        self.signals.len()
    }

    /// Header length implied by the signal count
    pub fn expected_header_bytes(&self) -> u64 {
        (widths::FIXED_HEADER + widths::PER_SIGNAL * self.signals.len()) as u64
    }

    /// Byte size of one interleaved data record
    pub fn record_size(&self) -> u64 {
        self.signals
            .iter()
            .map(|s| (s.samples_per_record * BYTES_PER_SAMPLE) as u64)
            .sum()
    }

    /// Byte offset of a signal's chunk within a data record
    pub fn signal_offset(&self, signal_index: usize) -> u64 {
        self.signals
            .iter()
            .take(signal_index)
            .map(|s| (s.samples_per_record * BYTES_PER_SAMPLE) as u64)
            .sum()
    }

    /// Samples per second for a signal, or 0 for an unknown index
    pub fn sampling_rate(&self, signal_index: usize) -> f64 {
        match self.signals.get(signal_index) {
            Some(signal) if self.record_duration != 0.0 => {
                signal.samples_per_record as f64 / self.record_duration
            }
            _ => 0.0,
        }
    }

    /// Total recording length in seconds
    pub fn duration(&self) -> f64 {
        self.data_records as f64 * self.record_duration
    }

    /// Parse the header from the start of a container
    pub fn parse<R: Read>(reader: &mut R) -> DecodeResult<Self> {
        let mut fields = FieldReader { reader };

        let version = fields.text(widths::VERSION)?;
        let patient_id = fields.text(widths::PATIENT_ID)?;
        let recording_id = fields.text(widths::RECORDING_ID)?;
        let start_date = fields.text(widths::START_DATE)?;
        let start_clock = fields.text(widths::START_TIME)?;
        let start_time = crate::timestamp::parse_start_time_or_now(&start_date, &start_clock);
        let header_bytes = fields.count("header bytes", widths::HEADER_BYTES)? as u64;
        let reserved = fields.text(widths::RESERVED)?;
        let data_records = fields.record_count(widths::DATA_RECORDS)?;
        let record_duration = fields.float("record duration", widths::RECORD_DURATION)?;
        let num_signals = fields.count("number of signals", widths::NUM_SIGNALS)?;

        let labels = fields.text_column(num_signals, widths::LABEL)?;
        let transducers = fields.text_column(num_signals, widths::TRANSDUCER)?;
        let physical_dims = fields.text_column(num_signals, widths::PHYSICAL_DIM)?;
        let physical_mins = fields.float_column("physical minimum", num_signals, widths::PHYSICAL_MIN)?;
        let physical_maxs = fields.float_column("physical maximum", num_signals, widths::PHYSICAL_MAX)?;
        let digital_mins = fields.float_column("digital minimum", num_signals, widths::DIGITAL_MIN)?;
        let digital_maxs = fields.float_column("digital maximum", num_signals, widths::DIGITAL_MAX)?;
        let prefilterings = fields.text_column(num_signals, widths::PREFILTERING)?;
        let samples = fields.count_column("samples per record", num_signals, widths::SAMPLES_PER_RECORD)?;
        let signal_reserved = fields.text_column(num_signals, widths::SIGNAL_RESERVED)?;

        let mut signals = Vec::with_capacity(num_signals);
        for i in 0..num_signals {
            signals.push(SignalHeader {
                label: labels[i].clone(),
                transducer: transducers[i].clone(),
                physical_dim: physical_dims[i].clone(),
                physical_min: physical_mins[i],
                physical_max: physical_maxs[i],
                digital_min: digital_mins[i],
                digital_max: digital_maxs[i],
                prefiltering: prefilterings[i].clone(),
                samples_per_record: samples[i],
                reserved: signal_reserved[i].clone(),
            });
        }

        let header = EdfHeader {
            version,
            patient_id,
            recording_id,
            start_time,
            header_bytes,
            reserved,
            data_records,
            record_duration,
            signals,
        };

        tracing::debug!(
            signals = header.num_signals(),
            data_records = header.data_records,
            record_duration = header.record_duration,
            header_bytes = header.header_bytes,
            "parsed container header"
        );
        if header.header_bytes != header.expected_header_bytes() {
            tracing::debug!(
                declared = header.header_bytes,
                expected = header.expected_header_bytes(),
                "declared header length differs from signal count"
            );
        }

        Ok(header)
    }
}

/// Sequential reader of space-padded ASCII fields
struct FieldReader<'a, R: Read> {
    reader: &'a mut R,
}

impl<R: Read> FieldReader<'_, R> {
    fn text(&mut self, width: usize) -> DecodeResult<String> {
        let mut buf = vec![0u8; width];
        self.reader.read_exact(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).trim().to_string())
    }

    fn integer(&mut self, field: &'static str, width: usize) -> DecodeResult<i64> {
        let text = self.text(width)?;
        text.parse::<i64>()
            .map_err(|_| DecodeError::malformed(field, text))
    }

    /// Non-negative integer field
    fn count(&mut self, field: &'static str, width: usize) -> DecodeResult<usize> {
        let value = self.integer(field, width)?;
        usize::try_from(value).map_err(|_| DecodeError::malformed(field, value.to_string()))
    }

    /// Record count; `-1` marks a recording that was never finalised and holds no usable records
    fn record_count(&mut self, width: usize) -> DecodeResult<usize> {
        let value = self.integer("data records", width)?;
        if value < 0 {
            tracing::warn!(value, "negative data record count, treating container as empty");
            return Ok(0);
        }
        usize::try_from(value).map_err(|_| DecodeError::malformed("data records", value.to_string()))
    }

    fn float(&mut self, field: &'static str, width: usize) -> DecodeResult<f64> {
        let text = self.text(width)?;
        text.parse::<f64>()
            .map_err(|_| DecodeError::malformed(field, text))
    }

    fn text_column(&mut self, n: usize, width: usize) -> DecodeResult<Vec<String>> {
        (0..n).map(|_| self.text(width)).collect()
    }

    fn float_column(&mut self, field: &'static str, n: usize, width: usize) -> DecodeResult<Vec<f64>> {
        (0..n).map(|_| self.float(field, width)).collect()
    }

    fn count_column(&mut self, field: &'static str, n: usize, width: usize) -> DecodeResult<Vec<usize>> {
        (0..n).map(|_| self.count(field, width)).collect()
    }
}
