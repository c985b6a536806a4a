//! Container writer producing the same fixed-width layout the reader parses

use crate::channel::Channel;
use crate::error::{EncodeError, EncodeResult};
use crate::metadata::{widths, BYTES_PER_SAMPLE};
use crate::timestamp::format_start_time;
use chrono::{Local, NaiveDateTime};
use std::io::Write;
use std::path::Path;

/// Largest relative error accepted when shortening a number to its field
const MAX_FIELD_ROUNDING: f64 = 1e-3;

/// Declaration of one signal to be written
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSpec {
    pub label: String,
    pub transducer: String,
    pub physical_dim: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i16,
    pub digital_max: i16,
    pub prefiltering: String,
    pub samples_per_record: usize,
}

impl SignalSpec {
    /// Signal using the full int16 code range
    pub fn new(label: &str, samples_per_record: usize, physical_min: f64, physical_max: f64) -> Self {
        Self {
            label: label.to_string(),
            transducer: String::new(),
            physical_dim: String::new(),
            physical_min,
            physical_max,
            digital_min: i16::MIN,
            digital_max: i16::MAX,
            prefiltering: String::new(),
            samples_per_record,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.physical_dim = unit.to_string();
        self
    }

    /// Physical value to the nearest digital code, saturating at the code range
    pub fn to_digital(&self, physical: f64) -> i16 {
        let physical_span = self.physical_max - self.physical_min;
        if physical_span == 0.0 || !physical.is_finite() {
            return self.digital_min;
        }
        let digital_span = f64::from(self.digital_max) - f64::from(self.digital_min);
        let code = f64::from(self.digital_min) + (physical - self.physical_min) * digital_span / physical_span;
        code.round()
            .clamp(f64::from(self.digital_min), f64::from(self.digital_max)) as i16
    }
}

/// In-memory container builder
#[derive(Debug, Clone)]
pub struct EdfWriter {
    pub patient_id: String,
    pub recording_id: String,
    pub start_time: NaiveDateTime,
    record_duration: f64,
    signals: Vec<SignalSpec>,
    records: usize,
    body: Vec<u8>,
}

impl EdfWriter {
    /// Empty container whose data records each span `record_duration` seconds
    pub fn new(record_duration: f64) -> Self {
        Self {
            patient_id: String::new(),
            recording_id: String::new(),
            start_time: Local::now().naive_local(),
            record_duration,
            signals: Vec::new(),
            records: 0,
            body: Vec::new(),
        }
    }

    /// Build a container from channels' raw series.
    ///
    /// Each channel becomes one signal calibrated to its Y-axis range; a
    /// degenerate range falls back to the data's own extent. Short channels are
    /// padded with their last value up to a whole number of records.
    pub fn from_channels(channels: &[&Channel], sampling_rate: f64, record_duration: f64) -> EncodeResult<Self> {
        let samples_per_record = ((sampling_rate * record_duration).round() as usize).max(1);
        let mut writer = Self::new(record_duration);

        for channel in channels {
            let (min, max) = calibration_range(channel);
            writer.add_signal(SignalSpec::new(&channel.name, samples_per_record, min, max))?;
        }

        let longest = channels.iter().map(|c| c.raw.len()).max().unwrap_or(0);
        let records = longest.div_ceil(samples_per_record);

        for record in 0..records {
            let start = record * samples_per_record;
            let chunks = channels
                .iter()
                .zip(&writer.signals)
                .map(|(channel, spec)| {
                    let fill = channel.raw.last().map_or(0.0, |s| s.value);
                    (start..start + samples_per_record)
                        .map(|i| spec.to_digital(channel.raw.get(i).map_or(fill, |s| s.value)))
                        .collect()
                })
                .collect();
            writer.push_record(chunks)?;
        }

        Ok(writer)
    }

    pub fn add_signal(&mut self, spec: SignalSpec) -> EncodeResult<()> {
        if self.records > 0 {
            return Err(EncodeError::SignalsFrozen);
        }
        self.signals.push(spec);
        Ok(())
    }

    pub fn signals(&self) -> &[SignalSpec] {
        &self.signals
    }

    pub fn data_records(&self) -> usize {
        self.records
    }

    /// Append one data record holding one chunk of codes per signal
    pub fn push_record(&mut self, chunks: Vec<Vec<i16>>) -> EncodeResult<()> {
        if chunks.len() != self.signals.len() {
            return Err(EncodeError::SignalCountMismatch {
                expected: self.signals.len(),
                actual: chunks.len(),
            });
        }
        for (signal, (chunk, spec)) in chunks.iter().zip(&self.signals).enumerate() {
            if chunk.len() != spec.samples_per_record {
                return Err(EncodeError::ChunkLengthMismatch {
                    signal,
                    expected: spec.samples_per_record,
                    actual: chunk.len(),
                });
            }
        }

        for code in chunks.iter().flatten() {
            self.body.extend_from_slice(&code.to_le_bytes());
        }
        self.records += 1;
        Ok(())
    }

    /// Declared header size for the current signal count
    pub fn header_bytes(&self) -> usize {
        widths::FIXED_HEADER + widths::PER_SIGNAL * self.signals.len()
    }

    /// Serialise header and records
    pub fn write_to<W: Write>(&self, out: &mut W) -> EncodeResult<()> {
        let mut header = Vec::with_capacity(self.header_bytes());
        let (start_date, start_clock) = format_start_time(&self.start_time);

        put_text(&mut header, "0", widths::VERSION);
        put_text(&mut header, &self.patient_id, widths::PATIENT_ID);
        put_text(&mut header, &self.recording_id, widths::RECORDING_ID);
        put_text(&mut header, &start_date, widths::START_DATE);
        put_text(&mut header, &start_clock, widths::START_TIME);
        put_text(&mut header, &self.header_bytes().to_string(), widths::HEADER_BYTES);
        put_text(&mut header, "", widths::RESERVED);
        put_text(&mut header, &self.records.to_string(), widths::DATA_RECORDS);
        put_number(&mut header, "record duration", self.record_duration, widths::RECORD_DURATION)?;
        put_text(&mut header, &self.signals.len().to_string(), widths::NUM_SIGNALS);

        for s in &self.signals {
            put_text(&mut header, &s.label, widths::LABEL);
        }
        for s in &self.signals {
            put_text(&mut header, &s.transducer, widths::TRANSDUCER);
        }
        for s in &self.signals {
            put_text(&mut header, &s.physical_dim, widths::PHYSICAL_DIM);
        }
        for s in &self.signals {
            put_number(&mut header, "physical minimum", s.physical_min, widths::PHYSICAL_MIN)?;
        }
        for s in &self.signals {
            put_number(&mut header, "physical maximum", s.physical_max, widths::PHYSICAL_MAX)?;
        }
        for s in &self.signals {
            put_text(&mut header, &s.digital_min.to_string(), widths::DIGITAL_MIN);
        }
        for s in &self.signals {
            put_text(&mut header, &s.digital_max.to_string(), widths::DIGITAL_MAX);
        }
        for s in &self.signals {
            put_text(&mut header, &s.prefiltering, widths::PREFILTERING);
        }
        for s in &self.signals {
            put_text(&mut header, &s.samples_per_record.to_string(), widths::SAMPLES_PER_RECORD);
        }
        for _ in &self.signals {
            put_text(&mut header, "", widths::SIGNAL_RESERVED);
        }

        out.write_all(&header)?;
        out.write_all(&self.body)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> EncodeResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.header_bytes() + self.body.len());
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> EncodeResult<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Bytes in one data record
    pub fn record_size(&self) -> usize {
        self.signals
            .iter()
            .map(|s| s.samples_per_record * BYTES_PER_SAMPLE)
            .sum()
    }
}

fn calibration_range(channel: &Channel) -> (f64, f64) {
    if channel.y_axis_max > channel.y_axis_min {
        return (channel.y_axis_min, channel.y_axis_max);
    }
    let min = channel.raw.iter().map(|s| s.value).fold(f64::INFINITY, f64::min);
    let max = channel.raw.iter().map(|s| s.value).fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max > min {
        (min, max)
    } else {
        (-1.0, 1.0)
    }
}

/// Space-padded ASCII field; non-ASCII characters become `?`
fn put_text(buf: &mut Vec<u8>, text: &str, width: usize) {
    let mut field: Vec<u8> = text
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .take(width)
        .collect();
    field.resize(width, b' ');
    buf.extend_from_slice(&field);
}

/// Decimal number shortened until it fits the field
fn put_number(buf: &mut Vec<u8>, field: &'static str, value: f64, width: usize) -> EncodeResult<()> {
    let text = fit_number(value, width).ok_or(EncodeError::FieldOverflow { field, value })?;
    put_text(buf, &text, width);
    Ok(())
}

/// Most precise decimal text of `value` within `width` characters, if it
/// still reads back close to `value`
fn fit_number(value: f64, width: usize) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let text = std::iter::once(format!("{}", value))
        .chain((0..width).rev().map(|precision| format!("{:.*}", precision, value)))
        .find(|text| text.len() <= width)?;

    let parsed = text.parse::<f64>().ok()?;
    ((parsed - value).abs() <= value.abs() * MAX_FIELD_ROUNDING).then_some(text)
}
