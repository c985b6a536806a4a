//! Random-access reader for the biosignal container
//!
//! The reader is generic over any `Read + Seek` source so in-memory buffers
//! and files go through the same code path.

use crate::channel::Channel;
use crate::error::{DecodeError, DecodeResult};
use crate::metadata::{ChannelInfo, EdfHeader, BYTES_PER_SAMPLE};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Open container with a parsed header
#[derive(Debug)]
pub struct EdfReader<R> {
    source: R,
    header: EdfHeader,
}

impl EdfReader<BufReader<File>> {
    /// Open a container file and parse its header
    pub fn open(path: impl AsRef<Path>) -> DecodeResult<Self> {
        let path = path.as_ref();
        tracing::debug!("opening container {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> EdfReader<R> {
    /// Parse the header from the start of `source`
    pub fn from_reader(mut source: R) -> DecodeResult<Self> {
        source.seek(SeekFrom::Start(0))?;
        let header = EdfHeader::parse(&mut source)?;
        Ok(Self { source, header })
    }

    /// Release the underlying source
    pub fn close(self) -> R {
        self.source
    }

    pub fn header(&self) -> &EdfHeader {
        &self.header
    }

    pub fn num_signals(&self) -> usize {
        self.header.num_signals()
    }

    /// Label, unit and physical range of a signal, if it exists
    pub fn channel_info(&self, signal_index: usize) -> Option<ChannelInfo> {
        self.header.signals.get(signal_index).map(|s| s.info())
    }

    /// Samples per second for a signal, or 0 for an unknown index
    pub fn sampling_rate(&self, signal_index: usize) -> f64 {
        self.header.sampling_rate(signal_index)
    }

    /// Digital code to physical units; an unknown index yields 0
    pub fn to_physical(&self, signal_index: usize, digital: i16) -> f64 {
        self.header
            .signals
            .get(signal_index)
            .map_or(0.0, |s| s.to_physical(digital))
    }

    /// Read one signal's digital codes from consecutive data records.
    ///
    /// `num_records` is clamped so the read stops at the last record.
    pub fn read_signal_samples(
        &mut self,
        signal_index: usize,
        start_record: usize,
        num_records: usize,
    ) -> DecodeResult<Vec<i16>> {
        let num_signals = self.header.num_signals();
        let data_records = self.header.data_records;

        if signal_index >= num_signals {
            return Err(DecodeError::out_of_range("signal index", signal_index, num_signals));
        }
        if start_record >= data_records {
            return Err(DecodeError::out_of_range("start record", start_record, data_records));
        }
        if num_records == 0 {
            return Err(DecodeError::out_of_range("record count", 0, data_records - start_record));
        }
        let num_records = num_records.min(data_records - start_record);

        let record_size = self.header.record_size();
        let signal_offset = self.header.signal_offset(signal_index);
        let samples_per_record = self.header.signals[signal_index].samples_per_record;

        let mut buf = vec![0u8; samples_per_record * BYTES_PER_SAMPLE];
        let mut samples = Vec::new();

        for record in start_record..start_record + num_records {
            let position = self
                .header
                .header_bytes
                .saturating_add((record as u64).saturating_mul(record_size))
                .saturating_add(signal_offset);
            self.source.seek(SeekFrom::Start(position))?;
            self.source.read_exact(&mut buf)?;

            samples.extend(
                buf.chunks_exact(BYTES_PER_SAMPLE)
                    .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
            );
        }

        Ok(samples)
    }

    /// Replace a channel's raw series with the whole signal in physical units.
    ///
    /// The channel is cleared before reading, so on error it is left empty and
    /// the error is handed back for the caller to decide whether to continue.
    pub fn load_into_channel(&mut self, signal_index: usize, channel: &mut Channel) -> DecodeResult<()> {
        channel.clear_data();

        let digital = self.read_signal_samples(signal_index, 0, self.header.data_records)?;

        let signal = &self.header.signals[signal_index];
        let time_step = self.header.record_duration / signal.samples_per_record as f64;

        channel.raw.reserve(digital.len());
        for (i, code) in digital.into_iter().enumerate() {
            let value = channel.clip_to_y_range(signal.to_physical(code));
            channel.push_sample(i as f64 * time_step, value);
        }

        tracing::debug!(
            signal = signal_index,
            samples = channel.len(),
            "loaded signal into channel {}",
            channel.id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;
    use crate::writer::{EdfWriter, SignalSpec};
    use std::io::Cursor;

    fn two_signal_container() -> Vec<u8> {
        let mut writer = EdfWriter::new(1.0);
        writer.add_signal(SignalSpec::new("ECG", 4, -1.0, 1.0)).unwrap();
        writer.add_signal(SignalSpec::new("Resp", 2, 0.0, 10.0)).unwrap();
        writer.push_record(vec![vec![1, 2, 3, 4], vec![100, 200]]).unwrap();
        writer.push_record(vec![vec![5, 6, 7, 8], vec![300, 400]]).unwrap();
        writer.push_record(vec![vec![9, 10, 11, 12], vec![500, 600]]).unwrap();
        writer.to_bytes().unwrap()
    }

    fn open(bytes: Vec<u8>) -> EdfReader<Cursor<Vec<u8>>> {
        EdfReader::from_reader(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_header_metadata() {
        let reader = open(two_signal_container());
        let header = reader.header();

        assert_eq!(header.num_signals(), 2);
        assert_eq!(header.data_records, 3);
        assert_eq!(header.header_bytes, 768);
        assert_eq!(header.signals[0].label, "ECG");
        assert_eq!(header.signals[1].samples_per_record, 2);
        assert_eq!(reader.sampling_rate(0), 4.0);
        assert_eq!(reader.sampling_rate(5), 0.0);

        let info = reader.channel_info(1).unwrap();
        assert_eq!(info.label, "Resp");
        assert_eq!((info.physical_min, info.physical_max), (0.0, 10.0));
        assert!(reader.channel_info(2).is_none());
    }

    #[test]
    fn test_read_interleaved_records() {
        let mut reader = open(two_signal_container());

        assert_eq!(
            reader.read_signal_samples(0, 0, 3).unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
        );
        assert_eq!(reader.read_signal_samples(1, 1, 1).unwrap(), vec![300, 400]);
    }

    #[test]
    fn test_record_count_is_clamped() {
        let mut reader = open(two_signal_container());
        assert_eq!(reader.read_signal_samples(1, 1, 50).unwrap(), vec![300, 400, 500, 600]);
    }

    #[test]
    fn test_out_of_range_requests() {
        let mut reader = open(two_signal_container());

        let cases = [(2, 0, 1), (usize::MAX, 0, 1), (0, 3, 1), (0, 0, 0)];
        for (signal, start, count) in cases {
            let err = reader.read_signal_samples(signal, start, count).unwrap_err();
            assert_eq!(err.kind(), DecodeErrorKind::OutOfRange, "case {:?}", (signal, start, count));
        }
    }

    #[test]
    fn test_truncated_record_area_is_io_error() {
        let mut bytes = two_signal_container();
        bytes.truncate(bytes.len() - 3);
        let mut reader = open(bytes);

        let err = reader.read_signal_samples(1, 0, 3).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Io);
    }

    #[test]
    fn test_to_physical_unknown_signal() {
        let reader = open(two_signal_container());
        assert_eq!(reader.to_physical(9, 1000), 0.0);
    }

    #[test]
    fn test_load_into_channel() {
        let mut reader = open(two_signal_container());
        let mut channel = Channel::new("2", "Resp");
        channel.set_y_range(0.0, 10.0);

        reader.load_into_channel(1, &mut channel).unwrap();

        assert_eq!(channel.len(), 6);
        assert_eq!(channel.raw[0].time, 0.0);
        assert_eq!(channel.raw[1].time, 0.5);
        assert_eq!(channel.raw[5].time, 2.5);
        assert!(channel.is_time_ordered());
        for (sample, code) in channel.raw.iter().zip([100i16, 200, 300, 400, 500, 600]) {
            assert_eq!(sample.value, reader.to_physical(1, code));
        }
    }

    #[test]
    fn test_load_clips_to_y_range() {
        let mut reader = open(two_signal_container());
        let mut channel = Channel::new("2", "Resp");
        // Codes 100..600 decode to roughly 5.02..5.09
        channel.set_y_range(0.0, 5.05);

        reader.load_into_channel(1, &mut channel).unwrap();

        assert_eq!(channel.len(), 6);
        assert_eq!(channel.raw[0].value, reader.to_physical(1, 100));
        assert!(channel.raw.iter().all(|s| s.value <= 5.05));
        assert_eq!(channel.raw[5].value, 5.05);
    }

    #[test]
    fn test_failed_load_leaves_channel_cleared() {
        let mut bytes = two_signal_container();
        bytes.truncate(bytes.len() - 3);
        let mut reader = open(bytes);

        let mut channel = Channel::new("1", "ECG");
        channel.push_sample(0.0, 42.0);
        channel.set_processed(vec![crate::Sample::new(0.0, 1.0)]);

        assert!(reader.load_into_channel(1, &mut channel).is_err());
        assert!(channel.raw.is_empty());
        assert!(channel.processed.is_empty());
    }

    #[test]
    fn test_malformed_header_field() {
        let mut bytes = two_signal_container();
        // data records field lives at offset 236
        bytes[236..244].copy_from_slice(b"abc     ");
        let err = EdfReader::from_reader(Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Malformed);
    }

    #[test]
    fn test_bad_start_time_is_not_fatal() {
        let mut bytes = two_signal_container();
        bytes[168..176].copy_from_slice(b"xx.yy.zz");
        assert!(EdfReader::from_reader(Cursor::new(bytes)).is_ok());
    }

    #[test]
    fn test_truncated_header_is_io_error() {
        let mut bytes = two_signal_container();
        bytes.truncate(300);
        let err = EdfReader::from_reader(Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Io);
    }

    #[test]
    fn test_open_missing_file() {
        let err = EdfReader::open("/nonexistent/recording.edf").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Io);
    }
}
