//! Decoding written containers and inverting the calibration

use biochart_core::{Channel, DecodeErrorKind, EdfReader, EdfWriter, SignalSpec};
use std::io::Cursor;

fn inverse(spec: &SignalSpec, physical: f64) -> f64 {
    let digital_span = f64::from(spec.digital_max) - f64::from(spec.digital_min);
    let physical_span = spec.physical_max - spec.physical_min;
    f64::from(spec.digital_min) + (physical - spec.physical_min) * digital_span / physical_span
}

#[test]
fn digital_codes_survive_physical_conversion() {
    let mut specs = vec![
        SignalSpec::new("EEG Fp1", 8, -200.0, 200.0).with_unit("uV"),
        SignalSpec::new("ECG", 5, -3.3, 3.3).with_unit("mV"),
        SignalSpec::new("Temp", 1, 30.0, 42.0).with_unit("degC"),
    ];
    specs[2].digital_min = 0;
    specs[2].digital_max = 4095;

    let mut writer = EdfWriter::new(0.5);
    for spec in &specs {
        writer.add_signal(spec.clone()).unwrap();
    }

    let mut expected: Vec<Vec<i16>> = vec![Vec::new(); specs.len()];
    for record in 0..4i16 {
        let chunks: Vec<Vec<i16>> = specs
            .iter()
            .enumerate()
            .map(|(s, spec)| {
                (0..spec.samples_per_record as i16)
                    .map(|i| {
                        let raw = record * 1000 + i * 37 - 1500 * s as i16;
                        raw.clamp(spec.digital_min, spec.digital_max)
                    })
                    .collect()
            })
            .collect();
        for (s, chunk) in chunks.iter().enumerate() {
            expected[s].extend_from_slice(chunk);
        }
        writer.push_record(chunks).unwrap();
    }

    let mut reader = EdfReader::from_reader(Cursor::new(writer.to_bytes().unwrap())).unwrap();
    assert_eq!(reader.header().data_records, 4);
    assert_eq!(reader.header().signals[0].physical_dim, "uV");

    for (index, spec) in specs.iter().enumerate() {
        let codes = reader.read_signal_samples(index, 0, 4).unwrap();
        assert_eq!(codes, expected[index]);

        for &code in &codes {
            let physical = reader.to_physical(index, code);
            let restored = inverse(spec, physical);
            assert!((restored - f64::from(code)).abs() < 1e-6, "signal {} code {}", index, code);
        }
    }
}

#[test]
fn channel_times_follow_record_duration() {
    let mut writer = EdfWriter::new(2.0);
    writer.add_signal(SignalSpec::new("Resp", 4, -1.0, 1.0)).unwrap();
    writer.push_record(vec![vec![0; 4]]).unwrap();
    writer.push_record(vec![vec![0; 4]]).unwrap();

    let mut reader = EdfReader::from_reader(Cursor::new(writer.to_bytes().unwrap())).unwrap();
    assert_eq!(reader.sampling_rate(0), 2.0);

    let mut channel = Channel::new("0", "Resp");
    reader.load_into_channel(0, &mut channel).unwrap();

    let times: Vec<f64> = channel.raw.iter().map(|s| s.time).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
}

#[test]
fn out_of_range_signal_never_reads() {
    let mut writer = EdfWriter::new(1.0);
    writer.add_signal(SignalSpec::new("A", 2, -1.0, 1.0)).unwrap();
    writer.push_record(vec![vec![1, 2]]).unwrap();

    let mut reader = EdfReader::from_reader(Cursor::new(writer.to_bytes().unwrap())).unwrap();
    for index in [1, 2, 100, usize::MAX] {
        let err = reader.read_signal_samples(index, 0, 1).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::OutOfRange);
    }

    let mut channel = Channel::new("x", "x");
    let err = reader.load_into_channel(3, &mut channel).unwrap_err();
    assert_eq!(err.kind(), DecodeErrorKind::OutOfRange);
}

#[test]
fn container_file_on_disk() {
    let path = std::env::temp_dir().join(format!("biochart-roundtrip-{}.edf", std::process::id()));

    let mut writer = EdfWriter::new(1.0);
    writer.patient_id = "X F 01-JAN-1970 Anonymous".to_string();
    writer.add_signal(SignalSpec::new("A", 3, 0.0, 1.0)).unwrap();
    writer.push_record(vec![vec![-32768, 0, 32767]]).unwrap();
    writer.save(&path).unwrap();

    let mut reader = EdfReader::open(&path).unwrap();
    assert_eq!(reader.header().patient_id, "X F 01-JAN-1970 Anonymous");
    assert_eq!(reader.read_signal_samples(0, 0, 1).unwrap(), vec![-32768, 0, 32767]);
    assert_eq!(reader.to_physical(0, 32767), 1.0);
    drop(reader.close());

    std::fs::remove_file(&path).ok();
}
