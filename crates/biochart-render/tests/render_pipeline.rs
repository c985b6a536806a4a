//! Decode, process and render a container end to end

use biochart_core::{load_channels, ChannelStore, EdfReader, EdfWriter, SignalSpec};
use biochart_render::{Renderer, Series};
use image::Rgba;
use std::io::Cursor;

fn sine_container(samples_per_record: usize, records: usize) -> Vec<u8> {
    let mut writer = EdfWriter::new(1.0);
    writer
        .add_signal(SignalSpec::new("Pleth", samples_per_record, -1.0, 1.0))
        .unwrap();
    let spec = writer.signals()[0].clone();

    for record in 0..records {
        let chunk = (0..samples_per_record)
            .map(|i| {
                let t = (record * samples_per_record + i) as f64 / samples_per_record as f64;
                spec.to_digital(0.8 * (2.0 * std::f64::consts::PI * t).sin())
            })
            .collect();
        writer.push_record(vec![chunk]).unwrap();
    }
    writer.to_bytes().unwrap()
}

#[test]
fn long_recording_is_decimated_into_the_canvas() {
    let mut reader = EdfReader::from_reader(Cursor::new(sine_container(1000, 20))).unwrap();
    let mut store = ChannelStore::new();
    load_channels(&mut reader, &mut store, None);

    let channel = store.get("1").unwrap();
    assert_eq!(channel.len(), 20_000);

    let mut renderer = Renderer::new(400, 100);
    // 20 s across 400 px
    renderer.set_viewport(0.0, 20.0);

    let segments = renderer.waveform_segments(channel, 100);
    assert!(!segments.is_empty());
    assert!(segments.len() <= 800);

    let img = renderer.render_channel(channel, 100);
    assert_eq!(img.dimensions(), (400, 100));
    let red = img.pixels().filter(|p| **p == Rgba([255, 0, 0, 255])).count();
    assert!(red >= 400);
}

#[test]
fn processed_series_renders_independently() {
    let mut reader = EdfReader::from_reader(Cursor::new(sine_container(100, 2))).unwrap();
    let mut store = ChannelStore::new();
    load_channels(&mut reader, &mut store, None);

    let mut renderer = Renderer::new(200, 80);
    renderer.set_viewport(0.0, 100.0);
    renderer.set_grid_visible(false);
    renderer.set_series(Series::Processed);

    let ids = store.ids();
    let blank = renderer.render_all_channels(&ids, &store, 80);
    assert!(blank.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));

    let channel = store.get_mut("1").unwrap();
    let smoothed = channel.raw.iter().copied().step_by(2).collect();
    channel.set_processed(smoothed);

    let drawn = renderer.render_all_channels(&ids, &store, 80);
    assert!(drawn.pixels().any(|p| *p == Rgba([255, 0, 0, 255])));
}
