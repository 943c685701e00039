mod common;

use common::synthetic_image::split_rgb;
use red_vision::core_modules::redness_detector::{self, detect};
use red_vision::core_modules::test_image_generator::{
    self, GeneratorConfig, Polarity, generate_seeded,
};
use red_vision::core_modules::threshold_filter::apply;
use red_vision::{PixelBuffer, ThresholdSpec, VisionError};

#[test]
fn gray_image_has_no_red() {
    let buffer = PixelBuffer::filled_rgb(64, 48, [200, 200, 200]).unwrap();
    let report = detect(&buffer, 1.2).unwrap();
    assert_eq!(report.red_fraction, 0.0);
    assert!(report.mask.as_slice().iter().all(|&v| v == 0));
}

#[test]
fn pure_red_image_is_fully_red() {
    let buffer = PixelBuffer::filled_rgb(64, 48, [255, 0, 0]).unwrap();
    let report = detect(&buffer, 1.2).unwrap();
    assert_eq!(report.red_fraction, 1.0);
    assert!(report.mask.as_slice().iter().all(|&v| v == 255));
}

#[test]
fn absolute_cutoff_splits_dark_and_bright() {
    let dark = PixelBuffer::filled(10, 10, 3, 100).unwrap();
    let bright = PixelBuffer::filled(10, 10, 3, 200).unwrap();
    let spec = ThresholdSpec::Absolute(128);
    assert!(apply(&dark, spec).unwrap().as_slice().iter().all(|&v| v == 0));
    assert!(apply(&bright, spec).unwrap().as_slice().iter().all(|&v| v == 255));
}

#[test]
fn fifty_percent_equals_cutoff_128_on_a_gradient() {
    let ramp = test_image_generator::gradient(Polarity::Normal).unwrap();
    let by_percent = apply(&ramp, ThresholdSpec::Percentage(50.0)).unwrap();
    let by_cutoff = apply(&ramp, ThresholdSpec::Absolute(128)).unwrap();
    assert_eq!(by_percent, by_cutoff);

    let row = &by_cutoff.as_slice()[..256];
    assert_eq!(row.iter().filter(|&&v| v == 0).count(), 128);
    assert_eq!(row.iter().filter(|&&v| v == 255).count(), 128);
    assert_eq!(row[127], 0);
    assert_eq!(row[128], 255);
}

#[test]
fn inverted_gradient_thresholds_to_the_mirror_image() {
    let ramp = test_image_generator::gradient(Polarity::Inverted).unwrap();
    let out = apply(&ramp, ThresholdSpec::Absolute(128)).unwrap();
    assert_eq!(out.get(0, 0), &[255]);
    assert_eq!(out.get(0, 127), &[255]);
    assert_eq!(out.get(0, 128), &[0]);
}

#[test]
fn seeded_generation_is_reproducible() {
    let config = GeneratorConfig::default();
    let first = generate_seeded(&config, Some(42)).unwrap();
    let second = generate_seeded(&config, Some(42)).unwrap();
    assert_eq!(first.as_slice(), second.as_slice());
}

#[test]
fn grayscale_input_is_rejected_by_detection() {
    let buffer = PixelBuffer::filled(8, 8, 1, 255).unwrap();
    assert!(matches!(
        redness_detector::detect_default(&buffer),
        Err(VisionError::InvalidImageFormat { .. })
    ));
}

#[test]
fn half_red_image_reports_half() {
    let buffer = split_rgb(40, 10, [220, 30, 30], [30, 220, 30]);
    let report = detect(&buffer, 1.2).unwrap();
    assert_eq!(report.red_fraction, 0.5);
    assert_eq!(report.mask.get(5, 0), &[255, 255, 255]);
    assert_eq!(report.mask.get(5, 39), &[0, 0, 0]);
}

#[test]
fn outputs_stay_binary_and_fraction_stays_bounded() {
    for seed in 0..5u64 {
        let config = GeneratorConfig {
            width: 120,
            height: 90,
            background_color: [(seed * 40) as u8, 90, 200],
            dot_color: [240, (seed * 30) as u8, 60],
            ..Default::default()
        };
        let buffer = generate_seeded(&config, Some(seed)).unwrap();

        let report = detect(&buffer, 1.2).unwrap();
        assert!((0.0..=1.0).contains(&report.red_fraction));
        assert!(report.mask.as_slice().iter().all(|&v| v == 0 || v == 255));

        let thresholded = apply(&buffer, ThresholdSpec::Percentage(37.5)).unwrap();
        assert!(thresholded.as_slice().iter().all(|&v| v == 0 || v == 255));
        assert_eq!(apply(&thresholded, ThresholdSpec::Percentage(37.5)).unwrap(), thresholded);
    }
}
