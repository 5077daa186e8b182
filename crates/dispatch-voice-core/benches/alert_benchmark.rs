use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_voice_core::audio_device::{apply_fades, decode_pcm16};
use dispatch_voice_core::tone::render_tone;
use dispatch_voice_core::{
    templates, AlertQueue, AlertType, Priority, SpeakOptions, TonePattern, VoiceAlert, Waveform,
    DEFAULT_SAMPLE_RATE,
};
use std::time::Duration;

fn bench_tone_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("tone_rendering");

    for waveform in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
        group.bench_with_input(
            BenchmarkId::new("200ms", format!("{waveform:?}")),
            &waveform,
            |b, waveform| {
                b.iter(|| {
                    render_tone(
                        black_box(880.0),
                        black_box(Duration::from_millis(200)),
                        *waveform,
                        DEFAULT_SAMPLE_RATE,
                    )
                });
            },
        );
    }

    // Whole cue patterns, tones rendered back to back
    for pattern in [TonePattern::Critical, TonePattern::Panic] {
        group.bench_with_input(
            BenchmarkId::new("pattern", format!("{pattern:?}")),
            &pattern,
            |b, pattern| {
                b.iter(|| {
                    pattern
                        .tones()
                        .iter()
                        .map(|t| render_tone(t.frequency, t.duration, t.waveform, DEFAULT_SAMPLE_RATE).len())
                        .sum::<usize>()
                });
            },
        );
    }

    group.finish();
}

fn bench_queue_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_insertion");

    for size in [10usize, 100, 1000] {
        let alerts: Vec<VoiceAlert> = (0..size)
            .map(|i| {
                let priority = Priority::ALL[i % Priority::ALL.len()];
                VoiceAlert::new(format!("alert {i}"), SpeakOptions::new(priority, AlertType::Call))
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("push", size), &alerts, |b, alerts| {
            b.iter(|| {
                let mut queue = AlertQueue::new();
                for alert in alerts {
                    queue.push(black_box(alert.clone()));
                }
                black_box(queue.len())
            });
        });
    }

    group.finish();
}

fn bench_audio_helpers(c: &mut Criterion) {
    let mut group = c.benchmark_group("audio_helpers");

    let pcm: Vec<u8> = (0..48_000i32)
        .flat_map(|i| ((i % 2000 - 1000) as i16).to_le_bytes())
        .collect();
    group.bench_function("decode_pcm16_2s", |b| {
        b.iter(|| decode_pcm16(black_box(&pcm)));
    });

    let samples = vec![0.5f32; 48_000];
    group.bench_function("apply_fades_2s", |b| {
        b.iter(|| {
            let mut audio = samples.clone();
            apply_fades(black_box(&mut audio), DEFAULT_SAMPLE_RATE, true, true);
            audio
        });
    });

    group.bench_function("new_call_template", |b| {
        b.iter(|| {
            templates::new_call(
                black_box("24-1001"),
                black_box("Structure fire"),
                black_box("CRITICAL"),
                black_box("400 Elm St"),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tone_rendering, bench_queue_insertion, bench_audio_helpers);
criterion_main!(benches);
