use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lexis_core::{Condition, Frame, Trial};
use lexis_render::{SkiaRenderer, load_font};
use std::borrow::Cow;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn trial() -> Trial {
    Trial {
        condition: Condition::Colour,
        condition_label: "colour".into(),
        target: "grass".into(),
        words: ["leaf".into(), "sky".into(), "coal".into()],
        correct: "1".into(),
    }
}

fn harness() -> Option<(SkiaRenderer, Vec<u8>)> {
    let (_, font) = match load_font(None) {
        Ok(found) => found,
        Err(err) => {
            eprintln!("skipping render benches: {err}");
            return None;
        }
    };
    let renderer = SkiaRenderer::new(WIDTH, HEIGHT, font).ok()?;
    Some((renderer, vec![0u8; (WIDTH * HEIGHT * 4) as usize]))
}

pub fn bench_frames(c: &mut Criterion) {
    let Some((mut r, mut fb)) = harness() else {
        return;
    };
    let trial = trial();
    r.prepare([&trial]);

    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    g.bench_function("stimulus", |b| {
        b.iter(|| {
            r.render_frame(black_box(&Frame::Stimulus(&trial)), &mut fb)
                .ok();
        })
    });

    g.bench_function("fixation", |b| {
        b.iter(|| r.render_frame(black_box(&Frame::Fixation), &mut fb).ok())
    });

    let message = Frame::Message {
        text: Cow::Borrowed(
            "In the next block, choose the word that is a similar COLOUR to the target word.\n\nGET READY!",
        ),
        size: 30.0,
    };
    g.bench_function("message", |b| {
        b.iter(|| r.render_frame(black_box(&message), &mut fb).ok())
    });

    g.finish();
}

criterion_group!(benches, bench_frames);
criterion_main!(benches);
