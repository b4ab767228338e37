//! Timing of layer selection over a page-sized descriptor grid.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use overstrike_core::{DescriptorBlock, DescriptorGrid};
use overstrike_glyphs::{Glyph, GlyphGeometry, GlyphKey, GlyphLibrary};
use overstrike_render::{CandidatePolicy, LayerSelector, RenderParams};

/// Printable ASCII with pseudo-random references.
fn ascii_library() -> GlyphLibrary {
    let geometry = GlyphGeometry::default();
    let len = geometry.rows * geometry.cols * geometry.bins;
    let mut state = 0x2545_f491_u32;
    let glyphs = (0x20u8..0x7f).map(|b| {
        let data = (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state % 1000) as f32 / 1000.0
            })
            .collect();
        let block = DescriptorBlock::new(geometry.rows, geometry.cols, geometry.bins, data)
            .expect("shape");
        Glyph::new(GlyphKey::Single(char::from(b)), block)
    });
    GlyphLibrary::from_glyphs(geometry, glyphs).expect("library")
}

fn bench_select(c: &mut Criterion) {
    let lib = ascii_library();
    let geometry = lib.geometry();
    // 66 characters wide, 40 rows deep.
    let tile = DescriptorBlock::filled(geometry.rows, geometry.cols, geometry.bins, 0.4);
    let grid = DescriptorGrid::tiled(&tile, 40, 66);
    let policy = CandidatePolicy::teletype();

    for layers in [1usize, 2, 4] {
        let selector = LayerSelector::new(
            &lib,
            RenderParams {
                layers,
                ..RenderParams::default()
            },
        )
        .expect("params");
        c.bench_function(&format!("select 66x40, {layers} layer(s)"), |b| {
            b.iter(|| {
                let sel = selector
                    .render_with_policy(black_box(&grid), &policy)
                    .expect("render");
                black_box(sel);
            });
        });
    }
}

criterion_group!(benches, bench_select);
criterion_main!(benches);
