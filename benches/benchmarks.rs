use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use faer::rand::{Rng, SeedableRng, rngs::SmallRng};
use std::hint::black_box;
use zarr_index_transform::{
    Index, IndexArray, IndexInterval, IndexTransform, InputDimension, apply_change_implicit_state,
};

const SIDE: Index = 16;

/// Rank 3 -> 3 over `[0, 16)^3`, with one index array map over the last dimension.
fn make_transform() -> IndexTransform {
    let mut builder = IndexTransform::builder(3, 3);
    for dim in 0..3 {
        builder
            .input_dimension(
                dim,
                InputDimension::new(IndexInterval::new(0, SIDE).unwrap()),
            )
            .unwrap();
    }
    builder
        .output_single_input_dimension(0, 0, 5, 2)
        .unwrap()
        .output_single_input_dimension(1, 1, 0, 1)
        .unwrap()
        .output_index_array(
            2,
            0,
            1,
            IndexArray::try_new((0..SIDE).rev().collect::<Vec<_>>(), &[1, 1, SIDE as usize])
                .unwrap(),
            IndexInterval::infinite(),
        )
        .unwrap();
    builder.build().unwrap()
}

fn points(n_pts: usize) -> Vec<Vec<Index>> {
    let mut rng = SmallRng::seed_from_u64(1991);
    let mut pts = Vec::with_capacity(n_pts);
    for _ in 0..n_pts {
        pts.push((0..3).map(|_| rng.random_range(0..SIDE)).collect());
    }
    pts
}

fn transform_points(c: &mut Criterion) {
    let t = make_transform();
    let pts = points(1000);
    let mut out = vec![0; t.output_rank()];
    c.bench_function("IndexTransform[transform_into]", |b| {
        b.iter(|| {
            for pt in pts.iter() {
                black_box(t.transform_into(pt, &mut out)).unwrap();
            }
        })
    });
}

fn mark_bounds(c: &mut Criterion) {
    let t = make_transform();
    c.bench_function("mark_bounds[unique]", |b| {
        b.iter_batched(
            || make_transform(),
            |t| black_box(apply_change_implicit_state(t, &[0, 1], true, true, true, false)),
            BatchSize::SmallInput,
        )
    });
    c.bench_function("mark_bounds[shared]", |b| {
        b.iter(|| black_box(apply_change_implicit_state(t.clone(), &[0, 1], true, true, true, false)))
    });
    c.bench_function("mark_bounds[shared, domain_only]", |b| {
        b.iter(|| black_box(apply_change_implicit_state(t.clone(), &[0, 1, 2], true, true, true, true)))
    });
    c.bench_function("mark_bounds[rejected]", |b| {
        b.iter(|| black_box(apply_change_implicit_state(t.clone(), &[2], true, true, true, false)))
    });
}

fn operators(c: &mut Criterion) {
    let t = make_transform();
    c.bench_function("translate_by[shared]", |b| {
        b.iter(|| black_box(t.clone().translate_by(&[0, 2], &[3, -3])))
    });
    c.bench_function("transpose[shared]", |b| {
        b.iter(|| black_box(t.clone().transpose(&[2, 0, 1])))
    });
}

criterion_group!(index_transform, transform_points, mark_bounds, operators);
criterion_main!(index_transform);
