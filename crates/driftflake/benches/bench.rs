use std::hint::black_box;
use std::thread;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use driftflake::{
    AtomicDriftflakeGenerator, BasicDriftflakeGenerator, Driftflake64, LockDriftflakeGenerator,
    ThreadRandom, WallClock,
};

fn bench_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_id");
    group.throughput(Throughput::Elements(1));

    group.bench_function("basic", |b| {
        let generator = BasicDriftflakeGenerator::<Driftflake64, _, _>::new(
            0,
            0,
            WallClock::default(),
            ThreadRandom,
        )
        .unwrap();
        b.iter(|| black_box(generator.next_id()));
    });

    group.bench_function("lock", |b| {
        let generator = LockDriftflakeGenerator::<Driftflake64, _, _>::new(
            0,
            0,
            WallClock::default(),
            ThreadRandom,
        )
        .unwrap();
        b.iter(|| black_box(generator.next_id()));
    });

    group.bench_function("atomic", |b| {
        let generator = AtomicDriftflakeGenerator::<Driftflake64, _, _>::new(
            0,
            0,
            WallClock::default(),
            ThreadRandom,
        )
        .unwrap();
        b.iter(|| black_box(generator.next_id()));
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    const IDS_PER_THREAD: usize = 256;
    let threads = num_cpus::get().min(8);

    let mut group = c.benchmark_group("next_id_contended");
    group.throughput(Throughput::Elements((threads * IDS_PER_THREAD) as u64));

    group.bench_function("lock", |b| {
        let generator = LockDriftflakeGenerator::<Driftflake64, _, _>::new(
            0,
            0,
            WallClock::default(),
            ThreadRandom,
        )
        .unwrap();
        b.iter(|| {
            thread::scope(|s| {
                for _ in 0..threads {
                    s.spawn(|| {
                        for _ in 0..IDS_PER_THREAD {
                            black_box(generator.next_id());
                        }
                    });
                }
            });
        });
    });

    group.bench_function("atomic", |b| {
        let generator = AtomicDriftflakeGenerator::<Driftflake64, _, _>::new(
            0,
            0,
            WallClock::default(),
            ThreadRandom,
        )
        .unwrap();
        b.iter(|| {
            thread::scope(|s| {
                for _ in 0..threads {
                    s.spawn(|| {
                        for _ in 0..IDS_PER_THREAD {
                            black_box(generator.next_id());
                        }
                    });
                }
            });
        });
    });

    group.finish();
}

criterion_group!(benches, bench_uncontended, bench_contended);
criterion_main!(benches);
