use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use geo::Point;
use quadcluster::compute::{ClusteringParams, cluster_items};
use quadcluster::precision::grouping_distance;
use quadcluster::{
    Cluster, ClusterRenderer, CompletionToken, CoordinatorBuilder, DistanceMetric, GeoItem,
    QuadKey, Region, RegionSource, diff_generations,
};

/// Deterministic pseudo-random items around Manhattan.
fn city_items(count: usize) -> Vec<GeoItem> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..count)
        .map(|i| {
            let lat = 40.70 + next() * 0.1;
            let lon = -74.02 + next() * 0.1;
            GeoItem::new(format!("item:{}", i), lat, lon).unwrap()
        })
        .collect()
}

fn params(precision: u8) -> ClusteringParams<'static> {
    ClusteringParams {
        precision,
        grouping_distance: grouping_distance(
            &Point::new(-73.97, 40.75),
            precision,
            0.67,
            DistanceMetric::Haversine,
        ),
        pinned: None,
        metric: DistanceMetric::Haversine,
    }
}

fn benchmark_quadkey(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadkey");

    group.bench_function("encode", |b| {
        let mut counter = 0u32;
        b.iter(|| {
            let lat = 40.7128 + (counter % 1000) as f64 * 0.001;
            counter = counter.wrapping_add(1);
            QuadKey::from_coordinate(black_box(lat), black_box(-74.0060)).unwrap()
        })
    });

    let key = QuadKey::from_coordinate(40.7128, -74.0060).unwrap();
    group.bench_function("truncate_and_centroid", |b| {
        b.iter(|| black_box(key).truncate(black_box(16)).centroid(16))
    });

    group.finish();
}

fn benchmark_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");

    for size in [100usize, 1_000, 10_000] {
        let items = city_items(size);
        group.throughput(Throughput::Elements(size as u64));
        for precision in [12u8, 16] {
            group.bench_with_input(
                BenchmarkId::new(format!("precision_{}", precision), size),
                &items,
                |b, items| b.iter(|| cluster_items(black_box(items), &params(precision))),
            );
        }
    }

    group.finish();
}

fn benchmark_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for size in [1_000usize, 10_000] {
        let items = city_items(size);
        let coarse = cluster_items(&items, &params(12));
        let fine = cluster_items(&items, &params(16));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("zoom_in", size), &size, |b, _| {
            b.iter(|| diff_generations(black_box(&coarse), fine.clone()))
        });
    }

    group.finish();
}

struct Fixed(Region);

impl RegionSource for Fixed {
    fn visible_region(&self) -> Region {
        self.0
    }

    fn search_region(&self) -> Option<Region> {
        None
    }
}

#[derive(Default)]
struct Collect(Vec<CompletionToken>);

impl ClusterRenderer for Collect {
    fn on_cluster_appeared(&mut self, _: &Cluster, token: CompletionToken) {
        self.0.push(token)
    }

    fn on_cluster_updated(&mut self, _: &Cluster, _: Option<Point>, token: CompletionToken) {
        self.0.push(token)
    }

    fn on_cluster_removed(&mut self, _: &str, _: Option<(&str, Point)>, token: CompletionToken) {
        self.0.push(token)
    }
}

fn benchmark_regroup(c: &mut Criterion) {
    let mut group = c.benchmark_group("regroup");

    let items = city_items(5_000);
    let visible = Region::from_degrees(40.75, -73.97, 0.1, 0.1);
    let mut coordinator = CoordinatorBuilder::new()
        .build(move || items.clone(), Fixed(visible), Collect::default())
        .unwrap();

    group.bench_function("invalidated_regroup_5000", |b| {
        b.iter(|| {
            coordinator.invalidate();
            coordinator.request_regroup(black_box(&visible));
            for token in std::mem::take(&mut coordinator.renderer_mut().0) {
                coordinator.complete(token).unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_quadkey,
    benchmark_clustering,
    benchmark_diff,
    benchmark_regroup
);
criterion_main!(benches);
