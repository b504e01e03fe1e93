//! # mpdc Performance Benchmarks
//!
//! Benchmarks for the selection hot paths.
//!
//! ## Benchmark Categories
//!
//! - **Sampling**: per-artist ranking and cross-artist sampling
//! - **Store Queries**: related and genre pools from SQLite
//! - **Path Translation**: library path to MPD path conversion
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench sampling
//! cargo bench store
//! ```

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use mpdc::db::{self, MetadataStore, SqliteStore};
use mpdc::track::{ArtistId, TrackCandidate};
use mpdc::{algorithm, path_translator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

/// Pool of `artists` artists with `per_artist` tracks each.
fn create_pool(artists: i64, per_artist: u32) -> Vec<TrackCandidate> {
    let mut pool = Vec::new();
    for artist_id in 1..=artists {
        for rank in 1..=per_artist {
            pool.push(TrackCandidate {
                artist_id,
                artist_name: format!("Artist {artist_id}"),
                album_name: "Album".to_string(),
                track_name: format!("Track {rank}"),
                directory_path: format!("/music/Artist {artist_id}/Album"),
                filename: format!("{rank:02}.flac"),
                popularity_rank: rank,
                play_count: 1000 / rank,
                rank_within_artist: 0,
                artist_weight: 1.0 / artist_id as f64,
            });
        }
    }
    pool
}

/// In-memory library with `artists` artists related to artist 1 and sharing a tag.
fn create_benchmark_store(artists: ArtistId) -> SqliteStore {
    let conn = rusqlite::Connection::open_in_memory().expect("in-memory database");
    db::init_schema(&conn).expect("schema");

    conn.execute("INSERT INTO tag (id, tag_name) VALUES (1, 'rock')", [])
        .expect("tag");
    for id in 1..=artists {
        conn.execute(
            "INSERT INTO artist (id, artist_name, artist_name_capitalization) VALUES (?1, ?2, ?2)",
            (id, format!("Artist {id}")),
        )
        .expect("artist");
        conn.execute("INSERT INTO library_artist (artist_id) VALUES (?1)", [id])
            .expect("library artist");
        conn.execute("INSERT INTO album (id, album_name_capitalization) VALUES (?1, 'Album')", [id])
            .expect("album");
        conn.execute(
            "INSERT INTO library_directory (id, path) VALUES (?1, ?2)",
            (id, format!("/music/Artist {id}/Album")),
        )
        .expect("directory");
        if id > 1 {
            conn.execute(
                "INSERT INTO artist_relation (source_id, target_id, weight) VALUES (1, ?1, ?2)",
                (id, 1.0 / id as f64),
            )
            .expect("relation");
        }
        conn.execute(
            "INSERT INTO artist_top_tag (artist_id, tag_id, tag_count) VALUES (?1, 1, ?2)",
            (id, 100 - id % 100),
        )
        .expect("top tag");

        for n in 1..=20_i64 {
            let track_id = id * 100 + n;
            conn.execute(
                "INSERT INTO track (id, artist_id, track_name_capitalization) VALUES (?1, ?2, ?3)",
                (track_id, id, format!("Track {n}")),
            )
            .expect("track");
            conn.execute(
                "INSERT INTO library_file (id, directory_id, filename) VALUES (?1, ?2, ?3)",
                (track_id, id, format!("{n:02}.flac")),
            )
            .expect("file");
            conn.execute(
                "INSERT INTO library_track (id, track_id, album_id, file_id) VALUES (?1, ?1, ?2, ?1)",
                (track_id, id),
            )
            .expect("library track");
            conn.execute(
                "INSERT INTO artist_top_track_play_count (artist_id, track_id, rank, play_count)
                 VALUES (?1, ?2, ?3, ?4)",
                (id, track_id, n, 2000 / n),
            )
            .expect("play count");
        }
    }

    SqliteStore::from_connection(conn).expect("register regexp")
}

/// Benchmark the two sampling stages
fn benchmark_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling");

    for artists in [10, 50, 200].iter() {
        let pool = create_pool(*artists, 50);

        group.bench_with_input(BenchmarkId::new("rank_within_artists", artists), &pool, |b, pool| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter_batched(
                || pool.clone(),
                |pool| algorithm::rank_within_artists(black_box(pool), &mut rng, 5),
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("two_stage", artists), &pool, |b, pool| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter_batched(
                || pool.clone(),
                |pool| {
                    let ranked = algorithm::rank_within_artists(pool, &mut rng, 5);
                    algorithm::sample(ranked, &mut rng, 25, |rng, track| {
                        algorithm::relation_score(rng, track.artist_weight)
                    })
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark pool queries against SQLite
fn benchmark_store_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    let store = create_benchmark_store(100);
    let tags = vec!["rock".to_string()];

    group.bench_function("related_pool", |b| {
        b.iter(|| store.related_pool(black_box(1)).expect("related pool"))
    });

    group.bench_function("tagged_pool", |b| {
        b.iter(|| store.tagged_pool(black_box(&tags)).expect("tagged pool"))
    });

    group.bench_function("search_artists_regexp", |b| {
        b.iter(|| store.search_artists(black_box("(?i)artist 1.$")).expect("artist search"))
    });

    group.finish();
}

/// Benchmark path translation
fn benchmark_path_translation(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_translation");

    group.bench_function("to_mpd_relative", |b| {
        b.iter(|| {
            path_translator::to_mpd_relative(
                black_box("/home/user/Music/Artist/Album (Deluxe Edition)"),
                black_box("01 - Opening Track.flac"),
                black_box("/home/user/Music/"),
            )
        })
    });

    group.finish();
}

// Group all benchmarks
criterion_group!(
    benches,
    benchmark_sampling,
    benchmark_store_queries,
    benchmark_path_translation
);

criterion_main!(benches);
