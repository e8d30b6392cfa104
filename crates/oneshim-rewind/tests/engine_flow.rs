//! 리와인드 엔진 통합 테스트.
//!
//! 로드 → 탐색 → 범위 선택 → 커밋 흐름과 외부 협력자(포트) 실패 경로를 검증한다.

use async_trait::async_trait;
use oneshim_core::config::RewindConfig;
use oneshim_core::error::CoreError;
use oneshim_core::models::capture::{ActiveBlock, Capture};
use oneshim_core::ports::capture_source::CaptureSource;
use oneshim_core::ports::media::{MediaPrefetcher, PrefixMediaResolver};
use oneshim_core::ports::range_store::RangeStore;
use oneshim_rewind::engine::RewindEngine;
use oneshim_rewind::error::RewindError;
use oneshim_rewind::events::{MutationKind, RewindEvent};
use oneshim_rewind::locator::NearestSampleLocator;
use oneshim_rewind::segments::SegmentBuilder;
use oneshim_rewind::selection::{RangeSelection, SelectionState};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn capture(id: i64, timestamp: i64, app: &str) -> Capture {
    Capture {
        id,
        timestamp,
        app_name: Some(app.to_string()),
        thumbnail_ref: format!("{id}/thumb"),
        full_image_ref: format!("{id}/image"),
    }
}

/// 10초 간격, 한 앱으로 된 캡처 n개
fn uniform(n: i64) -> Vec<Capture> {
    (0..n).map(|i| capture(i + 1, 1_000 + i * 10, "Code")).collect()
}

fn engine_with(captures: Vec<Capture>) -> RewindEngine {
    let start = captures.iter().map(|c| c.timestamp).min().unwrap_or(0);
    let end = captures.iter().map(|c| c.timestamp).max().unwrap_or(0);
    let mut engine = RewindEngine::new(RewindConfig::default_config()).unwrap();
    engine.load(captures, Vec::new(), start, end);
    engine
}

fn drain(rx: &mut broadcast::Receiver<RewindEvent>) -> Vec<RewindEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ── Mock 협력자 ──

struct MockStore {
    should_fail: bool,
    deleted: Mutex<Vec<(i64, i64)>>,
    saved: Mutex<Vec<(String, i64, i64)>>,
}

impl MockStore {
    fn new(should_fail: bool) -> Self {
        Self {
            should_fail,
            deleted: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RangeStore for MockStore {
    async fn delete_captures_in_range(
        &self,
        start_time: i64,
        end_time_exclusive: i64,
    ) -> Result<u64, CoreError> {
        if self.should_fail {
            return Err(CoreError::Network("삭제 요청 실패".to_string()));
        }
        self.deleted.lock().push((start_time, end_time_exclusive));
        Ok(6)
    }

    async fn save_range_as_collection(
        &self,
        name: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<String, CoreError> {
        if self.should_fail {
            return Err(CoreError::Internal("저장 실패".to_string()));
        }
        self.saved.lock().push((name.to_string(), start_time, end_time));
        Ok("collection-1".to_string())
    }
}

struct MockSource {
    should_fail: bool,
    captures: Vec<Capture>,
}

#[async_trait]
impl CaptureSource for MockSource {
    async fn fetch_captures(
        &self,
        _range_start: i64,
        _range_end: i64,
    ) -> Result<Vec<Capture>, CoreError> {
        if self.should_fail {
            return Err(CoreError::Network("연결 거부".to_string()));
        }
        Ok(self.captures.clone())
    }

    async fn fetch_active_blocks(
        &self,
        range_start: i64,
        range_end: i64,
    ) -> Result<Vec<ActiveBlock>, CoreError> {
        Ok(vec![ActiveBlock {
            start: range_start,
            end: range_end,
            duration_secs: range_end - range_start,
        }])
    }
}

#[derive(Default)]
struct RecordingPrefetcher {
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaPrefetcher for RecordingPrefetcher {
    async fn prefetch(&self, url: &str) -> Result<(), CoreError> {
        self.urls.lock().push(url.to_string());
        Ok(())
    }
}

// ── 시나리오 ──

#[test]
fn app_change_and_gap_split_segments() {
    init_tracing();
    let captures = vec![
        capture(1, 0, "A"),
        capture(2, 5, "A"),
        capture(3, 10, "A"),
        capture(4, 70, "B"),
        capture(5, 75, "B"),
    ];
    let segments = SegmentBuilder::new(60).build(&captures);
    assert_eq!(segments.len(), 2);
    assert_eq!((segments[0].start_index, segments[0].end_index), (0, 2));
    assert_eq!((segments[1].start_index, segments[1].end_index), (3, 4));
    assert_eq!(segments[1].app_name, "B");
}

#[test]
fn locate_prefers_nearest_sample() {
    let captures = vec![capture(1, 0, "A"), capture(2, 5, "A"), capture(3, 10, "A")];
    let index = NearestSampleLocator::new(&captures).locate(7).unwrap();
    assert_eq!(index, 1);
}

#[tokio::test]
async fn two_point_selection_commits_inclusive_interval() {
    init_tracing();
    let mut engine = engine_with(uniform(10));
    let store = MockStore::new(false);

    engine.toggle_range_select_mode();
    engine.start_range_select(2);
    engine.extend_range_select(7);
    assert_eq!(
        engine.selection(),
        Some(RangeSelection {
            start_index: 2,
            end_index: 7
        })
    );

    let deleted = engine.commit_range_delete(&store).await.unwrap();
    assert_eq!(deleted, 6);
    assert_eq!(*store.deleted.lock(), vec![(1_020, 1_071)]);
    assert_eq!(engine.selection_state(), SelectionState::Idle);
    assert!(!engine.mutation_in_flight());
}

#[tokio::test]
async fn load_resets_selection_and_playback() {
    let mut engine = engine_with(uniform(10));
    engine.toggle_range_select_mode();
    engine.start_range_select(1);
    engine.extend_range_select(4);
    engine.seek(0);
    assert!(engine.play());

    engine.load(uniform(3), Vec::new(), 1_000, 1_020);

    assert_eq!(engine.selection_state(), SelectionState::Idle);
    assert!(!engine.is_playing());
    assert!(engine.range_select_mode());
    assert_eq!(engine.current_index(), 2);
}

// ── 커밋 ──

#[tokio::test]
async fn failed_delete_keeps_selection() {
    let mut engine = engine_with(uniform(10));
    let mut rx = engine.subscribe();
    let store = MockStore::new(true);

    engine.toggle_range_select_mode();
    engine.start_range_select(3);
    engine.extend_range_select(5);

    let err = engine.commit_range_delete(&store).await.unwrap_err();
    assert!(matches!(err, RewindError::Core(CoreError::Network(_))));
    assert!(engine.selection().is_some());
    assert!(engine.can_commit());

    let events = drain(&mut rx);
    assert!(events.contains(&RewindEvent::MutationStarted {
        kind: MutationKind::Delete
    }));
    assert!(events.contains(&RewindEvent::MutationFinished {
        kind: MutationKind::Delete,
        success: false
    }));
}

#[tokio::test]
async fn save_collection_trims_name_and_keeps_selection() {
    let mut engine = engine_with(uniform(10));
    let store = MockStore::new(false);

    engine.toggle_range_select_mode();
    engine.start_range_select(6);
    engine.extend_range_select(4);

    let id = engine.commit_range_save(&store, "  오전 회의 ").await.unwrap();
    assert_eq!(id, "collection-1");
    assert_eq!(
        *store.saved.lock(),
        vec![("오전 회의".to_string(), 1_040, 1_061)]
    );
    assert_eq!(
        engine.selection(),
        Some(RangeSelection {
            start_index: 4,
            end_index: 6
        })
    );
}

#[tokio::test]
async fn failed_save_reports_core_error() {
    let mut engine = engine_with(uniform(4));
    let store = MockStore::new(true);

    engine.toggle_range_select_mode();
    engine.start_range_select(0);
    engine.extend_range_select(1);

    let err = engine.commit_range_save(&store, "백업").await.unwrap_err();
    assert!(err.to_string().contains("저장 실패"));
    assert!(!engine.mutation_in_flight());
}

#[tokio::test]
async fn commit_without_selection_is_rejected() {
    let mut engine = engine_with(uniform(4));
    let store = MockStore::new(false);

    engine.toggle_range_select_mode();
    engine.start_range_select(2);

    let err = engine.commit_range_delete(&store).await.unwrap_err();
    assert!(matches!(err, RewindError::NoSelection));
    assert!(store.deleted.lock().is_empty());
}

// ── 새로고침 ──

#[tokio::test]
async fn refresh_loads_sorted_captures_and_blocks() {
    init_tracing();
    let mut engine = RewindEngine::new(RewindConfig::default_config()).unwrap();
    let source = MockSource {
        should_fail: false,
        captures: vec![
            capture(3, 300, "Mail"),
            capture(1, 100, "Code"),
            capture(2, 200, "Code"),
        ],
    };

    let count = engine.refresh(&source, 100, 300).await.unwrap();
    assert_eq!(count, 3);
    let ids: Vec<i64> = engine.captures().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(engine.current_index(), 2);
    assert_eq!(engine.active_blocks().len(), 1);
    assert_eq!(engine.active_block_fractions(), vec![(0.0, 1.0)]);
    // 100 → 200 간격(100초)이 60초 이상이므로 같은 앱이어도 분할
    assert_eq!(engine.segments().len(), 3);
    assert_eq!(engine.activity_spans().len(), 3);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_dataset() {
    let mut engine = engine_with(uniform(5));
    let source = MockSource {
        should_fail: true,
        captures: Vec::new(),
    };

    let err = engine.refresh(&source, 0, 10).await.unwrap_err();
    assert!(matches!(err, RewindError::Core(CoreError::Network(_))));
    assert_eq!(engine.len(), 5);
}

// ── 세그먼트 조회 ──

#[test]
fn span_and_playback_thresholds_differ() {
    // 45초 간격: 재생 세그먼트(60초)는 유지, 활동 구간(30초)은 분할
    let captures = vec![
        capture(1, 0, "Code"),
        capture(2, 45, "Code"),
        capture(3, 90, "Code"),
    ];
    let mut engine = engine_with(captures);
    assert_eq!(engine.segments().len(), 1);
    assert_eq!(engine.activity_spans().len(), 3);

    engine.seek(1);
    let segment = engine.current_segment().unwrap();
    assert_eq!((segment.start_index, segment.end_index), (0, 2));
}

#[test]
fn missing_app_name_groups_as_unknown() {
    let mut captures = uniform(3);
    for c in &mut captures {
        c.app_name = None;
    }
    let engine = engine_with(captures);
    assert_eq!(engine.segments().len(), 1);
    assert_eq!(engine.segments()[0].app_name, "Unknown");
}

// ── 이벤트 / 프리페치 ──

#[tokio::test]
async fn load_publishes_loaded_and_index_events() {
    let mut engine = RewindEngine::new(RewindConfig::default_config()).unwrap();
    let mut rx = engine.subscribe();

    engine.load(uniform(4), Vec::new(), 1_000, 1_030);

    let events = drain(&mut rx);
    assert_eq!(
        events[0],
        RewindEvent::Loaded {
            captures: 4,
            segments: 1
        }
    );
    assert!(events.contains(&RewindEvent::IndexChanged {
        index: 3,
        fraction: 1.0
    }));
}

#[tokio::test]
async fn index_change_prefetches_neighbours_once() {
    let prefetcher = Arc::new(RecordingPrefetcher::default());
    let mut engine = RewindEngine::new(RewindConfig::default_config())
        .unwrap()
        .with_media(
            Arc::new(PrefixMediaResolver::new("/frames/")),
            Some(prefetcher.clone() as Arc<dyn MediaPrefetcher>),
        );

    engine.load(uniform(20), Vec::new(), 1_000, 1_190);
    // 마지막 인덱스(19) 기준 14..=19
    engine.step_by(-1);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    let mut urls = prefetcher.urls.lock().clone();
    urls.sort();
    // 18 기준 13..=19 중 새로 요청된 13만 추가
    assert_eq!(urls.len(), 7);
    assert!(urls.contains(&"/frames/14/image".to_string()));
    assert!(urls.contains(&"/frames/20/image".to_string()));
}

// ── 설정 ──

#[test]
fn engine_uses_persisted_config() {
    use oneshim_core::config_manager::ConfigManager;
    use oneshim_rewind::playback::SpeedMultiplier;

    let temp_dir = tempfile::TempDir::new().unwrap();
    let manager = ConfigManager::with_path(temp_dir.path().join("rewind.json")).unwrap();
    manager
        .update_with(|c| {
            c.playback.default_speed = SpeedMultiplier::X10;
            c.segments.playback_gap_secs = 30;
        })
        .unwrap();

    let mut engine = RewindEngine::from_config_manager(&manager).unwrap();
    assert_eq!(engine.speed_multiplier(), SpeedMultiplier::X10);

    // 45초 간격은 30초 임계값에서 분할
    engine.load(
        vec![capture(1, 0, "Code"), capture(2, 45, "Code")],
        Vec::new(),
        0,
        45,
    );
    assert_eq!(engine.segments().len(), 2);
}
