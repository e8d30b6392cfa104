//! 리와인드 엔진 (컴포지션 루트).
//!
//! 로케이터, 세그먼트 분할기, 범위 선택기, 홀드 반복기, 재생 클록, 스크러버,
//! 프리페치 윈도우를 하나의 명령/조회 인터페이스로 묶는다.
//!
//! 모든 연산은 호출자 태스크에서 끝까지 실행된다 (단일 스레드 협력 모델).
//! 타이머는 백그라운드 태스크지만 상태를 직접 바꾸지 않고 틱만 보내며,
//! 호스트가 [`RewindEngine::next_tick`] → [`RewindEngine::handle_tick`]으로
//! 처리한다. 외부 I/O 대기 지점은 [`RewindEngine::refresh`]와 커밋 두 곳뿐이다.

use oneshim_core::config::RewindConfig;
use oneshim_core::config_manager::ConfigManager;
use oneshim_core::error::CoreError;
use oneshim_core::models::capture::{ActiveBlock, Capture};
use oneshim_core::models::segment::ActivitySegment;
use oneshim_core::ports::capture_source::CaptureSource;
use oneshim_core::ports::media::{MediaPrefetcher, MediaResolver, PrefixMediaResolver};
use oneshim_core::ports::range_store::RangeStore;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace, warn};

use crate::dataset::CaptureSet;
use crate::error::RewindError;
use crate::events::{MutationKind, RewindEvent, RewindEventBus};
use crate::hold::{HoldCadence, HoldRepeater, HoldState, StepDirection};
use crate::input::{HostCommand, NavKey};
use crate::locator::NearestSampleLocator;
use crate::playback::{PlaybackClock, PlaybackState, PlaybackStep, SpeedMultiplier};
use crate::prefetch::ImagePrefetchWindow;
use crate::scrubber::{
    GestureContext, GestureOutcome, PreviewEvent, ScrubberController, TimeWindow,
};
use crate::segments::SegmentBuilder;
use crate::selection::{RangeSelection, RangeSelector, SelectionState, TimeInterval};
use crate::timer::{tick_channel, TimerKind, TimerTick};

/// 진행 중인 변경 작업 (2단계 커밋용)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    /// 작업 종류
    pub kind: MutationKind,
    /// 대상 선택 범위
    pub selection: RangeSelection,
    /// 협력자에 넘길 시간 구간
    pub interval: TimeInterval,
}

/// 리와인드 엔진
pub struct RewindEngine {
    config: RewindConfig,
    captures: CaptureSet,
    active_blocks: Vec<ActiveBlock>,
    segments: Vec<ActivitySegment>,
    spans: Vec<ActivitySegment>,
    playback_segmenter: SegmentBuilder,
    span_segmenter: SegmentBuilder,
    current_index: usize,
    range_select_mode: bool,
    selector: RangeSelector,
    scrubber: ScrubberController,
    playback: PlaybackClock,
    hold: HoldRepeater,
    prefetch: ImagePrefetchWindow,
    resolver: Arc<dyn MediaResolver>,
    events: RewindEventBus,
    mutation_in_flight: Option<MutationKind>,
    tick_tx: mpsc::Sender<TimerTick>,
    tick_rx: mpsc::Receiver<TimerTick>,
}

impl RewindEngine {
    /// 설정으로 엔진 생성 (빈 데이터셋, 프리페치 없음)
    pub fn new(config: RewindConfig) -> Result<Self, RewindError> {
        config.validate()?;
        let speed = config.playback.default_speed;
        let resolver: Arc<dyn MediaResolver> = Arc::new(PrefixMediaResolver::new(""));
        let (tick_tx, tick_rx) = tick_channel();

        Ok(Self {
            captures: CaptureSet::default(),
            active_blocks: Vec::new(),
            segments: Vec::new(),
            spans: Vec::new(),
            playback_segmenter: SegmentBuilder::playback(&config.segments),
            span_segmenter: SegmentBuilder::activity_span(&config.segments),
            current_index: 0,
            range_select_mode: false,
            selector: RangeSelector::new(),
            scrubber: ScrubberController::default(),
            playback: PlaybackClock::new(config.base_period(), speed),
            hold: HoldRepeater::new(HoldCadence::from_config(&config.hold_repeat)),
            prefetch: ImagePrefetchWindow::new(&config.prefetch, Arc::clone(&resolver), None),
            resolver,
            events: RewindEventBus::new(config.events.channel_capacity),
            mutation_in_flight: None,
            tick_tx,
            tick_rx,
            config,
        })
    }

    /// 설정 관리자의 현재 설정으로 엔진 생성
    pub fn from_config_manager(manager: &ConfigManager) -> Result<Self, RewindError> {
        let config = manager.get();
        debug!("리와인드 설정 로드: {}", manager.config_path().display());
        Self::new(config)
    }

    /// 미디어 URL 해석기와 프리페처 연결
    pub fn with_media(
        mut self,
        resolver: Arc<dyn MediaResolver>,
        prefetcher: Option<Arc<dyn MediaPrefetcher>>,
    ) -> Self {
        self.prefetch =
            ImagePrefetchWindow::new(&self.config.prefetch, Arc::clone(&resolver), prefetcher);
        self.resolver = resolver;
        self
    }

    /// 이벤트 구독
    pub fn subscribe(&self) -> broadcast::Receiver<RewindEvent> {
        self.events.subscribe()
    }

    // ============================================================
    // 로드
    // ============================================================

    /// 새 데이터셋 설치
    ///
    /// 재생/홀드/드래그를 먼저 취소해 이전 배열을 가리키는 인덱스가 남지 않게 한다.
    /// 범위 선택은 폐기되고(`Idle`), 현재 인덱스는 가장 최근 캡처로 간다.
    pub fn load(
        &mut self,
        captures: Vec<Capture>,
        active_blocks: Vec<ActiveBlock>,
        range_start: i64,
        range_end: i64,
    ) {
        let was_playing = self.playback.pause();
        self.hold.stop();
        self.scrubber.reset(TimeWindow::new(range_start, range_end));

        let had_selection = self.selector.clear();
        if had_selection {
            info!("새 데이터 로드로 범위 선택 폐기");
        }

        self.captures = CaptureSet::normalize(captures);
        self.active_blocks = active_blocks;
        self.segments = self.playback_segmenter.build(&self.captures);
        self.spans = self.span_segmenter.build(&self.captures);
        self.current_index = self.captures.last_index().unwrap_or(0);

        info!(
            "리와인드 로드: 캡처 {}개, 세그먼트 {}개, 구간 [{}, {}]",
            self.captures.len(),
            self.segments.len(),
            range_start,
            range_end
        );

        self.events.publish(RewindEvent::Loaded {
            captures: self.captures.len(),
            segments: self.segments.len(),
        });
        if was_playing {
            self.publish_playback();
        }
        if had_selection {
            self.publish_selection();
        }
        self.on_index_changed();
    }

    /// 외부 소스에서 캡처/활동 블록을 받아 로드
    ///
    /// 조회 실패 시 기존 데이터셋을 그대로 둔다.
    pub async fn refresh(
        &mut self,
        source: &dyn CaptureSource,
        range_start: i64,
        range_end: i64,
    ) -> Result<usize, RewindError> {
        let (captures, blocks) = tokio::try_join!(
            source.fetch_captures(range_start, range_end),
            source.fetch_active_blocks(range_start, range_end),
        )
        .map_err(|e| {
            warn!("리와인드 데이터 조회 실패: {}", e);
            e
        })?;

        self.load(captures, blocks, range_start, range_end);
        Ok(self.captures.len())
    }

    // ============================================================
    // 탐색 명령
    // ============================================================

    /// 인덱스로 이동 (클램프): 이동했는지 반환
    pub fn seek(&mut self, index: usize) -> bool {
        match self.captures.last_index() {
            Some(last) => self.set_index(index.min(last)),
            None => false,
        }
    }

    /// 타임스탬프에 가장 가까운 캡처로 이동
    pub fn seek_to_time(&mut self, timestamp: i64) -> bool {
        match NearestSampleLocator::new(&self.captures).locate(timestamp) {
            Ok(index) => self.set_index(index),
            Err(_) => false,
        }
    }

    /// ±n 스텝 이동: 재생을 멈추고, 선택이 있으면 끝점을 따라 옮긴다
    pub fn step_by(&mut self, delta: isize) -> bool {
        if self.captures.is_empty() {
            return false;
        }
        let target = self
            .captures
            .clamp_index((self.current_index as isize).saturating_add(delta));
        self.navigate_to(target)
    }

    fn navigate_to(&mut self, target: usize) -> bool {
        if self.playback.pause() {
            self.publish_playback();
        }
        let moved = self.set_index(target);
        if self.selector.extend(self.current_index) {
            self.publish_selection();
        }
        moved
    }

    // ============================================================
    // 재생 명령
    // ============================================================

    /// 재생 시작: 비어 있거나 이미 끝이거나 tokio 런타임 밖이면 no-op
    pub fn play(&mut self) -> bool {
        let started = self
            .playback
            .play(self.current_index, self.captures.len(), self.tick_tx.clone());
        if started {
            self.publish_playback();
        }
        started
    }

    /// 일시정지
    pub fn pause(&mut self) -> bool {
        let paused = self.playback.pause();
        if paused {
            self.publish_playback();
        }
        paused
    }

    /// 재생/일시정지 토글
    pub fn toggle_playback(&mut self) -> bool {
        if self.playback.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.playback.is_playing()
    }

    /// 배속 변경 (재생 중이면 인덱스를 유지한 채 재예약)
    pub fn set_speed(&mut self, speed: SpeedMultiplier) {
        if self.playback.speed() == speed {
            return;
        }
        self.playback.set_speed(speed, self.tick_tx.clone());
        self.publish_playback();
    }

    /// 숫자 배속으로 변경 (1, 2, 5, 10)
    pub fn set_speed_factor(&mut self, factor: u32) -> Result<(), RewindError> {
        let speed =
            SpeedMultiplier::try_from(factor).map_err(|_| RewindError::UnsupportedSpeed(factor))?;
        self.set_speed(speed);
        Ok(())
    }

    // ============================================================
    // 범위 선택
    // ============================================================

    /// 범위 선택 모드 토글: 끌 때 선택도 해제
    pub fn toggle_range_select_mode(&mut self) -> bool {
        self.range_select_mode = !self.range_select_mode;
        if !self.range_select_mode && self.selector.clear() {
            self.publish_selection();
        }
        debug!("범위 선택 모드: {}", self.range_select_mode);
        self.events.publish(RewindEvent::RangeSelectModeChanged {
            enabled: self.range_select_mode,
        });
        self.range_select_mode
    }

    /// 선택 시작점 지정 (범위 선택 모드에서만)
    pub fn start_range_select(&mut self, index: usize) -> bool {
        let Some(last) = self.captures.last_index().filter(|_| self.range_select_mode) else {
            return false;
        };
        let index = index.min(last);
        let changed = self.selector.set_start(index);
        if changed {
            self.publish_selection();
        }
        changed
    }

    /// 선택 끝점 지정/확장: 시작점만 있으면 확정, 확정돼 있으면 끝점 이동
    pub fn extend_range_select(&mut self, index: usize) -> bool {
        let Some(last) = self.captures.last_index().filter(|_| self.range_select_mode) else {
            return false;
        };
        let index = index.min(last);
        let changed = match self.selector.state() {
            SelectionState::PendingEnd { .. } => self.selector.set_end(index),
            SelectionState::Selected { .. } => self.selector.extend(index),
            SelectionState::Idle => false,
        };
        if changed {
            self.publish_selection();
        }
        changed
    }

    /// 선택 해제
    pub fn clear_selection(&mut self) -> bool {
        let cleared = self.selector.clear();
        if cleared {
            self.publish_selection();
        }
        cleared
    }

    // ============================================================
    // 포인터 제스처
    // ============================================================

    /// 트랙 포인터 누름 (x는 트랙 기준 픽셀)
    pub fn pointer_down(&mut self, x: f64, track_width: f64) -> Option<PreviewEvent> {
        if self.captures.is_empty() {
            return None;
        }
        if self.playback.pause() {
            self.publish_playback();
        }
        let outcome = self.scrubber.pointer_down(
            GestureContext {
                captures: self.captures.as_slice(),
                selector: &mut self.selector,
                resolver: self.resolver.as_ref(),
                range_select_mode: self.range_select_mode,
            },
            x,
            track_width,
        );
        self.apply_gesture(outcome)
    }

    /// 트랙 포인터 이동 (드래그 또는 호버)
    pub fn pointer_move(&mut self, x: f64, track_width: f64) -> Option<PreviewEvent> {
        let outcome = self.scrubber.pointer_move(
            GestureContext {
                captures: self.captures.as_slice(),
                selector: &mut self.selector,
                resolver: self.resolver.as_ref(),
                range_select_mode: self.range_select_mode,
            },
            x,
            track_width,
        );
        self.apply_gesture(outcome)
    }

    /// 트랙 포인터 뗌
    pub fn pointer_up(&mut self, x: f64, track_width: f64) -> Option<PreviewEvent> {
        let outcome = self.scrubber.pointer_up(
            GestureContext {
                captures: self.captures.as_slice(),
                selector: &mut self.selector,
                resolver: self.resolver.as_ref(),
                range_select_mode: self.range_select_mode,
            },
            x,
            track_width,
        );
        self.apply_gesture(outcome)
    }

    /// 포인터가 트랙을 벗어남
    pub fn pointer_leave(&mut self) -> Option<PreviewEvent> {
        let preview = self.scrubber.pointer_leave();
        self.publish_preview(preview)
    }

    /// 제스처 중단 (커밋 없음)
    pub fn pointer_cancel(&mut self) -> Option<PreviewEvent> {
        let preview = self.scrubber.pointer_cancel();
        self.publish_preview(preview)
    }

    fn apply_gesture(&mut self, outcome: GestureOutcome) -> Option<PreviewEvent> {
        if outcome.selection_changed {
            self.publish_selection();
        }
        if let Some(index) = outcome.commit_index {
            self.set_index(index);
        }
        self.publish_preview(outcome.preview)
    }

    fn publish_preview(&self, preview: Option<PreviewEvent>) -> Option<PreviewEvent> {
        if let Some(event) = &preview {
            self.events.publish(RewindEvent::Preview(event.clone()));
        }
        preview
    }

    // ============================================================
    // 키보드
    // ============================================================

    /// 키 누름: 호스트가 실행할 명령이 있으면 반환
    pub fn key_down(&mut self, key: NavKey) -> Option<HostCommand> {
        match key {
            NavKey::ArrowLeft | NavKey::ArrowRight => {
                let direction = if key == NavKey::ArrowLeft {
                    StepDirection::Backward
                } else {
                    StepDirection::Forward
                };
                // OS 키 자동 반복은 홀드 반복기가 이미 처리 중
                if self.hold.is_holding(direction) || self.captures.is_empty() {
                    return None;
                }
                self.step_by(direction.delta());
                self.hold.start(direction, self.tick_tx.clone());
                None
            }
            NavKey::Home => {
                if !self.captures.is_empty() {
                    self.navigate_to(0);
                }
                None
            }
            NavKey::End => {
                if let Some(last) = self.captures.last_index() {
                    self.navigate_to(last);
                }
                None
            }
            NavKey::Space => {
                self.toggle_playback();
                None
            }
            NavKey::Delete => self
                .committable_interval()
                .map(HostCommand::ConfirmDelete),
            NavKey::Enter => self
                .committable_interval()
                .map(HostCommand::PromptCollectionName),
            NavKey::Escape => {
                if self.selector.is_active() {
                    self.clear_selection();
                } else if self.range_select_mode {
                    self.toggle_range_select_mode();
                }
                None
            }
        }
    }

    /// 키 뗌: 방향키면 홀드 반복 종료
    pub fn key_up(&mut self, key: NavKey) {
        if matches!(key, NavKey::ArrowLeft | NavKey::ArrowRight) {
            self.hold.stop();
        }
    }

    fn committable_interval(&self) -> Option<TimeInterval> {
        if self.mutation_in_flight.is_some() {
            return None;
        }
        self.selection_interval()
    }

    // ============================================================
    // 타이머
    // ============================================================

    /// 다음 타이머 틱 대기: 활성 타이머가 없으면 즉시 `None`
    pub async fn next_tick(&mut self) -> Option<TimerTick> {
        if !self.playback.is_playing() && !self.hold.is_active() {
            return None;
        }
        self.tick_rx.recv().await
    }

    /// 타이머 틱 처리 (이전 세대 틱은 버림)
    pub fn handle_tick(&mut self, tick: TimerTick) {
        match tick.kind {
            TimerKind::Playback => {
                match self
                    .playback
                    .on_tick(&tick, self.current_index, self.captures.len())
                {
                    Some(PlaybackStep::Advance(next)) => {
                        self.set_index(next);
                    }
                    Some(PlaybackStep::AdvanceAndStop(next)) => {
                        self.set_index(next);
                        self.publish_playback();
                    }
                    Some(PlaybackStep::Stopped) => self.publish_playback(),
                    None => trace!("지난 재생 틱 무시: 세대 {}", tick.generation),
                }
            }
            TimerKind::HoldRepeat => match self.hold.on_tick(&tick) {
                Some(direction) => {
                    self.step_by(direction.delta());
                }
                None => trace!("지난 홀드 틱 무시: 세대 {}", tick.generation),
            },
        }
    }

    /// 활성 타이머가 모두 멈출 때까지 틱 처리
    ///
    /// 재생은 끝에서 스스로 멈추지만 홀드 반복은 키를 뗄 때까지 계속되므로
    /// 홀드 중에는 반환하지 않는다.
    pub async fn run_timers_until_idle(&mut self) {
        while let Some(tick) = self.next_tick().await {
            self.handle_tick(tick);
        }
    }

    // ============================================================
    // 일괄 변경 (삭제 / 컬렉션 저장)
    // ============================================================

    /// 커밋 가능 여부 (확정된 선택 있음 + 진행 중인 작업 없음)
    pub fn can_commit(&self) -> bool {
        self.committable_interval().is_some()
    }

    /// 변경 작업 진행 여부
    pub fn mutation_in_flight(&self) -> bool {
        self.mutation_in_flight.is_some()
    }

    /// 삭제 시작: 구간 계산 후 진행 중으로 표시
    pub fn begin_range_delete(&mut self) -> Result<PendingMutation, RewindError> {
        self.begin_mutation(MutationKind::Delete)
    }

    /// 컬렉션 저장 시작
    pub fn begin_range_save(&mut self, name: &str) -> Result<PendingMutation, RewindError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RewindError::Validation {
                field: "name".to_string(),
                message: "컬렉션 이름이 비어 있음".to_string(),
            });
        }
        self.begin_mutation(MutationKind::SaveCollection {
            name: name.to_string(),
        })
    }

    fn begin_mutation(&mut self, kind: MutationKind) -> Result<PendingMutation, RewindError> {
        if self.captures.is_empty() {
            return Err(RewindError::EmptyDataset);
        }
        if self.mutation_in_flight.is_some() {
            return Err(RewindError::MutationInFlight);
        }
        let selection = self.selector.selection().ok_or(RewindError::NoSelection)?;
        let interval = selection
            .time_interval(&self.captures)
            .ok_or(RewindError::NoSelection)?;

        info!(
            "변경 작업 시작: {:?} [{}, {})",
            kind, interval.start_time, interval.end_time_exclusive
        );
        self.mutation_in_flight = Some(kind.clone());
        self.events.publish(RewindEvent::MutationStarted { kind: kind.clone() });

        Ok(PendingMutation {
            kind,
            selection,
            interval,
        })
    }

    /// 변경 작업 종료 처리
    ///
    /// 성공한 삭제는 선택을 해제하고(인덱스가 사라진 캡처를 가리키므로),
    /// 실패하면 선택을 그대로 두어 다시 시도할 수 있게 한다.
    /// 성공 후 새 데이터 로드는 호스트 책임이다.
    pub fn finish_mutation<T>(&mut self, outcome: Result<T, CoreError>) -> Result<T, RewindError> {
        let Some(kind) = self.mutation_in_flight.take() else {
            return outcome.map_err(RewindError::from);
        };

        match outcome {
            Ok(value) => {
                info!("변경 작업 완료: {:?}", kind);
                if kind == MutationKind::Delete && self.selector.clear() {
                    self.publish_selection();
                }
                self.events.publish(RewindEvent::MutationFinished {
                    kind,
                    success: true,
                });
                Ok(value)
            }
            Err(e) => {
                warn!("변경 작업 실패: {:?}: {}", kind, e);
                self.events.publish(RewindEvent::MutationFinished {
                    kind,
                    success: false,
                });
                Err(e.into())
            }
        }
    }

    /// 선택 범위 삭제: 삭제된 개수 반환
    pub async fn commit_range_delete(&mut self, store: &dyn RangeStore) -> Result<u64, RewindError> {
        let pending = self.begin_range_delete()?;
        let outcome = store
            .delete_captures_in_range(
                pending.interval.start_time,
                pending.interval.end_time_exclusive,
            )
            .await;
        self.finish_mutation(outcome)
    }

    /// 선택 범위를 컬렉션으로 저장: 컬렉션 ID 반환
    pub async fn commit_range_save(
        &mut self,
        store: &dyn RangeStore,
        name: &str,
    ) -> Result<String, RewindError> {
        let pending = self.begin_range_save(name)?;
        let outcome = store
            .save_range_as_collection(
                name.trim(),
                pending.interval.start_time,
                pending.interval.end_time_exclusive,
            )
            .await;
        self.finish_mutation(outcome)
    }

    // ============================================================
    // 조회
    // ============================================================

    /// 로드된 캡처 (오름차순)
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// 캡처 수
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// 빈 데이터셋 여부
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// 현재 인덱스 (비어 있으면 0)
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 현재 캡처
    pub fn current_capture(&self) -> Option<&Capture> {
        self.captures.get(self.current_index)
    }

    /// 현재 캡처의 트랙 비율 (비어 있으면 0)
    pub fn current_fraction(&self) -> f64 {
        self.fraction_of_index(self.current_index).unwrap_or(0.0)
    }

    /// 인덱스의 트랙 비율
    pub fn fraction_of_index(&self, index: usize) -> Option<f64> {
        self.captures
            .get(index)
            .map(|c| self.scrubber.window().time_to_fraction(c.timestamp as f64))
    }

    /// 트랙 구간
    pub fn window(&self) -> TimeWindow {
        self.scrubber.window()
    }

    /// 재생 세그먼트
    pub fn segments(&self) -> &[ActivitySegment] {
        &self.segments
    }

    /// 현재 인덱스가 속한 세그먼트
    pub fn current_segment(&self) -> Option<&ActivitySegment> {
        let pos = self
            .segments
            .partition_point(|s| s.end_index < self.current_index);
        self.segments
            .get(pos)
            .filter(|s| s.contains(self.current_index))
    }

    /// 세그먼트별 트랙 비율 `(시작, 끝)`
    pub fn segment_fractions(&self) -> Vec<(f64, f64)> {
        let window = self.scrubber.window();
        self.segments
            .iter()
            .map(|s| {
                (
                    window.time_to_fraction(s.start_time as f64),
                    window.time_to_fraction(s.end_time as f64),
                )
            })
            .collect()
    }

    /// 활동 구간 블록 (30초 기준 분할)
    pub fn activity_spans(&self) -> &[ActivitySegment] {
        &self.spans
    }

    /// 호스트가 넘긴 활동 블록 (표시 전용)
    pub fn active_blocks(&self) -> &[ActiveBlock] {
        &self.active_blocks
    }

    /// 활동 블록별 트랙 비율 `(시작, 끝)`
    pub fn active_block_fractions(&self) -> Vec<(f64, f64)> {
        let window = self.scrubber.window();
        self.active_blocks
            .iter()
            .map(|b| {
                (
                    window.time_to_fraction(b.start as f64),
                    window.time_to_fraction(b.end as f64),
                )
            })
            .collect()
    }

    /// 선택 상태
    pub fn selection_state(&self) -> SelectionState {
        self.selector.state()
    }

    /// 확정된 선택
    pub fn selection(&self) -> Option<RangeSelection> {
        self.selector.selection()
    }

    /// 확정된 선택의 시간 구간
    pub fn selection_interval(&self) -> Option<TimeInterval> {
        self.selector
            .selection()
            .and_then(|s| s.time_interval(&self.captures))
    }

    /// 확정된 선택의 트랙 비율 `(시작, 끝)`
    pub fn selection_fractions(&self) -> Option<(f64, f64)> {
        let selection = self.selector.selection()?;
        Some((
            self.fraction_of_index(selection.start_index)?,
            self.fraction_of_index(selection.end_index)?,
        ))
    }

    /// 시작점만 찍힌 선택의 트랙 비율
    pub fn pending_selection_fraction(&self) -> Option<f64> {
        self.selector
            .pending_start()
            .and_then(|i| self.fraction_of_index(i))
    }

    /// 재생 중 여부
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// 현재 배속
    pub fn speed_multiplier(&self) -> SpeedMultiplier {
        self.playback.speed()
    }

    /// 재생 상태 스냅샷
    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            current_index: self.current_index,
            is_playing: self.playback.is_playing(),
            speed_multiplier: self.playback.speed(),
        }
    }

    /// 범위 선택 모드 여부
    pub fn range_select_mode(&self) -> bool {
        self.range_select_mode
    }

    /// 홀드 상태
    pub fn hold_state(&self) -> HoldState {
        self.hold.state()
    }

    /// 드래그 진행 여부
    pub fn is_dragging(&self) -> bool {
        self.scrubber.is_dragging()
    }

    /// 미리보기 표시 여부
    pub fn preview_visible(&self) -> bool {
        self.scrubber.preview_visible()
    }

    /// 현재 설정
    pub fn config(&self) -> &RewindConfig {
        &self.config
    }

    // ============================================================
    // 내부
    // ============================================================

    fn set_index(&mut self, index: usize) -> bool {
        if self.captures.is_empty() || index == self.current_index {
            return false;
        }
        self.current_index = index;
        self.on_index_changed();
        true
    }

    fn on_index_changed(&mut self) {
        self.events.publish(RewindEvent::IndexChanged {
            index: self.current_index,
            fraction: self.current_fraction(),
        });
        if !self.captures.is_empty() {
            self.prefetch
                .on_index_changed(self.current_index, &self.captures);
        }
    }

    fn publish_playback(&self) {
        self.events.publish(RewindEvent::PlaybackChanged {
            playing: self.playback.is_playing(),
            speed: self.playback.speed(),
        });
    }

    fn publish_selection(&self) {
        self.events.publish(RewindEvent::SelectionChanged {
            selection: self.selector.selection(),
            pending_start: self.selector.pending_start(),
        });
    }
}
