//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 리와인드 엔진이 의존하는 외부 협력자(캡처 조회, 범위 삭제/컬렉션 저장,
//! 미디어 URL 해석/프리페치)를 정의하며, 호스트가 `Arc<dyn T>`로 주입한다.
//!
//! 모든 async trait은 `async_trait` 매크로를 사용하여
//! object safety를 보장한다.

pub mod capture_source;
pub mod media;
pub mod range_store;
