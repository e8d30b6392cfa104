//! ONESHIM 리와인드 도메인 모델.
//!
//! 호스트와 엔진이 공유하는 캡처/세그먼트 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod capture;
pub mod segment;
