/// Client Module
///
/// State machine phía client cho chat UI: hợp nhất dữ liệu durable từ
/// HTTP API với events best-effort từ relay channel. Logic này không
/// phụ thuộc server runtime; giữ nó cạnh protocol để reconciliation
/// semantics được test cùng một chỗ.
pub mod state;
