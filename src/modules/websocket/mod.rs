/// Relay Module
///
/// Module này cung cấp realtime relay channel cho chat application:
/// presence map, typing indicators và bản sao low-latency của tin nhắn mới.
/// Nó bao gồm:
///
/// - Event protocol (ClientEvent & ServerEvent)
/// - Relay Server actor (presence map và routing)
/// - Relay Session actor (xử lý từng connection)
/// - HTTP handler (upgrade HTTP thành WebSocket)
pub mod events;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;
