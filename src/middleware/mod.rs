/*
 * Responsibility
 * - middleware の公開インターフェース
 * - cors / http (request-id, trace, limit, timeout) / auth (bearer 検証)
 */
pub mod auth;
pub mod cors;
pub mod http;
