/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: identity binder (router 全体) と policy guard (route ごと)
 * - cors / http: transport 層の共通設定
 */
pub mod auth;
pub mod cors;
pub mod http;
