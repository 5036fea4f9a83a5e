//! HTTP API handlers for tfg-gallery

pub mod albums;
pub mod buildinfo;
pub mod health;
pub mod import;
pub mod session;
pub mod sse;
pub mod ui;

pub use albums::{add_album, delete_album, list_albums, update_album};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use import::{export_albums, import_albums, import_progress};
pub use session::{require_admin, require_site, session_routes, SESSION_HEADER};
pub use sse::event_stream;
pub use ui::{serve_app_js, serve_index};
