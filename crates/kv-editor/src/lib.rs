//! # kv-editor — Viewer core for kview
//!
//! This crate holds everything between decoded keys and the bytes of a frame:
//!
//! - **[`row`]** — `Row` / `Rows`, the file as byte rows with tab-expanded render forms
//! - **[`view`]** — `View`, scroll offsets that keep the cursor on screen
//! - **[`editor`]** — `Editor`, the cursor and key handling over rows and view
//! - **[`screen`]** — the compositor that turns an `Editor` into one frame
//! - **[`options`]** — tab stop and message timeout
//!
//! Nothing here touches the terminal directly; frames are built into an
//! `OutputBuffer` from `kv-term` and flushed by the caller.

pub mod editor;
pub mod options;
pub mod row;
pub mod screen;
pub mod view;
