//! Scene graph and canvas controller for GPML pathway diagrams.
//!
//! The crate keeps an in-memory pathway document and a retained-mode scene
//! graph that mirrors it. Model edits raise events; the [`canvas::Canvas`]
//! drains them into view changes, hit-tests pointer input against view
//! outlines, runs selection and drag gestures, and paints through a
//! backend-neutral [`render::DrawContext`]. Undo recording and the host
//! viewport are reached through the [`undo::UndoSink`] and
//! [`viewport::Viewport`] traits.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Pathway document, element types and change events |
//! | [`canvas`] | Controller: mirroring, hit-testing, gestures, commands, redraw |
//! | [`element`] | Scene elements, the scene arena and dirty tracking |
//! | [`shaped`] | Views for data nodes, labels, shapes, groups, info and citations |
//! | [`line`] | Line views, line outlines and endpoint maintenance |
//! | [`anchor`] | Views of anchors placed on lines |
//! | [`connector`] | Resolving endpoints and routing connector paths |
//! | [`link_anchor`] | Snap targets shown while dragging a line end |
//! | [`handle`] | Handles and the adjustable-view contract |
//! | [`selection`] | The selection box and rubber band |
//! | [`layout`] | Align, stack, common size and scaling |
//! | [`zorder`] | Z-order renumbering and stepping |
//! | [`grouping`] | The group/ungroup toggle |
//! | [`clipboard`] | Copy and paste with id remapping |
//! | [`template`] | Insertion templates |
//! | [`render`] | Draw context trait, recorder and element painting |
//! | [`group_painter`] | Per-style group painters and their defaults |
//! | [`frame`] | Rotated element frames and bounds |
//! | [`geom`] | Rectangles, outlines and plane geometry |
//! | [`camera`] | Zoom and model/view conversion |
//! | [`input`] | Input events, actions and gesture state |
//! | [`undo`] | Undo sink trait and a bounded history |
//! | [`viewport`] | Host viewport trait and a recorder |
//! | [`config`] | Canvas configuration from the environment |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants |

pub mod anchor;
pub mod camera;
pub mod canvas;
pub mod clipboard;
pub mod config;
pub mod connector;
pub mod consts;
pub mod element;
pub mod error;
pub mod frame;
pub mod geom;
pub mod group_painter;
pub mod grouping;
pub mod handle;
pub mod input;
pub mod layout;
pub mod line;
pub mod link_anchor;
pub mod model;
pub mod render;
pub mod selection;
pub mod shaped;
pub mod template;
pub mod undo;
pub mod viewport;
pub mod zorder;
