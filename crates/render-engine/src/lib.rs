//! Turntable Render Engine
//!
//! Renders the active object from a fixed set of yaw angles at every
//! animation keyframe, optionally passing each image through a pixelation
//! compositor graph.
//!
//! # Pipeline Architecture
//!
//! ```text
//! active object ──┐
//!                 ├── Keyframe collection (distinct integer frames)
//! step angle ─────┘         │
//!                           ├── Job planning (frame x angle, index 1..=N)
//! base name ────────────────┘         │
//!                                     ├── Output naming ({base}_{n}.png)
//! output dirs ────────────────────────┘         │
//!                                               ├── Compositor setup (once)
//!                                               │
//!                                               ▼
//!                              per job: frame → yaw → path → render
//!                                               │
//!                                               ▼
//!                                     {base}_{n}.png [+ _pixel.png]
//! ```

pub mod backend;
pub mod compositor;
pub mod driver;
pub mod keyframes;
pub mod naming;
pub mod planner;

pub use driver::*;
