//! Frame-driven control core for an autonomous 3D avatar.
//!
//! The crate owns everything between "what should the character do" and the
//! pose the renderer reads each frame: a coarse goal/decision loop, a per-bone
//! rotation blender with explicit-vs-procedural ownership, procedural
//! idle/talk motion, straight-line spatial navigation inside a bounded stage,
//! gaze and blink timing, and text-to-viseme scheduling for lip-sync.
//! Rendering, audio I/O, and language understanding live elsewhere; the
//! boundary is plain in-process calls on [`puppet::rig::AvatarRig`].

pub mod config;
pub mod core;
pub mod puppet;
