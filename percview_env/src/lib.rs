//! PercView Environment Abstraction Layer
//!
//! This crate holds everything the overlay core talks to but does not own:
//! - Wire types for the detection topic (`DetectionArray`, `Detection`)
//! - The map origin seam (`OriginResolver`) and a reference `MapOrigin`
//! - The drawing seam (`OverlayRenderer`)
//! - The inbound topic seam (`DetectionTransport`) and a tokio channel implementation
//!
//! # Example
//!
//! ```ignore
//! use percview_env::{ChannelTransport, DetectionTransport};
//!
//! let (publisher, transport) = ChannelTransport::pair("/apollo/perception/obstacles", 16);
//! publisher.publish(array).await?;
//! while let Some(array) = transport.recv().await {
//!     buffer.replace(array.detections);
//! }
//! ```

mod origin;
mod render;
mod transport;
mod types;
mod error;
mod tokio_impl;

pub use origin::{MapOrigin, OriginResolver};
pub use render::{OverlayRenderer, WireframeBox};
pub use transport::DetectionTransport;
pub use types::{Detection, DetectionArray, GeoPosition, Rgba};
pub use error::EnvError;
pub use tokio_impl::{ChannelPublisher, ChannelTransport};
