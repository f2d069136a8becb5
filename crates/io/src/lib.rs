#![forbid(unsafe_code)]

pub mod error;
pub mod format;
pub mod pcd;
pub mod ply;
pub mod xyzrgb;

pub use error::{IoError, Result};
pub use format::{read_cloud, write_cloud, CloudFormat};
pub use pcd::{read_pcd, write_pcd, write_pcd_binary};
pub use ply::{read_ply, write_ply, write_ply_binary};
pub use xyzrgb::{read_xyzrgb, write_xyzrgb};
