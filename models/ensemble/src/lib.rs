pub mod anim;
pub mod attach;
pub mod brg;
pub mod event;
pub mod flags;
pub mod header;
pub mod material;
pub mod mesh;
pub mod prim;

pub use brg::BrgModel;
