pub mod mesh_asset;
pub mod morph;
pub mod noise;
pub mod particle_eval;
pub mod session;
pub mod shape_buffer;
pub mod uniforms;

pub mod cli;
