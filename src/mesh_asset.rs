//! Mesh asset loading and management.
//!
//! This module loads external 3D meshes from OBJ format and extracts the raw
//! vertex positions that feed the particle system. Only positions matter
//! here; normals, UVs and face connectivity are dropped once parsed.
//!
//! Empty meshes are rejected at load time so the downstream buffer
//! reconciliation never has to pad from a source with no vertices.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;

/// A loaded mesh asset reduced to its vertex positions.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    /// Unique identifier for this asset.
    pub id: String,
    /// Vertex positions in model order.
    pub positions: Vec<Vec3>,
}

impl MeshAsset {
    /// Create a mesh asset from raw positions.
    ///
    /// Returns an error if the position list is empty.
    pub fn new(id: String, positions: Vec<Vec3>) -> Result<Self, String> {
        if positions.is_empty() {
            return Err(format!("mesh '{}' has no vertices", id));
        }
        Ok(Self { id, positions })
    }

    /// Parse a mesh asset from OBJ format content.
    ///
    /// The OBJ content should be a valid Wavefront OBJ string. All models in
    /// the file are combined into a single position list, in file order.
    pub fn from_obj(id: String, obj_content: &str) -> Result<Self, String> {
        let mut cursor = std::io::Cursor::new(obj_content.as_bytes());

        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };

        let (models, _materials) = tobj::load_obj_buf(
            &mut cursor,
            &load_options,
            |_| Ok((vec![], HashMap::new())),
        )
        .map_err(|e| format!("Failed to parse OBJ: {}", e))?;

        if models.is_empty() {
            return Err("OBJ file contains no models".to_string());
        }

        let mut positions = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let vertex_count = mesh.positions.len() / 3;
            for i in 0..vertex_count {
                positions.push(Vec3::new(
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ));
            }
        }

        if positions.is_empty() {
            return Err("OBJ file contains no vertices".to_string());
        }

        Ok(Self { id, positions })
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Registry for loaded mesh assets.
///
/// Caches assets to avoid redundant loading and allows sharing across
/// sessions.
#[derive(Debug, Default)]
pub struct MeshAssetRegistry {
    assets: HashMap<String, Arc<MeshAsset>>,
}

impl MeshAssetRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh asset from OBJ content.
    pub fn register_from_obj(&mut self, asset_id: &str, obj_content: &str) -> Result<(), String> {
        let asset = MeshAsset::from_obj(asset_id.to_string(), obj_content)?;
        self.assets.insert(asset_id.to_string(), Arc::new(asset));
        Ok(())
    }

    /// Register a pre-built mesh asset.
    pub fn register(&mut self, asset: MeshAsset) {
        self.assets.insert(asset.id.clone(), Arc::new(asset));
    }

    /// Get a mesh asset by ID.
    pub fn get(&self, asset_id: &str) -> Option<Arc<MeshAsset>> {
        self.assets.get(asset_id).cloned()
    }

    /// Check if an asset is registered.
    pub fn contains(&self, asset_id: &str) -> bool {
        self.assets.contains_key(asset_id)
    }

    /// Unregister an asset.
    pub fn unregister(&mut self, asset_id: &str) -> bool {
        self.assets.remove(asset_id).is_some()
    }

    /// Get all registered asset IDs.
    pub fn asset_ids(&self) -> Vec<&str> {
        self.assets.keys().map(|s| s.as_str()).collect()
    }
}
