use std::collections::HashMap;

use crate::context::HostServices;
use crate::mesh::Mesh;
use crate::texture::Image;

/// In-memory named textures and meshes, with no presentation target
#[derive(Debug, Default)]
pub struct AssetRegistry {
    textures: HashMap<String, Image>,
    meshes: HashMap<String, Mesh>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

impl HostServices for AssetRegistry {
    fn texture(&self, name: &str) -> Option<&Image> {
        self.textures.get(name)
    }

    fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.get(name)
    }

    fn insert_texture(&mut self, name: &str, image: Image) {
        log::debug!("texture {:?} = {}x{}", name, image.width(), image.height());
        self.textures.insert(name.to_string(), image);
    }

    fn remove_texture(&mut self, name: &str) -> bool {
        self.textures.remove(name).is_some()
    }

    fn insert_mesh(&mut self, name: &str, mesh: Mesh) {
        log::debug!("mesh {:?} = {} triangles", name, mesh.triangle_count());
        self.meshes.insert(name.to_string(), mesh);
    }

    fn remove_mesh(&mut self, name: &str) -> bool {
        self.meshes.remove(name).is_some()
    }
}
