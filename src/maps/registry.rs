// ============================================================================
// LAYER REGISTRY - Tabla de capas vivas de un backend
// ============================================================================
// Los marcadores dentro de un grupo se registran como miembros: al quitar el
// grupo se sueltan con él, nunca quedan entradas huérfanas entre polls.
// ============================================================================

use std::collections::HashMap;

use super::LayerId;

pub struct LayerRegistry<T> {
    layers: HashMap<LayerId, T>,
    members: HashMap<LayerId, Vec<LayerId>>,
    next_id: u64,
}

impl<T> Default for LayerRegistry<T> {
    fn default() -> Self {
        Self {
            layers: HashMap::new(),
            members: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> LayerRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identificadores compartidos con los handles de mapa
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn insert(&mut self, layer: T) -> LayerId {
        let id = LayerId(self.next_id());
        self.layers.insert(id, layer);
        id
    }

    /// Registra una capa que vive dentro de `group`
    pub fn insert_member(&mut self, group: LayerId, layer: T) -> LayerId {
        let id = self.insert(layer);
        self.members.entry(group).or_default().push(id);
        id
    }

    pub fn get(&self, id: LayerId) -> Option<&T> {
        self.layers.get(&id)
    }

    /// Quita la capa y, si es un grupo, todos sus miembros
    pub fn remove(&mut self, id: LayerId) -> Option<T> {
        if let Some(members) = self.members.remove(&id) {
            for member in members {
                self.layers.remove(&member);
            }
        }
        for members in self.members.values_mut() {
            members.retain(|m| *m != id);
        }
        self.layers.remove(&id)
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removing_group_releases_its_markers() {
        let mut registry = LayerRegistry::new();
        let tiles = registry.insert("tiles");

        // Varios polls seguidos: grupo nuevo, marcadores, se suelta el anterior
        let mut previous: Option<LayerId> = None;
        for _ in 0..5 {
            let group = registry.insert("group");
            for _ in 0..100 {
                registry.insert_member(group, "marker");
            }
            if let Some(old) = previous.replace(group) {
                assert_eq!(registry.remove(old), Some("group"));
            }
        }

        // Solo quedan las tiles + el último grupo con sus 100 marcadores
        assert_eq!(registry.len(), 1 + 1 + 100);
        assert_eq!(registry.get(tiles), Some(&"tiles"));
    }

    #[test]
    fn test_removing_a_member_leaves_the_group() {
        let mut registry = LayerRegistry::new();
        let group = registry.insert("group");
        let a = registry.insert_member(group, "a");
        let b = registry.insert_member(group, "b");

        assert_eq!(registry.remove(a), Some("a"));
        assert_eq!(registry.remove(group), Some("group"));
        assert!(registry.get(b).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_unique_across_kinds() {
        let mut registry: LayerRegistry<&str> = LayerRegistry::new();
        let handle = registry.next_id();
        let layer = registry.insert("tiles");
        assert_ne!(LayerId(handle), layer);
        registry.clear();
        assert!(registry.is_empty());
    }
}
