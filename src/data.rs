// src/data.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::Icon;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IconData {
    pub emoji: Icon,
    /// Nombre en vietnamita, para las explicaciones y la fuente de IA.
    pub name: String,
    pub category: String,
}

/// Colección temática que se desbloquea con estrellas.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageSet {
    pub id: String,
    pub name: String,
    pub stars_required: u32,
    pub icons: Vec<Icon>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IconBank {
    pub icons: Vec<IconData>,
    pub unlockable_sets: Vec<ImageSet>,
}

impl Default for IconBank {
    fn default() -> Self {
        read_icon_bank()
    }
}

/// Carga el banco de iconos desde el YAML embebido
pub fn read_icon_bank() -> IconBank {
    let file_content = include_str!("data/icons.yaml");
    serde_yaml::from_str(file_content).expect("No se pudo parsear el banco de iconos YAML")
}

impl IconBank {
    /// Iconos base más los de las colecciones desbloqueadas, sin repetidos
    /// y sin entradas vacías.
    pub fn base_unlocked_icons(&self, unlocked_ids: &[String]) -> Vec<Icon> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut all: Vec<Icon> = Vec::new();

        for data in &self.icons {
            if !data.emoji.trim().is_empty() && seen.insert(data.emoji.as_str()) {
                all.push(data.emoji.clone());
            }
        }
        for set in &self.unlockable_sets {
            if unlocked_ids.iter().any(|id| id == &set.id) {
                for icon in &set.icons {
                    if !icon.trim().is_empty() && seen.insert(icon.as_str()) {
                        all.push(icon.clone());
                    }
                }
            }
        }
        all
    }

    pub fn icon_data(&self, emoji: &str) -> Option<&IconData> {
        self.icons.iter().find(|d| d.emoji == emoji)
    }

    /// Datos completos de los iconos desbloqueados que tienen ficha.
    /// Los iconos de colecciones sin ficha propia se omiten: la fuente de IA
    /// necesita nombre y categoría para razonar.
    pub fn unlocked_icon_data(&self, unlocked_ids: &[String]) -> Vec<IconData> {
        self.base_unlocked_icons(unlocked_ids)
            .iter()
            .filter_map(|emoji| self.icon_data(emoji).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn el_banco_embebido_parsea_y_no_repite_iconos() {
        let bank = read_icon_bank();
        assert!(bank.icons.len() >= 40);
        assert_eq!(bank.unlockable_sets.len(), 5);

        let base = bank.base_unlocked_icons(&[]);
        let unique: HashSet<&Icon> = base.iter().collect();
        assert_eq!(base.len(), unique.len());
    }

    #[test]
    fn desbloquear_una_coleccion_amplia_el_inventario() {
        let bank = read_icon_bank();
        let base = bank.base_unlocked_icons(&[]);
        let con_granja = bank.base_unlocked_icons(&["farm_animals".to_string()]);
        assert!(con_granja.len() > base.len());
        assert!(con_granja.contains(&"🐄".to_string()));
        assert!(!base.contains(&"🐄".to_string()));
    }
}
